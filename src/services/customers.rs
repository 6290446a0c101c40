use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::customer::Customer;
use crate::domain::document::{Document, DocumentKind};

/// What to do with a document that has no phone number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPhonePolicy {
    /// Leave the document out of the customer list.
    #[default]
    Skip,
    /// Fail the whole aggregation.
    Reject,
}

impl FromStr for MissingPhonePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "skip" => Ok(MissingPhonePolicy::Skip),
            "reject" => Ok(MissingPhonePolicy::Reject),
            other => Err(format!("unknown missing phone policy `{other}`")),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("{kind} {number} has no customer phone")]
    MissingPhone { kind: DocumentKind, number: String },
}

/// Derive the customer list from orders followed by delivery notes.
///
/// Customers are keyed by trimmed phone and returned in order of first
/// appearance. Each later document with the same phone bumps the count and
/// replaces the address.
pub fn aggregate_customers(
    orders: &[Document],
    delivery_notes: &[Document],
    policy: MissingPhonePolicy,
) -> Result<Vec<Customer>, AggregateError> {
    let mut customers: Vec<Customer> = Vec::new();
    let mut index_by_phone: HashMap<String, usize> = HashMap::new();

    for document in orders.iter().chain(delivery_notes) {
        let phone = document.phone.trim();
        if phone.is_empty() {
            match policy {
                MissingPhonePolicy::Skip => continue,
                MissingPhonePolicy::Reject => {
                    return Err(AggregateError::MissingPhone {
                        kind: document.kind,
                        number: document.number.clone(),
                    });
                }
            }
        }

        match index_by_phone.get(phone) {
            Some(&index) => customers[index].record_document(document.address.as_str()),
            None => {
                index_by_phone.insert(phone.to_string(), customers.len());
                customers.push(Customer::new(
                    phone,
                    document.customer_name.trim(),
                    document.address.as_str(),
                ));
            }
        }
    }

    Ok(customers)
}

/// Autofill lookup: the first customer whose name matches exactly.
pub fn find_customer_by_name<'a>(customers: &'a [Customer], name: &str) -> Option<&'a Customer> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    customers.iter().find(|customer| customer.name == name)
}
