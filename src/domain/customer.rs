use serde::{Deserialize, Serialize};

/// Customer derived from the order and delivery-note sheets.
///
/// Customers are a projection keyed by phone number and are rebuilt from
/// scratch on every data load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    /// Trimmed phone number, the deduplication key.
    pub phone: String,
    /// Name seen on the first document carrying this phone.
    pub name: String,
    /// Address of the most recent document in list order.
    pub address: String,
    /// Number of documents that carry this phone.
    pub document_count: usize,
}

impl Customer {
    /// Start a customer entry from its first document.
    #[must_use]
    pub fn new(phone: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            name: name.into(),
            address: address.into(),
            document_count: 1,
        }
    }

    /// Count another document for this customer and remember its address.
    pub fn record_document(&mut self, address: impl Into<String>) {
        self.document_count += 1;
        self.address = address.into();
    }
}
