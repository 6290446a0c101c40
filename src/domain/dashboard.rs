use serde::Serialize;

use crate::domain::customer::Customer;
use crate::domain::document::{Document, DocumentStatus};

/// Count of orders sharing one status, used for the status chart.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Count-based summary metrics shown on the dashboard.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Kpis {
    pub total_orders: usize,
    /// Orders whose status is not terminal.
    pub open_orders: usize,
    pub closed_orders: usize,
    pub urgent_orders: usize,
    pub delivery_notes: usize,
    pub customers: usize,
    /// Order counts per status in order of first appearance.
    pub orders_by_status: Vec<StatusCount>,
}

impl Kpis {
    /// Compute the metrics for one data load.
    pub fn compute(orders: &[Document], delivery_notes: &[Document], customers: &[Customer]) -> Self {
        let mut kpis = Kpis {
            total_orders: orders.len(),
            delivery_notes: delivery_notes.len(),
            customers: customers.len(),
            ..Kpis::default()
        };

        for order in orders {
            if order.status.is_closed() {
                kpis.closed_orders += 1;
            } else {
                kpis.open_orders += 1;
            }
            if order.status == DocumentStatus::Urgent {
                kpis.urgent_orders += 1;
            }

            let label = order.status.as_wire();
            match kpis
                .orders_by_status
                .iter_mut()
                .find(|entry| entry.status == label)
            {
                Some(entry) => entry.count += 1,
                None => kpis.orders_by_status.push(StatusCount {
                    status: label.to_string(),
                    count: 1,
                }),
            }
        }

        kpis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::DocumentKind;

    fn order(number: &str, status: DocumentStatus) -> Document {
        let mut document = Document::new(DocumentKind::Order, number);
        document.status = status;
        document
    }

    #[test]
    fn compute_counts_orders_by_status() {
        let orders = vec![
            order("620-0001", DocumentStatus::New),
            order("620-0002", DocumentStatus::Closed),
            order("620-0003", DocumentStatus::Urgent),
            order("620-0004", DocumentStatus::New),
        ];
        let notes = vec![Document::new(DocumentKind::DeliveryNote, "671-0001")];
        let customers = vec![Customer::new("050", "Dana", "Haifa")];

        let kpis = Kpis::compute(&orders, &notes, &customers);

        assert_eq!(kpis.total_orders, 4);
        assert_eq!(kpis.open_orders, 3);
        assert_eq!(kpis.closed_orders, 1);
        assert_eq!(kpis.urgent_orders, 1);
        assert_eq!(kpis.delivery_notes, 1);
        assert_eq!(kpis.customers, 1);
        assert_eq!(
            kpis.orders_by_status,
            vec![
                StatusCount {
                    status: "חדש".to_string(),
                    count: 2
                },
                StatusCount {
                    status: "הושלם".to_string(),
                    count: 1
                },
                StatusCount {
                    status: "דחוף".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn compute_on_empty_lists_is_all_zero() {
        assert_eq!(Kpis::compute(&[], &[], &[]), Kpis::default());
    }
}
