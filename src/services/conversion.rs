use serde::Serialize;

use crate::domain::document::{DocumentKind, DocumentStatus, NewDocument, StatusUpdate};
use crate::repository::DocumentWriter;
use crate::services::dashboard::DashboardSnapshot;
use crate::services::{ServiceError, ServiceResult};

/// Numbers involved in a completed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub order: String,
    pub delivery_note: String,
}

/// Turn an open order into a closed delivery note.
///
/// Two separate writes: the delivery note is created first, then the order is
/// closed. If the second write fails the delivery note stays in its sheet and
/// [`ServiceError::PartialConversion`] names both documents.
pub async fn convert_order_to_delivery_note<W>(
    repo: &W,
    snapshot: &DashboardSnapshot,
    order_number: &str,
) -> ServiceResult<ConversionOutcome>
where
    W: DocumentWriter + ?Sized,
{
    let order = snapshot.find_order(order_number).ok_or(ServiceError::NotFound)?;
    if order.status.is_closed() {
        return Err(ServiceError::Conflict(format!(
            "order {} is already closed",
            order.number
        )));
    }

    let delivery_note_number = snapshot.next_number(DocumentKind::DeliveryNote);
    let delivery_note = NewDocument::new(
        DocumentKind::DeliveryNote,
        delivery_note_number.as_str(),
        order.date.as_str(),
    )
    .with_customer_of(order)
    .with_status(DocumentStatus::Closed)
    .with_linked_order(order.number.as_str());

    repo.create_document(&delivery_note).await?;
    log::info!(
        "Created delivery note {delivery_note_number} from order {}",
        order.number
    );

    let close_order = StatusUpdate::new(order.number.as_str(), DocumentStatus::Closed);
    if let Err(err) = repo.update_order_status(&close_order).await {
        log::error!(
            "Delivery note {delivery_note_number} exists but order {} was not closed: {err}",
            order.number
        );
        return Err(ServiceError::PartialConversion {
            order: order.number.clone(),
            delivery_note: delivery_note_number,
            message: err.to_string(),
        });
    }

    Ok(ConversionOutcome {
        order: order.number.clone(),
        delivery_note: delivery_note_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Document;
    use crate::repository::RepositoryError;
    use crate::repository::mock::MockDocumentWriter;

    fn snapshot() -> DashboardSnapshot {
        let mut open = Document::new(DocumentKind::Order, "620-0003");
        open.date = "2024-05-01".to_string();
        open.customer_name = "Dana".to_string();
        open.address = "Herzl 1".to_string();
        open.phone = "050-1234567".to_string();
        open.status = DocumentStatus::parse("open");

        let mut closed = Document::new(DocumentKind::Order, "620-0004");
        closed.status = DocumentStatus::Closed;

        DashboardSnapshot {
            orders: vec![open, closed],
            delivery_notes: vec![Document::new(DocumentKind::DeliveryNote, "671-0002")],
            ..DashboardSnapshot::default()
        }
    }

    #[tokio::test]
    async fn creates_linked_note_then_closes_order() {
        let mut repo = MockDocumentWriter::new();
        let mut sequence = mockall::Sequence::new();
        repo.expect_create_document()
            .times(1)
            .in_sequence(&mut sequence)
            .withf(|note| {
                assert_eq!(note.kind, DocumentKind::DeliveryNote);
                assert_eq!(note.number, "671-0003");
                assert_eq!(note.linked_order.as_deref(), Some("620-0003"));
                assert_eq!(note.status, DocumentStatus::Closed);
                assert_eq!(note.date, "2024-05-01");
                assert_eq!(note.customer_name, "Dana");
                assert_eq!(note.address, "Herzl 1");
                assert_eq!(note.phone, "050-1234567");
                true
            })
            .returning(|_| Ok(()));
        repo.expect_update_order_status()
            .times(1)
            .in_sequence(&mut sequence)
            .withf(|update| update.number == "620-0003" && update.status == DocumentStatus::Closed)
            .returning(|_| Ok(()));

        let outcome = convert_order_to_delivery_note(&repo, &snapshot(), "620-0003")
            .await
            .expect("conversion should succeed");

        assert_eq!(
            outcome,
            ConversionOutcome {
                order: "620-0003".to_string(),
                delivery_note: "671-0003".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn status_update_failure_reports_partial_conversion() {
        let mut repo = MockDocumentWriter::new();
        repo.expect_create_document().times(1).returning(|_| Ok(()));
        repo.expect_update_order_status()
            .times(1)
            .returning(|_| Err(RepositoryError::Remote("sheet locked".to_string())));

        let result = convert_order_to_delivery_note(&repo, &snapshot(), "620-0003").await;

        match result {
            Err(ServiceError::PartialConversion {
                order,
                delivery_note,
                message,
            }) => {
                assert_eq!(order, "620-0003");
                assert_eq!(delivery_note, "671-0003");
                assert_eq!(message, "sheet locked");
            }
            other => panic!("expected partial conversion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn note_creation_failure_skips_status_update() {
        let mut repo = MockDocumentWriter::new();
        repo.expect_create_document()
            .times(1)
            .returning(|_| Err(RepositoryError::Transport("offline".to_string())));
        repo.expect_update_order_status().times(0);

        let result = convert_order_to_delivery_note(&repo, &snapshot(), "620-0003").await;

        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let repo = MockDocumentWriter::new();

        let result = convert_order_to_delivery_note(&repo, &snapshot(), "620-0099").await;

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn closed_order_is_a_conflict() {
        let repo = MockDocumentWriter::new();

        let result = convert_order_to_delivery_note(&repo, &snapshot(), "620-0004").await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }
}
