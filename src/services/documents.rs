use chrono::NaiveDate;

use crate::domain::document::{DocumentKind, NewDocument, StatusUpdate};
use crate::forms::documents::{AddDocumentForm, UpdateStatusForm};
use crate::repository::DocumentWriter;
use crate::services::dashboard::DashboardSnapshot;
use crate::services::numbering::parse_suffix;
use crate::services::{ServiceError, ServiceResult};

/// Creates an order or delivery note from the "new document" form.
///
/// A blank number is replaced by the next free number in `snapshot`. Numbers
/// already present in the snapshot are refused.
pub async fn create_document<W>(
    repo: &W,
    snapshot: &DashboardSnapshot,
    form: AddDocumentForm,
    today: NaiveDate,
) -> ServiceResult<NewDocument>
where
    W: DocumentWriter + ?Sized,
{
    let new_document = form
        .into_new_document(|kind| snapshot.next_number(kind), today)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if number_taken(snapshot, new_document.kind, &new_document.number) {
        return Err(ServiceError::Conflict(format!(
            "{} {} already exists",
            new_document.kind, new_document.number
        )));
    }

    repo.create_document(&new_document).await?;
    log::info!("Created {} {}", new_document.kind, new_document.number);

    Ok(new_document)
}

/// Changes the status of an existing order.
pub async fn update_status<W>(
    repo: &W,
    snapshot: &DashboardSnapshot,
    order_number: &str,
    form: UpdateStatusForm,
) -> ServiceResult<StatusUpdate>
where
    W: DocumentWriter + ?Sized,
{
    let update = form
        .into_status_update(order_number)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if snapshot.find_order(&update.number).is_none() {
        return Err(ServiceError::NotFound);
    }

    repo.update_order_status(&update).await?;
    log::info!("Order {} set to {}", update.number, update.status);

    Ok(update)
}

/// Whether `number` is already used, treating `6200003` and `620-0003` alike.
fn number_taken(snapshot: &DashboardSnapshot, kind: DocumentKind, number: &str) -> bool {
    let suffix = parse_suffix(number, kind.prefix());
    snapshot.documents_of(kind).iter().any(|document| {
        document.number == number
            || (suffix.is_some() && parse_suffix(&document.number, kind.prefix()) == suffix)
    })
}
