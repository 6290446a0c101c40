use actix_web::{Responder, post, web};
use actix_web_flash_messages::FlashMessage;
use chrono::Local;

use crate::forms::documents::{AddDocumentForm, UpdateStatusForm};
use crate::routes::{Dashboard, redirect};
use crate::services::ServiceError;
use crate::services::conversion::convert_order_to_delivery_note;
use crate::services::documents::{create_document, update_status};

const UNAVAILABLE_MESSAGE: &str =
    "The spreadsheet service is busy or unreachable. Please try again in a moment.";

/// Flash the message for a failed write. `action` names what was attempted.
fn flash_failure(err: ServiceError, action: &str) {
    match err {
        ServiceError::NotFound => FlashMessage::error("Order not found.").send(),
        ServiceError::Form(message) | ServiceError::Conflict(message) => {
            FlashMessage::error(message).send()
        }
        ServiceError::Remote(message) => FlashMessage::error(message).send(),
        ServiceError::Unavailable(message) => {
            log::warn!("Failed to {action}: {message}");
            FlashMessage::error(UNAVAILABLE_MESSAGE).send()
        }
        err @ ServiceError::PartialConversion { .. } => {
            FlashMessage::warning(err.to_string()).send()
        }
        err => {
            log::error!("Failed to {action}: {err}");
            FlashMessage::error(format!("Failed to {action}.")).send()
        }
    }
}

/// Refresh after a write so the next page shows the remote state.
async fn refresh(dashboard: &Dashboard) {
    if let Err(err) = dashboard.reload().await {
        log::warn!("Reload after write failed: {err}");
    }
}

#[post("/documents/add")]
pub async fn add_document(
    dashboard: web::Data<Dashboard>,
    form: web::Form<AddDocumentForm>,
) -> impl Responder {
    let snapshot = dashboard.snapshot();
    let today = Local::now().date_naive();

    match create_document(dashboard.repository(), &snapshot, form.into_inner(), today).await {
        Ok(document) => {
            FlashMessage::success(format!("{} {} saved.", document.kind, document.number)).send();
            refresh(&dashboard).await;
        }
        Err(err) => flash_failure(err, "save the document"),
    }
    redirect("/")
}

#[post("/orders/{number}/status")]
pub async fn update_order_status(
    path: web::Path<String>,
    dashboard: web::Data<Dashboard>,
    form: web::Form<UpdateStatusForm>,
) -> impl Responder {
    let number = path.into_inner();
    let snapshot = dashboard.snapshot();

    match update_status(dashboard.repository(), &snapshot, &number, form.into_inner()).await {
        Ok(update) => {
            FlashMessage::success(format!("Order {} is now {}.", update.number, update.status))
                .send();
            refresh(&dashboard).await;
        }
        Err(err) => flash_failure(err, "update the order status"),
    }
    redirect("/")
}

#[post("/orders/{number}/convert")]
pub async fn convert_order(
    path: web::Path<String>,
    dashboard: web::Data<Dashboard>,
) -> impl Responder {
    let number = path.into_inner();
    let snapshot = dashboard.snapshot();

    match convert_order_to_delivery_note(dashboard.repository(), &snapshot, &number).await {
        Ok(outcome) => {
            FlashMessage::success(format!(
                "Order {} converted to delivery note {}.",
                outcome.order, outcome.delivery_note
            ))
            .send();
            refresh(&dashboard).await;
        }
        Err(err @ ServiceError::PartialConversion { .. }) => {
            flash_failure(err, "convert the order");
            refresh(&dashboard).await;
        }
        Err(err) => flash_failure(err, "convert the order"),
    }
    redirect("/")
}
