use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::routes::{Dashboard, base_context, render_template};

#[get("/delivery-notes")]
pub async fn show_delivery_notes(
    dashboard: web::Data<Dashboard>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let snapshot = match dashboard.reload().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::error!("Failed to load delivery notes: {err}");
            dashboard.snapshot()
        }
    };

    let mut context = base_context(&flash_messages, "delivery_notes", &snapshot);
    context.insert("delivery_notes", &snapshot.delivery_notes);
    render_template(&tera, "delivery_notes/index.html", &context)
}
