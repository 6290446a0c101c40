use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::routes::{Dashboard, base_context, render_template};

#[get("/customers")]
pub async fn show_customers(
    dashboard: web::Data<Dashboard>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let snapshot = match dashboard.reload().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::error!("Failed to load customers: {err}");
            dashboard.snapshot()
        }
    };

    let mut context = base_context(&flash_messages, "customers", &snapshot);
    context.insert("customers", &snapshot.customers);
    render_template(&tera, "customers/index.html", &context)
}
