use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::routes::{Dashboard, base_context, render_template};
use crate::services::dashboard::{OrdersQuery, load_orders_page};

#[get("/")]
pub async fn show_index(
    params: web::Query<OrdersQuery>,
    dashboard: web::Data<Dashboard>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (snapshot, load_error) = match dashboard.reload().await {
        Ok(snapshot) => (snapshot, None),
        Err(err) => {
            log::error!("Failed to load documents: {err}");
            (dashboard.snapshot(), Some(err.to_string()))
        }
    };

    let data = load_orders_page(&snapshot, &params);

    let mut context = base_context(&flash_messages, "index", &snapshot);
    context.insert("load_error", &load_error);
    context.insert("kpis", &snapshot.kpis);
    context.insert("customers", &snapshot.customers);
    context.insert("page", &data);
    render_template(&tera, "main/index.html", &context)
}
