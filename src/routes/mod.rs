use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::repository::SheetRepository;
use crate::services::dashboard::{DashboardSnapshot, DashboardState};

pub mod api;
pub mod customers;
pub mod delivery_notes;
pub mod documents;
pub mod main;

/// Dashboard state as wired in production.
pub type Dashboard = DashboardState<SheetRepository>;

#[derive(Debug, Serialize)]
struct Alert {
    level: &'static str,
    message: String,
}

/// Context shared by every page: alerts, active menu entry, load time.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    current_page: &str,
    snapshot: &DashboardSnapshot,
) -> Context {
    let alerts: Vec<Alert> = flash_messages
        .iter()
        .map(|message| Alert {
            level: match message.level() {
                Level::Error => "error",
                Level::Warning => "warning",
                Level::Success => "success",
                _ => "info",
            },
            message: message.content().to_string(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context.insert(
        "loaded_at",
        &snapshot
            .loaded_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    );
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
