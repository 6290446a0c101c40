use actix_web::{HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};

use crate::routes::Dashboard;
use crate::services::customers::find_customer_by_name;
use crate::services::dashboard::{OrdersQuery, load_orders_page};

#[derive(Debug, Deserialize)]
pub struct CustomerLookup {
    pub name: String,
}

#[derive(Debug, Serialize)]
struct BusyStatus {
    busy: bool,
    in_flight: usize,
}

#[get("/api/v1/orders")]
/// Return the filtered and sorted orders as JSON.
pub async fn api_v1_orders(
    params: web::Query<OrdersQuery>,
    dashboard: web::Data<Dashboard>,
) -> impl Responder {
    match dashboard.reload().await {
        Ok(snapshot) => HttpResponse::Ok().json(load_orders_page(&snapshot, &params).orders),
        Err(err) => {
            log::error!("Failed to list orders: {err}");
            HttpResponse::ServiceUnavailable().finish()
        }
    }
}

#[get("/api/v1/customers")]
/// Look up a known customer by exact name, used to prefill the new document form.
pub async fn api_v1_customers(
    params: web::Query<CustomerLookup>,
    dashboard: web::Data<Dashboard>,
) -> impl Responder {
    let snapshot = dashboard.snapshot();
    match find_customer_by_name(&snapshot.customers, &params.name) {
        Some(customer) => HttpResponse::Ok().json(customer),
        None => HttpResponse::NotFound().finish(),
    }
}

#[get("/api/v1/kpis")]
pub async fn api_v1_kpis(dashboard: web::Data<Dashboard>) -> impl Responder {
    HttpResponse::Ok().json(&dashboard.snapshot().kpis)
}

#[get("/api/v1/busy")]
/// Whether a request to the spreadsheet service is in flight.
pub async fn api_v1_busy(dashboard: web::Data<Dashboard>) -> impl Responder {
    let busy = dashboard.repository().gateway().busy();
    HttpResponse::Ok().json(BusyStatus {
        busy: busy.is_busy(),
        in_flight: busy.in_flight(),
    })
}
