use std::time::Duration;

use actix_files::Files;
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use dotenvy::dotenv;
use tera::Tera;

use sheet_orders::config::ServerConfig;
use sheet_orders::gateway::transport::ReqwestTransport;
use sheet_orders::gateway::{SheetGateway, TokioSleeper};
use sheet_orders::repository::SheetRepository;
use sheet_orders::routes::Dashboard;
use sheet_orders::routes::api::{api_v1_busy, api_v1_customers, api_v1_kpis, api_v1_orders};
use sheet_orders::routes::customers::show_customers;
use sheet_orders::routes::delivery_notes::show_delivery_notes;
use sheet_orders::routes::documents::{add_document, convert_order, update_order_status};
use sheet_orders::routes::main::show_index;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let secret_key = match config.secret_key.as_deref().map(|key| Key::try_from(key.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(e)) => {
            log::warn!("SECRET_KEY rejected ({e}), using a random key");
            Key::generate()
        }
        None => Key::generate(),
    };

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };
    let gateway = SheetGateway::new(
        ReqwestTransport::new(client),
        TokioSleeper,
        config.endpoints.clone(),
    );
    let repo = SheetRepository::new(gateway);
    let dashboard = web::Data::new(Dashboard::new(repo, config.missing_phone_policy));

    if let Err(e) = dashboard.reload().await {
        log::warn!("Initial data load failed: {e}");
    }

    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = match Tera::new("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            log::error!("Parsing error(s): {e}");
            std::process::exit(1);
        }
    };

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(show_index)
            .service(show_delivery_notes)
            .service(show_customers)
            .service(add_document)
            .service(update_order_status)
            .service(convert_order)
            .service(api_v1_orders)
            .service(api_v1_customers)
            .service(api_v1_kpis)
            .service(api_v1_busy)
            .app_data(web::Data::new(tera.clone()))
            .app_data(dashboard.clone())
    })
    .bind((config.address, config.port))?
    .run()
    .await
}
