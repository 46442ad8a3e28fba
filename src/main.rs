mod api;
mod config;
mod db;
mod dto;
mod error;
mod model;
mod telemetry;

use std::sync::Arc;

use actix_web::{get, web, App, HttpResponse, HttpServer, Responder, Result};
use serde::Serialize;

use crate::config::Config;
use crate::db::{MongoDbClient, TodoStore};

#[derive(Serialize)]
pub struct Response {
    pub message: String,
}

#[get("/health")]
async fn healthcheck() -> impl Responder {
    let response = Response {
        message: "Everything is working fine".to_string(),
    };
    HttpResponse::Ok().json(response)
}

async fn not_found() -> Result<HttpResponse> {
    let response = Response {
        message: "Resource not found".to_string(),
    };
    Ok(HttpResponse::NotFound().json(response))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init(env!("CARGO_PKG_NAME"))?;
    let config = Config::from_env()?;

    let client = MongoDbClient::new(&config).await?;
    let store: Arc<dyn TodoStore> = Arc::new(client.clone());
    let data = web::Data::from(store);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(api::config)
            .service(healthcheck)
            .default_service(web::route().to(not_found))
            .wrap(actix_web::middleware::Logger::default())
    })
    .bind((config.host.as_str(), config.port))?;

    tracing::info!("Server started on port {}", config.port);
    server.run().await?;

    client.close().await;
    Ok(())
}
