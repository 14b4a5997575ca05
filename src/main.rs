// main.rs
use actix_cors::Cors;
use actix_files::Files;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::JsonConfig;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use std::env;

use crate::errors::ApiError;

mod auth;
mod controllers;
mod db;
mod errors;
mod models;
mod rekap;
mod utils;

fn cors_dari_env(origin: Option<&str>) -> Cors {
    let cors = match origin {
        Some(origin) => Cors::default().allowed_origin(origin).supports_credentials(),
        None => Cors::default().allow_any_origin(),
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting up...");

    let pool = match db::establish_connection().await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Gagal inisialisasi pool database: {:?}", e);
            std::process::exit(1);
        }
    };

    if env::var("JWT_SECRET").is_err() {
        log::warn!("JWT_SECRET belum diset, login dan endpoint terproteksi akan gagal");
    }

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3002);
    let cors_origin = env::var("CORS_ORIGIN").ok().filter(|s| !s.trim().is_empty());
    let upload_dir = utils::upload_dir();
    std::fs::create_dir_all(&upload_dir)?;

    log::info!("Server running on http://{}:{}", host, port);

    HttpServer::new(move || {
        let json_config = JsonConfig::default()
            .limit(1024 * 1024)
            .content_type_required(false)
            .error_handler(|err, _req| {
                log::error!("JSON payload error: {}", err);
                ApiError::validation(format!("Payload error: {}", err)).into()
            });

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(json_config)
            .wrap(cors_dari_env(cors_origin.as_deref()))
            .wrap(Logger::default())
            .service(Files::new("/uploads", upload_dir.clone()))
            .configure(controllers::auth_controller::routes)
            .configure(controllers::master_controller::routes)
            .configure(controllers::jadwal_controller::routes)
            .configure(controllers::absensi_controller::routes)
            .configure(controllers::rekap_controller::routes)
            .configure(controllers::upload_controller::routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
