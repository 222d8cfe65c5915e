use crate::config::Config;
use crate::services::CoverSearchService;
use actix_rt::signal::unix;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use futures_lite::FutureExt;
use std::io::{Error, ErrorKind};
use tracing::{error, info};

mod config;
mod http;
mod services;

#[cfg(test)]
mod testing;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let mut terminate = unix::signal(unix::SignalKind::terminate())?;
    let mut interrupt = unix::signal(unix::SignalKind::interrupt())?;

    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|error| {
        error!(%error, "Invalid configuration");
        Error::new(ErrorKind::InvalidInput, error)
    })?;

    info!("Starting application...");

    let cover_search = CoverSearchService::create(&config).map_err(|error| {
        error!(%error, "Unable to initialize cover search");
        Error::new(ErrorKind::Other, error)
    })?;
    let cover_search = Data::new(cover_search);

    let shutdown_timeout = config.shutdown_timeout;
    let bind_address = config.bind_address.clone();

    let server = HttpServer::new({
        move || {
            App::new()
                .app_data(Data::clone(&cover_search))
                .service(web::resource("/covers").route(web::get().to(http::search_covers)))
                .service(web::resource("/health").route(web::get().to(http::health_check)))
        }
    })
    .shutdown_timeout(shutdown_timeout)
    .bind(bind_address)?
    .run();

    let server_handle = server.handle();

    actix_rt::spawn({
        async move {
            if let Err(error) = server.await {
                error!(?error, "Error on http server");
            }
        }
    });

    info!("Application started");

    interrupt.recv().or(terminate.recv()).await;

    info!("Received shutdown signal. Shutting down gracefully...");

    server_handle.stop(true).await;

    Ok(())
}
