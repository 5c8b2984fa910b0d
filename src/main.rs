use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::NormalizePath, web};
use clap::Parser;
use tracing::info;

mod api;
mod cli;
mod config;
mod db;
mod jobs;
mod logging;
mod shutdown;

use crate::api::validation;
use crate::cli::{Cli, Command};
use crate::db::JobRepository;
use crate::jobs::JobService;
use crate::shutdown::ShutdownCoordinator;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment, CLI flags take precedence
    let mut config = config::Config::from_env().map_err(std::io::Error::other)?;
    if let Some(host) = cli.host.clone() {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    logging::init(&config.log_dir)?;

    let pool = db::connection::get_connection(&config.database_url, config.max_db_connections)
        .await
        .map_err(std::io::Error::other)?;

    if cli.command() == Command::Migrate {
        db::migrations::run_migrations(&pool)
            .await
            .map_err(std::io::Error::other)?;
        pool.close().await;
        return Ok(());
    }

    info!("Starting job-ledger application");
    info!("Configuration loaded successfully:");
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);

    if config.auto_migrate {
        db::migrations::run_migrations(&pool)
            .await
            .map_err(std::io::Error::other)?;
    }

    let job_service = web::Data::new(JobService::new(Arc::new(JobRepository::new(pool.clone()))));
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(job_service.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config(max_payload_size))
            .app_data(validation::query_config())
            .wrap(NormalizePath::trim())
            .configure(api::routes)
    });

    info!("Server starting on http://{}:{}", config.host, config.port);

    // Signals are handled by ShutdownCoordinator
    let server = server
        .disable_signals()
        .bind((config.host.as_str(), config.port))?
        .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, pool)
        .wait_for_shutdown()
        .await
}
