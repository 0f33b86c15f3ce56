use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;

use attendance::config::Config;
use attendance::db::init_db;
use attendance::docs::ApiDoc;
use attendance::routes;
use attendance::service::AttendanceService;
use attendance::store::{MemoryRecordStore, MySqlRecordStore, RecordStore, StoreBackend};
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store_backend {
        StoreBackend::Mysql => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;

            let pool = init_db(
                database_url,
                config.db_max_connections,
                config.db_connect_timeout,
            )
            .await
            .context("Failed to connect to database")?;
            info!("Database connected");

            let store = MySqlRecordStore::new(pool);
            store
                .ensure_schema()
                .await
                .context("Failed to prepare attendance_records table")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; records are lost on restart");
            Ok(Arc::new(MemoryRecordStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        backend = %config.store_backend,
        display_zone = config.display_zone.name(),
        "Server starting..."
    );

    let store = build_store(&config).await?;
    let service = Data::new(AttendanceService::new(store, config.display_zone.clone()));

    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, "HTTP API listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service.clone())
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
