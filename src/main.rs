use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use hrm_sync::cache::QueryCache;
use hrm_sync::config::Config;
use hrm_sync::docs::ApiDoc;
use hrm_sync::gateway::Gateway;
use hrm_sync::gateway::memory::InMemoryGateway;
use hrm_sync::gateway::rest::RestGateway;
use hrm_sync::preferences::PreferenceStore;
use hrm_sync::resource::DataContext;
use hrm_sync::routes;

fn gateway(config: &Config) -> anyhow::Result<Arc<dyn Gateway>> {
    if config.uses_memory_gateway() {
        warn!("Using the in-memory store; nothing will be persisted");
        return Ok(Arc::new(InMemoryGateway::new()));
    }
    let rest = RestGateway::new(
        &config.gateway_url,
        &config.gateway_api_key,
        config.gateway_timeout,
    )
    .context("failed to build the gateway client")?;
    Ok(Arc::new(rest))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, gateway = %config.gateway_url, "Server starting...");

    let ctx = Data::new(
        DataContext::new(gateway(&config)?, QueryCache::new(&config.cache))
            .with_buckets(config.buckets.clone())
            .with_payroll_policy(config.payroll_policy),
    );
    let preferences = Data::new(PreferenceStore::open(&config.preferences_path));
    let limiter = Arc::new(routes::build_limiter(config.rate_api_per_min)?);

    let mut events = ctx.cache().subscribe();
    actix_web::rt::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    debug!(key = %event.key, status = %event.status, stale = event.stale, "Cache event")
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Cache event log lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard matches the UI's JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(ctx.clone())
            .app_data(preferences.clone())
            .configure(|cfg| routes::configure(cfg, &api_prefix, limiter.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
