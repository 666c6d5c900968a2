use dotenv::dotenv;
use eyre::WrapErr;
use flower_checkout::{Config, app};
use log::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Err(err) = dotenv() {
        info!("Failed to load .env file: {}", err);
    }
    pretty_env_logger::init();
    color_eyre::install()?;

    // Без полной конфигурации сервис не стартует
    let config = Config::load().wrap_err("Invalid configuration")?;
    let addr = config.listen_addr()?;
    info!(
        "Tariffs: {}",
        config.tariffs.plans().collect::<Vec<_>>().join(", ")
    );
    info!("YooKassa API: {}", config.gateway.base_url);

    let app = app(&config).wrap_err("Failed to create YooKassa client")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("HTTP server failed")?;
    info!("Stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", err);
    }
}
