//! Headless server binary.
//!
//! Starts the axum web server and waits for Ctrl+C.

use tracing_subscriber::EnvFilter;

use barcode_server_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting barcode JPEG generator");

    let state = barcode_server_lib::init_foundation();
    server::start_server(state, shutdown_signal()).await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
