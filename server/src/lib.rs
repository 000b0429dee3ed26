pub mod app;
pub mod config;
pub mod server;

use barcode_engine::{CaptionCompositor, CaptionFont};

use app::SharedState;
use config::AppConfig;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load config and resolve the caption font.
pub fn init_foundation() -> SharedState {
    load_dotenv();

    let config = AppConfig::load();
    let font = CaptionFont::load(config.caption_font_path.as_deref());

    tracing::info!(
        port = config.server_port,
        dpi = config.default_dpi,
        font = ?font,
        "Settings loaded"
    );
    SharedState::new(config, CaptionCompositor::new(font))
}
