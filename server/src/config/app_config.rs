//! Runtime application configuration loaded from the environment.

use std::path::PathBuf;

use barcode_engine::encode::DEFAULT_JPEG_QUALITY;

use super::validation::validate_setting;

/// Runtime configuration populated from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub bind_address: String,
    pub default_dpi: u32,
    pub jpeg_quality: u8,
    pub max_rows: usize,
    pub max_body_bytes: usize,
    pub caption_font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            bind_address: "0.0.0.0".into(),
            default_dpi: 300,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_rows: 5000,
            max_body_bytes: 10 * 1024 * 1024,
            caption_font_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Invalid values are logged and replaced by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> Option<String> {
            let value = lookup(key)?.trim().to_string();
            if value.is_empty() {
                return None;
            }
            match validate_setting(key, &value) {
                Ok(()) => Some(value),
                Err(e) => {
                    tracing::warn!(key, value = %value, "Ignoring invalid setting: {e}");
                    None
                }
            }
        };
        let defaults = Self::default();

        Self {
            server_port: parse_or(g("SERVER_PORT"), defaults.server_port),
            bind_address: g("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            default_dpi: parse_or(g("DEFAULT_DPI"), defaults.default_dpi),
            jpeg_quality: parse_or(g("JPEG_QUALITY"), defaults.jpeg_quality),
            max_rows: parse_or(g("MAX_ROWS"), defaults.max_rows),
            max_body_bytes: parse_or(g("MAX_BODY_BYTES"), defaults.max_body_bytes),
            caption_font_path: g("CAPTION_FONT_PATH").map(PathBuf::from),
        }
    }

    /// Socket address string the server binds to.
    pub fn listen_addr(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.server_port)
        } else {
            format!("{}:{}", self.bind_address, self.server_port)
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
