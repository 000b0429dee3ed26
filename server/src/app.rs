use std::sync::Arc;

use barcode_engine::CaptionCompositor;

use crate::config::AppConfig;

/// Application shared state accessible from axum handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration
    config: AppConfig,
    /// Caption renderer with the font resolved at startup
    compositor: Arc<CaptionCompositor>,
}

impl SharedState {
    pub fn new(config: AppConfig, compositor: CaptionCompositor) -> Self {
        Self {
            inner: Arc::new(SharedStateInner {
                config,
                compositor: Arc::new(compositor),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn compositor(&self) -> Arc<CaptionCompositor> {
        Arc::clone(&self.inner.compositor)
    }
}
