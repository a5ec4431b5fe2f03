use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{IconSet, TabId};

#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("failed to deliver UI command: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode UI command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Per-tab page-action controls exposed by the browser. Every call is
/// idempotent for a given input.
#[async_trait]
pub trait StatusIndicator: Send + Sync {
    async fn show_indicator(&self, tab_id: TabId) -> Result<(), IndicatorError>;

    async fn set_icon(&self, tab_id: TabId, icon_set: IconSet) -> Result<(), IndicatorError>;

    async fn set_title(&self, tab_id: TabId, title: &str) -> Result<(), IndicatorError>;
}
