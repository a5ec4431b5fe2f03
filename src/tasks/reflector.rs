use std::sync::Arc;

use thiserror::Error;

use crate::{
    browser::{IndicatorError, StatusIndicator},
    classifier::{classify, InvalidUrl},
    domain::{Classification, TabId},
    lists::ListStore,
};

#[derive(Debug, Error)]
pub enum ReflectError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrl),
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Classifies a tab's URL against the current list snapshot and pushes the
/// matching icon and title to the browser.
pub struct UiReflector {
    lists: Arc<ListStore>,
    indicator: Arc<dyn StatusIndicator>,
}

impl UiReflector {
    pub fn new(lists: Arc<ListStore>, indicator: Arc<dyn StatusIndicator>) -> Self {
        Self { lists, indicator }
    }

    pub async fn reflect(&self, tab_id: TabId, url: &str) -> Result<Classification, ReflectError> {
        let snapshot = self.lists.current();
        // An unparseable URL leaves the tab's indicator as it was.
        let status = classify(url, &snapshot)?;

        self.indicator.show_indicator(tab_id).await?;
        self.indicator.set_icon(tab_id, status.icon_set()).await?;
        self.indicator.set_title(tab_id, status.title()).await?;

        tracing::debug!(target: "browser", tab_id, url, ?status, "indicator updated");
        Ok(status)
    }
}
