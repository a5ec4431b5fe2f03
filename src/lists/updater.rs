use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use super::{
    remote::{FetchError, ListSource},
    store::ListStore,
};
use crate::domain::SafetyList;

#[derive(Debug)]
pub enum CheckOutcome {
    Fresh,
    Refreshed(Arc<SafetyList>),
    FellBack(FetchError),
}

/// Pulls the remote list into [`ListStore`], degrading to the cached or
/// bundled copy on any failure. Only runs when triggered; there is no timer.
pub struct RemoteUpdater {
    store: Arc<ListStore>,
    source: Arc<dyn ListSource>,
    interval: Duration,
}

impl RemoteUpdater {
    pub fn new(store: Arc<ListStore>, source: Arc<dyn ListSource>, interval: Duration) -> Self {
        Self {
            store,
            source,
            interval,
        }
    }

    pub fn store(&self) -> &Arc<ListStore> {
        &self.store
    }

    /// Fetches, persists and activates a fresh list. On failure the fallback
    /// chain has already run by the time the error is returned.
    pub async fn refresh(&self) -> Result<Arc<SafetyList>, FetchError> {
        match self.try_refresh().await {
            Ok(list) => {
                tracing::info!(
                    target: "update",
                    entries = list.len(),
                    source = %self.source.describe(),
                    "websites list updated"
                );
                Ok(list)
            }
            Err(err) => {
                tracing::error!(
                    target: "update",
                    error = %err,
                    source = %self.source.describe(),
                    "failed to update websites list, falling back"
                );
                // load() logs its own failure; the active list stays as it was.
                let _ = self.store.load().await;
                Err(err)
            }
        }
    }

    async fn try_refresh(&self) -> Result<Arc<SafetyList>, FetchError> {
        let list = self.source.fetch().await?;
        self.store.save(&list, Utc::now()).await?;
        Ok(self.store.replace(list))
    }

    pub async fn check_and_refresh_if_stale(&self, now: DateTime<Utc>) -> CheckOutcome {
        if !self.store.is_stale(now, self.interval).await {
            tracing::debug!(target: "update", "websites list is fresh");
            return CheckOutcome::Fresh;
        }
        match self.refresh().await {
            Ok(list) => CheckOutcome::Refreshed(list),
            Err(err) => CheckOutcome::FellBack(err),
        }
    }

    /// Startup sequence: restore the cached list, then refresh if stale.
    pub async fn initialize(&self, now: DateTime<Utc>) -> CheckOutcome {
        let _ = self.store.load().await;
        self.check_and_refresh_if_stale(now).await
    }
}
