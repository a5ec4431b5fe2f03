use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinSet;

use super::{
    reflector::{ReflectError, UiReflector},
    sequencer::{TabSequencer, Ticket},
};
use crate::{
    browser::TabLookup,
    domain::{BrowserEvent, TabId},
    lists::{CheckOutcome, RemoteUpdater},
};

/// Turns browser events into independent background tasks.
pub struct EventDispatcher {
    updater: Arc<RemoteUpdater>,
    reflector: Arc<UiReflector>,
    tabs: Arc<dyn TabLookup>,
    sequencer: Arc<TabSequencer>,
    tasks: Mutex<JoinSet<()>>,
}

impl EventDispatcher {
    pub fn new(
        updater: Arc<RemoteUpdater>,
        reflector: Arc<UiReflector>,
        tabs: Arc<dyn TabLookup>,
    ) -> Self {
        Self {
            updater,
            reflector,
            tabs,
            sequencer: Arc::new(TabSequencer::new()),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Fire-and-forget: returns as soon as the handling task is spawned.
    pub fn dispatch(&self, event: BrowserEvent) {
        match event {
            BrowserEvent::Startup => self.spawn_initialize(),
            BrowserEvent::TabUpdated {
                tab_id,
                url: Some(url),
            } => {
                let ticket = self.sequencer.issue(tab_id);
                self.spawn_reflect(ticket, Some(url));
            }
            BrowserEvent::TabUpdated { url: None, .. } => {}
            BrowserEvent::TabActivated { tab_id, url } => {
                let ticket = self.sequencer.issue(tab_id);
                self.spawn_reflect(ticket, url);
            }
            BrowserEvent::TabRemoved { tab_id } => self.sequencer.forget(tab_id),
        }
    }

    /// Browser-startup trigger: reload the cached list, then refresh it if
    /// stale.
    pub fn spawn_initialize(&self) {
        let updater = self.updater.clone();
        self.spawn(async move {
            log_outcome(updater.initialize(Utc::now()).await);
        });
    }

    /// Staleness check alone, for when the cached list is already loaded.
    pub fn spawn_refresh_check(&self) {
        let updater = self.updater.clone();
        self.spawn(async move {
            log_outcome(updater.check_and_refresh_if_stale(Utc::now()).await);
        });
    }

    /// A `None` url is resolved through the tab lookup.
    fn spawn_reflect(&self, ticket: Ticket, url: Option<String>) {
        let reflector = self.reflector.clone();
        let tabs = self.tabs.clone();
        let sequencer = self.sequencer.clone();
        self.spawn(async move {
            let tab_id = ticket.tab_id();
            let url = match url {
                Some(url) => url,
                None => match tabs.tab_url(tab_id).await {
                    Some(url) => url,
                    None => {
                        tracing::debug!(target: "dispatch", tab_id, "activated tab has no URL");
                        return;
                    }
                },
            };

            let applied = sequencer
                .run_latest(ticket, |tab_id| async move {
                    report(tab_id, &url, reflector.reflect(tab_id, &url).await)
                })
                .await;
            if applied.is_none() {
                tracing::debug!(target: "dispatch", tab_id, "superseded by a newer event");
            }
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    /// Waits for every task spawned so far, including ones spawned while
    /// waiting.
    pub async fn drain(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.tasks.lock());
            if pending.is_empty() {
                return;
            }
            while let Some(result) = pending.join_next().await {
                if let Err(err) = result {
                    if err.is_panic() {
                        tracing::error!(target: "dispatch", "event task panicked");
                    }
                }
            }
        }
    }
}

fn log_outcome(outcome: CheckOutcome) {
    match outcome {
        CheckOutcome::Fresh => tracing::info!(target: "dispatch", "websites list is up to date"),
        CheckOutcome::Refreshed(list) => {
            tracing::info!(target: "dispatch", entries = list.len(), "websites list refreshed")
        }
        CheckOutcome::FellBack(_) => {
            tracing::warn!(target: "dispatch", "websites list refresh failed, using fallback")
        }
    }
}

fn report<T>(tab_id: TabId, url: &str, result: Result<T, ReflectError>) {
    match result {
        Ok(_) => {}
        Err(ReflectError::InvalidUrl(err)) => {
            tracing::warn!(target: "dispatch", tab_id, error = %err, "skipping tab with invalid URL");
        }
        Err(ReflectError::Indicator(err)) => {
            tracing::warn!(target: "dispatch", tab_id, url, error = %err, "failed to update indicator");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex as SyncMutex;

    use super::*;
    use crate::{
        browser::{IndicatorError, StatusIndicator, TabRegistry},
        db::MemoryStore,
        domain::{IconSet, SafetyList},
        lists::{BundledList, FetchError, ListSource, ListStore},
    };

    struct StaticSource(&'static [&'static str]);

    #[async_trait]
    impl ListSource for StaticSource {
        async fn fetch(&self) -> Result<SafetyList, FetchError> {
            Ok(SafetyList::new(self.0.iter()))
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    /// Records icons; `show_indicator` stalls for tabs listed in `slow`.
    #[derive(Default)]
    struct Recorder {
        icons: SyncMutex<Vec<(TabId, IconSet)>>,
        slow: Vec<TabId>,
    }

    #[async_trait]
    impl StatusIndicator for Recorder {
        async fn show_indicator(&self, tab_id: TabId) -> Result<(), IndicatorError> {
            if self.slow.contains(&tab_id) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok(())
        }

        async fn set_icon(&self, tab_id: TabId, icon_set: IconSet) -> Result<(), IndicatorError> {
            self.icons.lock().push((tab_id, icon_set));
            Ok(())
        }

        async fn set_title(&self, _tab_id: TabId, _title: &str) -> Result<(), IndicatorError> {
            Ok(())
        }
    }

    struct Harness {
        dispatcher: EventDispatcher,
        recorder: Arc<Recorder>,
        registry: Arc<TabRegistry>,
        lists: Arc<ListStore>,
    }

    fn harness(recorder: Recorder) -> Harness {
        let lists = Arc::new(ListStore::new(
            Arc::new(MemoryStore::new()),
            BundledList::Embedded,
        ));
        lists.replace(SafetyList::new(["github.com"]));
        let updater = Arc::new(RemoteUpdater::new(
            lists.clone(),
            Arc::new(StaticSource(&["remote.example"])),
            Duration::from_secs(24 * 60 * 60),
        ));
        let recorder = Arc::new(recorder);
        let reflector = Arc::new(UiReflector::new(lists.clone(), recorder.clone()));
        let registry = Arc::new(TabRegistry::new());
        Harness {
            dispatcher: EventDispatcher::new(updater, reflector, registry.clone()),
            recorder,
            registry,
            lists,
        }
    }

    #[tokio::test]
    async fn test_updated_without_url_is_ignored() {
        let h = harness(Recorder::default());
        h.dispatcher.dispatch(BrowserEvent::TabUpdated { tab_id: 1, url: None });
        h.dispatcher.drain().await;
        assert!(h.recorder.icons.lock().is_empty());
    }

    #[tokio::test]
    async fn test_activated_resolves_url_through_lookup() {
        let h = harness(Recorder::default());
        h.registry.remember(4, "https://www.github.com/");

        h.dispatcher.dispatch(BrowserEvent::TabActivated { tab_id: 4, url: None });
        h.dispatcher.dispatch(BrowserEvent::TabActivated { tab_id: 5, url: None });
        h.dispatcher.drain().await;

        assert_eq!(*h.recorder.icons.lock(), vec![(4, IconSet::Safe)]);
    }

    #[tokio::test]
    async fn test_activated_with_url_skips_lookup() {
        let h = harness(Recorder::default());
        // Loaded before the host started: never seen in a tabUpdated event.
        h.dispatcher.dispatch(BrowserEvent::TabActivated {
            tab_id: 6,
            url: Some("https://github.com/".to_string()),
        });
        h.dispatcher.drain().await;

        assert_eq!(*h.recorder.icons.lock(), vec![(6, IconSet::Safe)]);
    }

    #[tokio::test]
    async fn test_last_event_for_a_tab_wins() {
        let h = harness(Recorder {
            slow: vec![7],
            ..Default::default()
        });

        h.dispatcher.dispatch(BrowserEvent::TabUpdated {
            tab_id: 7,
            url: Some("https://github.com/".to_string()),
        });
        h.dispatcher.dispatch(BrowserEvent::TabUpdated {
            tab_id: 7,
            url: Some("https://unlisted.example/".to_string()),
        });
        h.dispatcher.drain().await;

        let icons = h.recorder.icons.lock();
        assert_eq!(icons.last(), Some(&(7, IconSet::Unknown)));
    }

    #[tokio::test]
    async fn test_invalid_url_does_not_affect_other_tabs() {
        let h = harness(Recorder::default());
        h.dispatcher.dispatch(BrowserEvent::TabUpdated {
            tab_id: 1,
            url: Some("::broken::".to_string()),
        });
        h.dispatcher.dispatch(BrowserEvent::TabUpdated {
            tab_id: 2,
            url: Some("https://github.com/".to_string()),
        });
        h.dispatcher.drain().await;

        assert_eq!(*h.recorder.icons.lock(), vec![(2, IconSet::Safe)]);
    }

    #[tokio::test]
    async fn test_startup_refreshes_stale_list() {
        let h = harness(Recorder::default());
        h.dispatcher.dispatch(BrowserEvent::Startup);
        h.dispatcher.drain().await;

        assert_eq!(h.lists.current().entries(), &["remote.example".to_string()]);
    }
}
