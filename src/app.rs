use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{
    io::{AsyncBufRead, AsyncWrite},
    time::timeout,
};

use crate::{
    browser::{EventReader, JsonLinesIndicator, StatusIndicator, TabRegistry},
    config::AppConfig,
    db::{self, SqliteStore},
    domain::BrowserEvent,
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    lists::{BundledList, HttpListSource, ListStore, RemoteUpdater},
    tasks::{EventDispatcher, UiReflector},
};

/// Host process: reads browser events from `R`, writes UI commands to the
/// writer given at initialization.
pub struct GuardianApp<R> {
    events: EventReader<R>,
    updater: Arc<RemoteUpdater>,
    dispatcher: EventDispatcher,
    registry: Arc<TabRegistry>,
    storage: SqliteStore,
    shutdown: Shutdown,
}

impl<R> GuardianApp<R>
where
    R: AsyncBufRead + Unpin,
{
    pub async fn initialize<W>(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
        input: R,
        output: W,
    ) -> Result<Self>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let pool = db::init_pool(&paths.db_path)
            .await
            .with_context(|| format!("failed to open {}", paths.db_path.display()))?;
        let storage = SqliteStore::new(pool);

        let http_client = Client::builder()
            .user_agent(format!("site-guardian/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        let source = Arc::new(HttpListSource::new(
            http_client,
            config.lists.remote_url.clone(),
            config.lists.fetch_timeout,
        ));

        let lists = Arc::new(ListStore::new(
            Arc::new(storage.clone()),
            BundledList::from_path(config.lists.bundled_path.clone()),
        ));
        let updater = Arc::new(RemoteUpdater::new(
            lists.clone(),
            source,
            config.lists.update_interval,
        ));

        let indicator: Arc<dyn StatusIndicator> = Arc::new(JsonLinesIndicator::new(output));
        let reflector = Arc::new(UiReflector::new(lists, indicator));
        let registry = Arc::new(TabRegistry::new());
        let dispatcher = EventDispatcher::new(updater.clone(), reflector, registry.clone());

        Ok(Self {
            events: EventReader::new(input),
            updater,
            dispatcher,
            registry,
            storage,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let GuardianApp {
            mut events,
            updater,
            dispatcher,
            registry,
            storage,
            shutdown,
        } = self;

        tracing::info!(target: "app", "site guardian started");
        if shutdown.is_triggered() {
            tracing::info!(target: "app", "shutdown requested during startup");
        } else {
            // Restore the cached list before any tab is classified; the remote
            // check runs in the background.
            let _ = updater.store().load().await;
            dispatcher.spawn_refresh_check();
        }

        let mut shutdown_listener = shutdown.subscribe();
        while !shutdown.is_triggered() {
            let event = tokio::select! {
                _ = shutdown_listener.notified() => {
                    tracing::info!(target: "app", "shutdown signal received");
                    break;
                }
                next = events.next_event() => next,
            };

            match event {
                Ok(Some(event)) => {
                    track_tab(&registry, &event);
                    dispatcher.dispatch(event);
                }
                Ok(None) => {
                    tracing::info!(target: "app", "event stream closed");
                    break;
                }
                Err(err) => {
                    tracing::error!(target: "app", error = %err, "failed to read events");
                    break;
                }
            }
        }

        shutdown.trigger();

        let drain_timeout = Duration::from_secs(5);
        if timeout(drain_timeout, dispatcher.drain()).await.is_err() {
            tracing::warn!(
                target: "app",
                "in-flight tasks did not finish within {:?}; exiting anyway",
                drain_timeout
            );
        }

        if timeout(drain_timeout, storage.close()).await.is_err() {
            tracing::warn!(
                target: "storage",
                "storage pool did not close within {:?}",
                drain_timeout
            );
        }

        tracing::info!(target: "app", "site guardian stopped");
        Ok(())
    }
}

/// Keeps the tab registry in step with navigation so activation events can
/// be resolved to a URL.
fn track_tab(registry: &TabRegistry, event: &BrowserEvent) {
    match event {
        BrowserEvent::TabUpdated {
            tab_id,
            url: Some(url),
        }
        | BrowserEvent::TabActivated {
            tab_id,
            url: Some(url),
        } => registry.remember(*tab_id, url),
        BrowserEvent::TabRemoved { tab_id } => registry.forget(*tab_id),
        _ => {}
    }
}
