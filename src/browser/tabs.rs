use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::TabId;

/// Resolves a tab's current URL, for activation events that arrive without
/// one.
///
/// [`TabRegistry`] only knows tabs the host has seen navigate or activate
/// with a URL. Tabs loaded before the host started resolve only if the shim
/// attaches the URL to `tabActivated`.
#[async_trait]
pub trait TabLookup: Send + Sync {
    async fn tab_url(&self, tab_id: TabId) -> Option<String>;
}

/// Last URL seen per tab, fed from navigation events.
#[derive(Debug, Default)]
pub struct TabRegistry {
    urls: RwLock<HashMap<TabId, String>>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&self, tab_id: TabId, url: &str) {
        self.urls.write().insert(tab_id, url.to_string());
    }

    pub fn forget(&self, tab_id: TabId) {
        self.urls.write().remove(&tab_id);
    }
}

#[async_trait]
impl TabLookup for TabRegistry {
    async fn tab_url(&self, tab_id: TabId) -> Option<String> {
        self.urls.read().get(&tab_id).cloned()
    }
}
