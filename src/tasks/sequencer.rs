use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;

use crate::domain::TabId;

type SlotMap = Mutex<HashMap<TabId, Arc<TabSlot>>>;

#[derive(Debug, Default)]
struct TabSlot {
    latest: AtomicU64,
    apply: tokio::sync::Mutex<()>,
}

/// Orders UI updates per tab so that the most recently received event wins.
///
/// Each event takes a ticket when it arrives. Tasks for the same tab apply
/// one at a time, and a task whose ticket has been superseded is dropped.
#[derive(Debug, Default)]
pub struct TabSequencer {
    slots: Arc<SlotMap>,
}

/// Claim on a tab's next UI update. Dropping it, applied or not, prunes the
/// tab's slot once no other ticket is outstanding.
#[derive(Debug)]
pub struct Ticket {
    tab_id: TabId,
    seq: u64,
    slot: Arc<TabSlot>,
    slots: Arc<SlotMap>,
}

impl Ticket {
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    fn is_latest(&self) -> bool {
        self.slot.latest.load(Ordering::SeqCst) == self.seq
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        // Map entry plus this ticket: nobody else is waiting on the slot.
        let idle = slots.get(&self.tab_id).is_some_and(|slot| {
            Arc::ptr_eq(slot, &self.slot) && Arc::strong_count(slot) == 2
        });
        if idle {
            slots.remove(&self.tab_id);
        }
    }
}

impl TabSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, tab_id: TabId) -> Ticket {
        let mut slots = self.slots.lock();
        let slot = slots.entry(tab_id).or_default().clone();
        let seq = slot.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            tab_id,
            seq,
            slot,
            slots: self.slots.clone(),
        }
    }

    /// Runs `apply` unless a newer ticket for the same tab exists. Returns
    /// `None` when the ticket was superseded.
    pub async fn run_latest<F, Fut, T>(&self, ticket: Ticket, apply: F) -> Option<T>
    where
        F: FnOnce(TabId) -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let _guard = ticket.slot.apply.lock().await;
        if ticket.is_latest() {
            Some(apply(ticket.tab_id).await)
        } else {
            None
        }
    }

    pub fn forget(&self, tab_id: TabId) {
        self.slots.lock().remove(&tab_id);
    }

    #[cfg(test)]
    fn tracked_tabs(&self) -> usize {
        self.slots.lock().len()
    }
}
