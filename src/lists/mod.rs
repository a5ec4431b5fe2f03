pub mod bundled;
pub mod remote;
pub mod store;
pub mod updater;

pub use bundled::{BundledList, BundledListError};
pub use remote::{FetchError, HttpListSource, ListSource};
pub use store::{ListStore, ListStoreError};
pub use updater::{CheckOutcome, RemoteUpdater};
