pub mod event;
pub mod types;

pub use event::{BrowserEvent, UiCommand};
pub use types::{Classification, IconSet, SafetyList, TabId};
