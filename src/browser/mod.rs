pub mod indicator;
pub mod stdio;
pub mod tabs;

pub use indicator::{IndicatorError, StatusIndicator};
pub use stdio::{EventReader, JsonLinesIndicator};
pub use tabs::{TabLookup, TabRegistry};
