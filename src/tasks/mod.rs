pub mod dispatcher;
pub mod reflector;
pub mod sequencer;

pub use dispatcher::EventDispatcher;
pub use reflector::{ReflectError, UiReflector};
pub use sequencer::{TabSequencer, Ticket};
