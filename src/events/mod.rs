//! Update events and their delivery to observers

pub mod broadcaster;
pub mod update;

pub use broadcaster::{Broadcaster, Observer, ObserverId, DEFAULT_REORDER_LIMIT};
pub use update::{StateChange, UpdateEvent, UpdateKind};
