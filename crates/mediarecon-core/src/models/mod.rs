//! Domain models

pub mod media;
pub mod stage;

pub use media::{MediaKind, MediaPatch, MediaRecord, UpdateOutcome};
pub use stage::Stage;
