mod entry;
mod marathon;
mod participant;
mod position;

pub use entry::MetricEntry;
pub use marathon::{Marathon, MarathonKind, MarathonState};
pub use participant::MarathonParticipant;
pub use position::FrozenPosition;
