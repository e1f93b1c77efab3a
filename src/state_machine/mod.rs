mod job;
mod phase;
mod state;

pub use job::{AuditRecord, Initialization, Job};
pub(crate) use job::validate_name;
pub use phase::Phase;
pub use state::{JobState, PhaseState, StateChange, StateTrack};
