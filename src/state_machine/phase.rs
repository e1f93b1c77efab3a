use chrono::{DateTime, Utc};

use super::job::validate_name;
use super::state::{PhaseState, StateChange, StateTrack};
use crate::environment::Rights;
use crate::error::ModelError;

/// A named, independently stateful sub-step of a [`Job`](super::Job).
///
/// Phases only live inside a job's phase map; they are created here and
/// handed to [`Job::add_phase`](super::Job::add_phase).
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    name: String,
    required: bool,
    rights: Rights,
    states_rights: Rights,
    track: StateTrack<PhaseState>,
}

impl Phase {
    pub fn new(name: impl Into<String>, required: bool) -> Result<Self, ModelError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            required,
            rights: Rights::new(),
            states_rights: Rights::new(),
            track: StateTrack::new(Utc::now()),
        })
    }

    pub(crate) fn restore(
        name: String,
        required: bool,
        rights: Rights,
        states_rights: Rights,
        track: StateTrack<PhaseState>,
    ) -> Self {
        Self {
            name,
            required,
            rights,
            states_rights,
            track,
        }
    }

    /// ACL for the phase resource itself.
    pub fn with_rights(mut self, rights: Rights) -> Self {
        self.rights = rights;
        self
    }

    /// ACL for the phase's `states` sub-resource.
    pub fn with_states_rights(mut self, rights: Rights) -> Self {
        self.states_rights = rights;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn rights(&self) -> &Rights {
        &self.rights
    }

    pub fn states_rights(&self) -> &Rights {
        &self.states_rights
    }

    pub fn state(&self) -> Option<PhaseState> {
        self.track.current()
    }

    pub fn state_description(&self) -> Option<&str> {
        self.track.description()
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.track.last_modified()
    }

    pub fn states(&self) -> &[StateChange<PhaseState>] {
        self.track.history()
    }

    pub fn change_state(
        &mut self,
        state: PhaseState,
        description: Option<String>,
    ) -> DateTime<Utc> {
        self.track.change(state, description)
    }

    pub(crate) fn change_state_at(
        &mut self,
        state: PhaseState,
        description: Option<String>,
        at: DateTime<Utc>,
    ) -> DateTime<Utc> {
        self.track.change_at(state, description, at)
    }

    pub(crate) fn track(&self) -> &StateTrack<PhaseState> {
        &self.track
    }
}
