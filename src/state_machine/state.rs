use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states a remote job can report.
///
/// The remote service is the authority on which transitions are legal;
/// the local model records whatever it is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::NotStarted => write!(f, "NOTSTARTED"),
            JobState::InProgress => write!(f, "INPROGRESS"),
            JobState::Completed => write!(f, "COMPLETED"),
            JobState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Lifecycle states of a single phase within a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhaseState {
    NotStarted,
    Pending,
    Skipped,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseState::NotStarted => write!(f, "NOTSTARTED"),
            PhaseState::Pending => write!(f, "PENDING"),
            PhaseState::Skipped => write!(f, "SKIPPED"),
            PhaseState::InProgress => write!(f, "INPROGRESS"),
            PhaseState::Completed => write!(f, "COMPLETED"),
            PhaseState::Failed => write!(f, "FAILED"),
        }
    }
}

/// One timestamped entry in a job's or phase's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange<S> {
    pub state: S,
    pub description: Option<String>,
    pub at: DateTime<Utc>,
}

/// State bookkeeping shared by [`Job`](super::Job) and [`Phase`](super::Phase).
///
/// Holds the current state, its description, the last-modified timestamp
/// and the full history of changes. Every change stamps a time that is
/// never earlier than the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTrack<S> {
    current: Option<S>,
    description: Option<String>,
    last_modified: DateTime<Utc>,
    history: Vec<StateChange<S>>,
}

impl<S: Copy> StateTrack<S> {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            current: None,
            description: None,
            last_modified: at,
            history: Vec::new(),
        }
    }

    /// Rebuilds a track from decoded wire data.
    pub(crate) fn restore(
        current: Option<S>,
        description: Option<String>,
        last_modified: DateTime<Utc>,
        history: Vec<StateChange<S>>,
    ) -> Self {
        Self {
            current,
            description,
            last_modified,
            history,
        }
    }

    pub fn current(&self) -> Option<S> {
        self.current
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn history(&self) -> &[StateChange<S>] {
        &self.history
    }

    /// Record a change at the current time. Returns the stamped time.
    pub fn change(&mut self, state: S, description: Option<String>) -> DateTime<Utc> {
        self.change_at(state, description, Utc::now())
    }

    /// Record a change at `at`, clamped so `last_modified` never goes backwards.
    pub fn change_at(
        &mut self,
        state: S,
        description: Option<String>,
        at: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let stamp = at.max(self.last_modified);
        self.current = Some(state);
        self.description = description.clone();
        self.last_modified = stamp;
        self.history.push(StateChange {
            state,
            description,
            at: stamp,
        });
        stamp
    }

    /// Advance `last_modified` without touching the state.
    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.last_modified = self.last_modified.max(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_track_has_no_state() {
        let now = Utc::now();
        let track: StateTrack<JobState> = StateTrack::new(now);
        assert_eq!(track.current(), None);
        assert_eq!(track.description(), None);
        assert_eq!(track.last_modified(), now);
        assert!(track.history().is_empty());
    }

    #[test]
    fn change_records_history() {
        let mut track = StateTrack::new(Utc::now());
        track.change(JobState::InProgress, Some("started".into()));
        track.change(JobState::Completed, None);

        assert_eq!(track.current(), Some(JobState::Completed));
        assert_eq!(track.description(), None);
        let states: Vec<_> = track.history().iter().map(|c| c.state).collect();
        assert_eq!(states, vec![JobState::InProgress, JobState::Completed]);
        assert_eq!(track.history()[0].description.as_deref(), Some("started"));
    }

    #[test]
    fn same_state_still_bumps_timestamp() {
        let start = Utc::now();
        let mut track = StateTrack::new(start);
        let later = start + Duration::seconds(5);
        let stamped = track.change_at(PhaseState::Pending, None, later);
        let again = track.change_at(PhaseState::Pending, None, later + Duration::seconds(1));

        assert_eq!(stamped, later);
        assert_eq!(again, later + Duration::seconds(1));
        assert_eq!(track.history().len(), 2);
    }

    #[test]
    fn earlier_clock_never_regresses() {
        let start = Utc::now();
        let mut track = StateTrack::new(start);
        let stamped = track.change_at(JobState::Failed, None, start - Duration::minutes(10));
        assert_eq!(stamped, start);
        assert_eq!(track.last_modified(), start);
    }

    #[test]
    fn touch_only_moves_forward() {
        let start = Utc::now();
        let mut track: StateTrack<JobState> = StateTrack::new(start);
        track.touch(start - Duration::seconds(1));
        assert_eq!(track.last_modified(), start);
        track.touch(start + Duration::seconds(1));
        assert_eq!(track.last_modified(), start + Duration::seconds(1));
        assert_eq!(track.current(), None);
    }

    #[test]
    fn state_display_matches_wire_names() {
        assert_eq!(JobState::NotStarted.to_string(), "NOTSTARTED");
        assert_eq!(JobState::InProgress.to_string(), "INPROGRESS");
        assert_eq!(PhaseState::Skipped.to_string(), "SKIPPED");
        let json = serde_json::to_string(&PhaseState::InProgress).unwrap();
        assert_eq!(json, r#""INPROGRESS""#);
    }
}
