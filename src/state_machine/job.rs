use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use super::state::{JobState, PhaseState, StateChange, StateTrack};
use crate::error::ModelError;

/// Start-up instructions handed to the remote service when a job is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initialization {
    pub phase_name: String,
    pub payload: Option<String>,
}

/// A named, remotely executed unit of work.
///
/// The local value mirrors what the remote service reports. State only
/// changes through [`Job::change_state`] and [`Job::change_phase_state`],
/// both of which keep `last_modified` monotonic.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: Option<String>,
    name: String,
    description: Option<String>,
    created: DateTime<Utc>,
    timeout_secs: Option<u64>,
    initialization: Option<Initialization>,
    phases: HashMap<String, Phase>,
    track: StateTrack<JobState>,
}

/// Names become URL path segments, so blanks, whitespace and URL
/// delimiters are refused.
pub(crate) fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | ';' | '%'))
    {
        return Err(ModelError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl Job {
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        validate_name(&name)?;
        let now = Utc::now();
        Ok(Self {
            id: None,
            name,
            description: None,
            created: now,
            timeout_secs: None,
            initialization: None,
            phases: HashMap::new(),
            track: StateTrack::new(now),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: Option<String>,
        name: String,
        description: Option<String>,
        created: DateTime<Utc>,
        timeout_secs: Option<u64>,
        initialization: Option<Initialization>,
        phases: HashMap<String, Phase>,
        track: StateTrack<JobState>,
    ) -> Result<Self, ModelError> {
        validate_name(&name)?;
        Ok(Self {
            id,
            name,
            description,
            created,
            timeout_secs,
            initialization,
            phases,
            track,
        })
    }

    /// Address an existing remote job, e.g. before a query or delete.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The service applies timeouts at whole-second granularity.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_initialization(mut self, initialization: Initialization) -> Self {
        self.initialization = Some(initialization);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.track.last_modified()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    pub fn initialization(&self) -> Option<&Initialization> {
        self.initialization.as_ref()
    }

    pub fn state(&self) -> Option<JobState> {
        self.track.current()
    }

    pub fn state_description(&self) -> Option<&str> {
        self.track.description()
    }

    /// Every state change in the order it happened.
    pub fn states(&self) -> &[StateChange<JobState>] {
        self.track.history()
    }

    pub fn phases(&self) -> &HashMap<String, Phase> {
        &self.phases
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.get(name)
    }

    /// Remote collection this job lives in, e.g. `gradings`.
    pub fn resource_name(&self) -> String {
        format!("{}s", self.name)
    }

    pub fn change_state(&mut self, state: JobState, description: Option<String>) -> DateTime<Utc> {
        self.track.change(state, description)
    }

    /// Change a phase's state and advance this job's `last_modified` to the
    /// same instant. The job's own state is left alone.
    pub fn change_phase_state(
        &mut self,
        phase_name: &str,
        state: PhaseState,
        description: Option<String>,
    ) -> Result<DateTime<Utc>, ModelError> {
        let job_modified = self.track.last_modified();
        let phase = self
            .phases
            .get_mut(phase_name)
            .ok_or_else(|| ModelError::UnknownPhase(phase_name.to_string()))?;
        let at = Utc::now().max(job_modified);
        let stamped = phase.change_state_at(state, description, at);
        self.track.touch(stamped);
        Ok(stamped)
    }

    pub fn add_phase(&mut self, phase: Phase) -> Result<(), ModelError> {
        match self.phases.entry(phase.name().to_string()) {
            Entry::Occupied(existing) => Err(ModelError::DuplicatePhase(existing.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(phase);
                Ok(())
            }
        }
    }

    pub(crate) fn track(&self) -> &StateTrack<JobState> {
        &self.track
    }
}

/// Flattened audit view of a job and its phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub job_id: Option<String>,
    pub name: String,
    pub state: Option<JobState>,
    pub state_transitions: Vec<StateChange<JobState>>,
    pub phase_transitions: HashMap<String, Vec<StateChange<PhaseState>>>,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl AuditRecord {
    pub fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            name: job.name.clone(),
            state: job.state(),
            state_transitions: job.states().to_vec(),
            phase_transitions: job
                .phases
                .iter()
                .map(|(name, phase)| (name.clone(), phase.states().to_vec()))
                .collect(),
            created: job.created,
            last_modified: job.last_modified(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_creation_defaults() {
        let job = Job::new("grading").unwrap();
        assert_eq!(job.id(), None);
        assert_eq!(job.name(), "grading");
        assert_eq!(job.state(), None);
        assert_eq!(job.state_description(), None);
        assert_eq!(job.created(), job.last_modified());
        assert!(job.phases().is_empty());
        assert_eq!(job.resource_name(), "gradings");
    }

    #[test]
    fn invalid_names_rejected() {
        for name in ["", "two words", "tab\tname", " lead", "a/b", "q?x", "frag#1", "m;zoneId=x", "pct%2F"] {
            assert!(
                matches!(Job::new(name), Err(ModelError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn change_state_never_regresses() {
        let mut job = Job::new("grading").unwrap();
        let mut previous = job.last_modified();
        for state in [
            JobState::NotStarted,
            JobState::InProgress,
            JobState::InProgress,
            JobState::Completed,
        ] {
            let stamped = job.change_state(state, None);
            assert!(stamped >= previous);
            assert_eq!(job.last_modified(), stamped);
            previous = stamped;
        }
        assert_eq!(job.state(), Some(JobState::Completed));
        assert_eq!(job.states().len(), 4);
        assert!(job.last_modified() >= job.created());
    }

    #[test]
    fn duplicate_phase_is_a_conflict() {
        let mut job = Job::new("grading").unwrap();
        job.add_phase(Phase::new("upload", true).unwrap()).unwrap();
        job.change_phase_state("upload", PhaseState::Completed, Some("done".into()))
            .unwrap();

        let err = job.add_phase(Phase::new("upload", false).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::DuplicatePhase(ref n) if n == "upload"));

        let kept = job.phase("upload").unwrap();
        assert!(kept.required());
        assert_eq!(kept.state(), Some(PhaseState::Completed));
    }

    #[test]
    fn phase_change_propagates_timestamp_only() {
        let mut job = Job::new("grading").unwrap();
        job.add_phase(Phase::new("mark", false).unwrap()).unwrap();
        job.change_state(JobState::InProgress, Some("running".into()));

        let stamped = job
            .change_phase_state("mark", PhaseState::InProgress, None)
            .unwrap();

        assert_eq!(job.phase("mark").unwrap().last_modified(), stamped);
        assert_eq!(job.last_modified(), stamped);
        assert_eq!(job.state(), Some(JobState::InProgress));
        assert_eq!(job.state_description(), Some("running"));
        assert_eq!(job.states().len(), 1);
    }

    #[test]
    fn unknown_phase_change_fails() {
        let mut job = Job::new("grading").unwrap();
        let before = job.last_modified();
        let err = job
            .change_phase_state("missing", PhaseState::Failed, None)
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownPhase(_)));
        assert_eq!(job.last_modified(), before);
    }

    #[test]
    fn audit_record_from_job() {
        let mut job = Job::new("grading").unwrap().with_id("abc-123");
        job.add_phase(Phase::new("mark", false).unwrap()).unwrap();
        job.change_state(JobState::InProgress, None);
        job.change_phase_state("mark", PhaseState::Completed, None)
            .unwrap();

        let record = AuditRecord::from_job(&job);
        assert_eq!(record.job_id.as_deref(), Some("abc-123"));
        assert_eq!(record.state, Some(JobState::InProgress));
        assert_eq!(record.state_transitions.len(), 1);
        assert_eq!(record.phase_transitions["mark"].len(), 1);
        assert_eq!(record.last_modified, job.last_modified());
    }
}
