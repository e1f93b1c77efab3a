//! Registros de transporte (wire records) do serviço funcional e o mapeamento
//! entre eles e o modelo de domínio.
//!
//! Todas as structs derivam `Serialize` e `Deserialize`; o formato concreto
//! (JSON, XML) fica a cargo do [`Marshaller`](super::Marshaller) escolhido.
//! As conversões `From<&Job>` e `TryFrom<JobRecord>` são simétricas.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::environment::Rights;
use crate::error::ModelError;
use crate::state_machine::{
    Initialization, Job, JobState, Phase, PhaseState, StateChange, StateTrack,
};

/// Uma entrada do histórico de estados, como trafega na rede.
///
/// O campo `state` é serializado como `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord<S> {
    #[serde(rename = "type")]
    pub state: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created: DateTime<Utc>,
}

/// Uma fase de job como trafega na rede.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRecord {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub rights: Rights,
    #[serde(default)]
    pub states_rights: Rights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PhaseState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub states: Vec<StateRecord<PhaseState>>,
}

/// Um job como trafega na rede.
///
/// `id` fica ausente até o serviço remoto atribuí-lo; `timeout` é expresso
/// em segundos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialization: Option<Initialization>,
    #[serde(default)]
    pub phases: Vec<PhaseRecord>,
    #[serde(default)]
    pub states: Vec<StateRecord<JobState>>,
}

/// Corpo de uma criação ou consulta em lote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobCollection {
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
}

/// Detalhe de erro retornado pelo serviço para um item de um lote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Resultado de um item em uma criação em lote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory_id: Option<String>,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

/// Resposta do serviço a uma criação em lote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    #[serde(default)]
    pub creates: Vec<CreateStatus>,
}

/// Identificador de um job a ser removido.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteId {
    pub id: String,
}

/// Corpo de uma remoção em lote (enviado via PUT com override DELETE).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub deletes: Vec<DeleteId>,
}

/// Resultado de um item em uma remoção em lote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStatus {
    pub id: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

/// Resposta do serviço a uma remoção em lote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub deletes: Vec<DeleteStatus>,
}

/// Resultado de um item em uma operação em lote, já no modelo de domínio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub id: Option<String>,
    pub advisory_id: Option<String>,
    pub status: u16,
    pub error: Option<ErrorRecord>,
}

impl ItemOutcome {
    /// Sucesso é qualquer status 2xx sem erro anexado.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.error.is_none()
    }
}

/// Resultado por item de uma criação ou remoção em lote, na ordem da resposta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchResult {
    pub fn successes(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ItemOutcome::is_success)
    }
}

impl From<CreateResponse> for BatchResult {
    fn from(response: CreateResponse) -> Self {
        let outcomes = response
            .creates
            .into_iter()
            .map(|c| ItemOutcome {
                id: c.id,
                advisory_id: c.advisory_id,
                status: c.status_code,
                error: c.error,
            })
            .collect();
        Self { outcomes }
    }
}

impl From<DeleteResponse> for BatchResult {
    fn from(response: DeleteResponse) -> Self {
        let outcomes = response
            .deletes
            .into_iter()
            .map(|d| ItemOutcome {
                id: Some(d.id),
                advisory_id: None,
                status: d.status_code,
                error: d.error,
            })
            .collect();
        Self { outcomes }
    }
}

fn history_to_wire<S: Copy>(history: &[StateChange<S>]) -> Vec<StateRecord<S>> {
    history
        .iter()
        .map(|c| StateRecord {
            state: c.state,
            description: c.description.clone(),
            created: c.at,
        })
        .collect()
}

fn history_from_wire<S>(records: Vec<StateRecord<S>>) -> Vec<StateChange<S>> {
    records
        .into_iter()
        .map(|r| StateChange {
            state: r.state,
            description: r.description,
            at: r.created,
        })
        .collect()
}

impl From<&Phase> for PhaseRecord {
    fn from(phase: &Phase) -> Self {
        Self {
            name: phase.name().to_string(),
            required: phase.required(),
            rights: phase.rights().clone(),
            states_rights: phase.states_rights().clone(),
            state: phase.state(),
            state_description: phase.state_description().map(str::to_string),
            last_modified: Some(phase.last_modified()),
            states: history_to_wire(phase.track().history()),
        }
    }
}

impl TryFrom<PhaseRecord> for Phase {
    type Error = ModelError;

    fn try_from(record: PhaseRecord) -> Result<Self, Self::Error> {
        if record.name.trim().is_empty() {
            return Err(ModelError::InvalidName(record.name));
        }
        let last_modified = record.last_modified.unwrap_or_else(Utc::now);
        let track = StateTrack::restore(
            record.state,
            record.state_description,
            last_modified,
            history_from_wire(record.states),
        );
        Ok(Phase::restore(
            record.name,
            record.required,
            record.rights,
            record.states_rights,
            track,
        ))
    }
}

impl From<&Job> for JobRecord {
    fn from(job: &Job) -> Self {
        let mut phases: Vec<PhaseRecord> = job.phases().values().map(PhaseRecord::from).collect();
        phases.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            id: job.id().map(str::to_string),
            name: job.name().to_string(),
            description: job.description().map(str::to_string),
            state: job.state(),
            state_description: job.state_description().map(str::to_string),
            created: Some(job.created()),
            last_modified: Some(job.last_modified()),
            timeout: job.timeout_secs(),
            initialization: job.initialization().cloned(),
            phases,
            states: history_to_wire(job.track().history()),
        }
    }
}

impl TryFrom<JobRecord> for Job {
    type Error = ModelError;

    fn try_from(record: JobRecord) -> Result<Self, Self::Error> {
        let created = record.created.unwrap_or_else(Utc::now);
        let last_modified = record.last_modified.unwrap_or(created).max(created);

        let mut phases = HashMap::with_capacity(record.phases.len());
        for phase_record in record.phases {
            let phase = Phase::try_from(phase_record)?;
            if phases.contains_key(phase.name()) {
                return Err(ModelError::DuplicatePhase(phase.name().to_string()));
            }
            phases.insert(phase.name().to_string(), phase);
        }

        let track = StateTrack::restore(
            record.state,
            record.state_description,
            last_modified,
            history_from_wire(record.states),
        );
        Job::restore(
            record.id,
            record.name,
            record.description,
            created,
            record.timeout,
            record.initialization,
            phases,
            track,
        )
    }
}
