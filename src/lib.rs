//! Typed client for long-running jobs exposed by a remote functional
//! service, and the local Job/Phase model it keeps in step with the
//! remote side.

pub mod config;
pub mod environment;
pub mod error;
pub mod functional;
pub mod state_machine;
pub mod transport;

pub use config::ClientConfig;
pub use environment::{Environment, Registrar, StaticRegistrar};
pub use error::{ClientError, ModelError};
pub use functional::{FunctionalServiceClient, PhaseRequest, Scope};
pub use state_machine::{Job, JobState, Phase, PhaseState};
pub use transport::{HttpTransport, Transport, TransportError};
