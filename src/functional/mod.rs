//! Client for the job resources of a remote functional service, together
//! with the wire records it exchanges and the marshalling seam.

pub mod client;
pub mod marshal;
pub mod types;
pub mod url;

pub use client::{FunctionalServiceClient, PhaseRequest};
pub use marshal::{JsonMarshaller, MarshalError, Marshaller};
pub use types::{BatchResult, ErrorRecord, ItemOutcome, JobRecord, PhaseRecord};
pub use url::Scope;
