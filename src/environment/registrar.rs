use tracing::info;

use super::Environment;
use crate::error::ClientError;

/// Session management against the remote infrastructure.
///
/// `register` turns an environment template into the resolved environment
/// the client will operate in and obtains an authorisation token.
#[allow(async_fn_in_trait)]
pub trait Registrar {
    async fn register(&mut self, template: &Environment) -> Result<Environment, ClientError>;

    /// `remove` asks the infrastructure to discard the environment as well.
    async fn unregister(&mut self, remove: bool) -> Result<(), ClientError>;

    fn is_registered(&self) -> bool;

    fn authorisation_token(&self) -> Option<&str>;
}

/// Registrar for pre-provisioned deployments: the template already is the
/// resolved environment and the token is issued out of band.
#[derive(Debug, Clone)]
pub struct StaticRegistrar {
    token: String,
    registered: bool,
}

impl StaticRegistrar {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            registered: false,
        }
    }
}

impl Registrar for StaticRegistrar {
    async fn register(&mut self, template: &Environment) -> Result<Environment, ClientError> {
        if self.token.trim().is_empty() {
            return Err(ClientError::Registration(
                "no authorisation token configured".into(),
            ));
        }
        self.registered = true;
        info!(solution = %template.solution_id, "registered with static environment");
        Ok(template.clone())
    }

    async fn unregister(&mut self, remove: bool) -> Result<(), ClientError> {
        self.registered = false;
        info!(remove, "unregistered");
        Ok(())
    }

    fn is_registered(&self) -> bool {
        self.registered
    }

    fn authorisation_token(&self) -> Option<&str> {
        self.registered.then_some(self.token.as_str())
    }
}
