//! The environment a client operates in: where services live, which zone
//! requests target by default, and which rights each provisioned service
//! carries per zone.

pub mod registrar;
pub mod rights;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use registrar::{Registrar, StaticRegistrar};
pub use rights::{RightType, RightValue, Rights};

/// Category of remote service. Each category has its own base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    Object,
    Functional,
    Utility,
    ServicePath,
    XqueryTemplate,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Object => write!(f, "OBJECT"),
            ServiceType::Functional => write!(f, "FUNCTIONAL"),
            ServiceType::Utility => write!(f, "UTILITY"),
            ServiceType::ServicePath => write!(f, "SERVICEPATH"),
            ServiceType::XqueryTemplate => write!(f, "XQUERYTEMPLATE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
}

impl Zone {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
}

impl Context {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A service provisioned to this environment within one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub service_type: ServiceType,
    pub context: Option<String>,
    pub rights: Rights,
}

impl ServiceInfo {
    pub fn functional(name: impl Into<String>, rights: Rights) -> Self {
        Self {
            name: name.into(),
            service_type: ServiceType::Functional,
            context: None,
            rights,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    pub solution_id: String,
    pub application_key: String,
    pub instance_id: Option<String>,
    pub user_token: Option<String>,
    pub default_zone: Option<Zone>,
    pub service_urls: HashMap<ServiceType, String>,
    /// Provisioned services keyed by zone id.
    pub provisioned: HashMap<String, Vec<ServiceInfo>>,
}

impl Environment {
    pub fn new(solution_id: impl Into<String>, application_key: impl Into<String>) -> Self {
        Self {
            solution_id: solution_id.into(),
            application_key: application_key.into(),
            ..Default::default()
        }
    }

    pub fn with_service_url(mut self, service_type: ServiceType, url: impl Into<String>) -> Self {
        let url = url.into();
        self.service_urls
            .insert(service_type, url.trim_end_matches('/').to_string());
        self
    }

    pub fn with_default_zone(mut self, zone: Zone) -> Self {
        self.default_zone = Some(zone);
        self
    }

    pub fn provision(mut self, zone: &Zone, service: ServiceInfo) -> Self {
        self.provisioned
            .entry(zone.id.clone())
            .or_default()
            .push(service);
        self
    }

    /// Base URL for a service category, without a trailing slash.
    pub fn service_url(&self, service_type: ServiceType) -> Option<&str> {
        self.service_urls.get(&service_type).map(String::as_str)
    }

    /// The explicitly requested zone, falling back to the environment default.
    pub fn target_zone<'a>(&'a self, requested: Option<&'a Zone>) -> Option<&'a Zone> {
        requested.or(self.default_zone.as_ref())
    }

    /// Looks up the descriptor for `name` of `service_type` in `zone`.
    ///
    /// A service bound to a specific context only matches when the caller
    /// asks for that context or for none at all.
    pub fn resolve_service(
        &self,
        zone: &Zone,
        name: &str,
        service_type: ServiceType,
        context: Option<&Context>,
    ) -> Option<&ServiceInfo> {
        self.provisioned.get(&zone.id)?.iter().find(|service| {
            service.name == name
                && service.service_type == service_type
                && match (context, service.context.as_deref()) {
                    (Some(wanted), Some(bound)) => wanted.id == bound,
                    _ => true,
                }
        })
    }
}
