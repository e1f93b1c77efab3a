//! Wire-level HTTP access to the functional service.
//!
//! [`Transport`] is the seam the client talks through; [`HttpTransport`]
//! is the `reqwest` implementation used in production.

pub mod client;
pub mod error;

use std::fmt;

pub use client::HttpTransport;
pub use error::TransportError;

/// Verb a POST or PUT stands in for, sent as a method-override header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodOverride {
    Get,
    Delete,
}

impl MethodOverride {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodOverride::Get => "GET",
            MethodOverride::Delete => "DELETE",
        }
    }
}

impl fmt::Display for MethodOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request knobs for body-carrying requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method_override: Option<MethodOverride>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
}

impl RequestOptions {
    pub fn overriding(verb: MethodOverride) -> Self {
        Self {
            method_override: Some(verb),
            ..Default::default()
        }
    }
}

/// Page selection for collection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: u32,
    pub page_size: u32,
}

/// Blocking-in-spirit HTTP verbs: each call is exactly one round-trip and
/// resolves to the raw response body.
///
/// Implementations must report HTTP 404 as [`TransportError::NotFound`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(
        &self,
        url: &str,
        token: &str,
        paging: Option<Paging>,
    ) -> Result<String, TransportError>;

    async fn post(
        &self,
        url: &str,
        token: &str,
        body: &str,
        options: &RequestOptions,
    ) -> Result<String, TransportError>;

    async fn put(
        &self,
        url: &str,
        token: &str,
        body: &str,
        options: &RequestOptions,
    ) -> Result<String, TransportError>;

    async fn delete(
        &self,
        url: &str,
        token: &str,
        body: Option<&str>,
        options: &RequestOptions,
    ) -> Result<String, TransportError>;
}
