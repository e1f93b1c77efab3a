use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;
use uuid::Uuid;

use super::error::TransportError;
use super::{Paging, RequestOptions, Transport};
use crate::config::ClientConfig;

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";
const REQUEST_ID_HEADER: &str = "requestId";
const PAGE_HEADER: &str = "navigationPage";
const PAGE_SIZE_HEADER: &str = "navigationPageSize";

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeouts(Duration::from_secs(10), Duration::from_secs(120))
    }

    pub fn with_timeouts(connect: Duration, request: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect)
            .timeout(request)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::with_timeouts(
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn decorate(builder: RequestBuilder, token: &str, options: &RequestOptions) -> RequestBuilder {
        let mut builder = builder
            .bearer_auth(token)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .header(
                ACCEPT,
                options.accept.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE),
            );
        if let Some(verb) = options.method_override {
            builder = builder.header(METHOD_OVERRIDE_HEADER, verb.as_str());
        }
        builder
    }

    fn with_body(builder: RequestBuilder, body: &str, options: &RequestOptions) -> RequestBuilder {
        builder
            .header(
                CONTENT_TYPE,
                options.content_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE),
            )
            .body(body.to_string())
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<String, TransportError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}

impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        token: &str,
        paging: Option<Paging>,
    ) -> Result<String, TransportError> {
        debug!(method = "GET", url, ?paging, "sending request");
        let mut builder = Self::decorate(self.client.get(url), token, &RequestOptions::default());
        if let Some(paging) = paging {
            builder = builder
                .header(PAGE_HEADER, paging.page.to_string())
                .header(PAGE_SIZE_HEADER, paging.page_size.to_string());
        }
        self.send(builder, url).await
    }

    async fn post(
        &self,
        url: &str,
        token: &str,
        body: &str,
        options: &RequestOptions,
    ) -> Result<String, TransportError> {
        debug!(method = "POST", url, method_override = ?options.method_override, "sending request");
        let builder = Self::decorate(self.client.post(url), token, options);
        self.send(Self::with_body(builder, body, options), url).await
    }

    async fn put(
        &self,
        url: &str,
        token: &str,
        body: &str,
        options: &RequestOptions,
    ) -> Result<String, TransportError> {
        debug!(method = "PUT", url, method_override = ?options.method_override, "sending request");
        let builder = Self::decorate(self.client.put(url), token, options);
        self.send(Self::with_body(builder, body, options), url).await
    }

    async fn delete(
        &self,
        url: &str,
        token: &str,
        body: Option<&str>,
        options: &RequestOptions,
    ) -> Result<String, TransportError> {
        debug!(method = "DELETE", url, "sending request");
        let mut builder = Self::decorate(self.client.delete(url), token, options);
        if let Some(body) = body {
            builder = Self::with_body(builder, body, options);
        }
        self.send(builder, url).await
    }
}
