//! One GET request per invocation, and the tri-state outcome it produces.
//!
//! Every integration goes through [`fetch`]: it builds the URL from a base URL plus
//! query parameters, calls a [`Transport`], and folds transport failures, non-200
//! statuses and malformed bodies into a [`FetchResult`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::{error::Error as StdError, fmt::Debug, time::Duration};
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

use crate::integration::IntegrationId;

const USER_AGENT: &str = concat!("briefing/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum TransportError {
    /// No response was received (DNS, connect, TLS, timeout).
    #[error("{0}")]
    Send(String),

    /// Headers arrived but the body could not be read.
    #[error("{message}")]
    Body { status: u16, message: String },
}

/// Status and body text of a response, before any JSON parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::build(Client::builder())
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Self::build(Client::builder().timeout(timeout))
    }

    fn build(builder: reqwest::ClientBuilder) -> Result<Self, TransportError> {
        let http = builder
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Send(error_chain(&e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<RawResponse, TransportError> {
        let mut req = self.http.get(url.clone());
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        // reqwest embeds the full URL (token included) in its errors
        let res = req
            .send()
            .await
            .map_err(|e| TransportError::Send(error_chain(&e.without_url())))?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| TransportError::Body {
            status,
            message: error_chain(&e.without_url()),
        })?;

        Ok(RawResponse { status, body })
    }
}

/// Joins an error with all of its sources, `outer: inner: root`.
fn error_chain(err: &dyn StdError) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    msg
}

/// Outcome of one provider call.
///
/// `Success` only ever comes from a 200 response whose body parsed. Anything else is
/// `Failed`, where `status` is `None` when no response was received at all.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<T> {
    Success(T),
    Failed { status: Option<u16>, message: String },
}

impl<T> FetchResult<T> {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchResult::Success(_) => Some(200),
            FetchResult::Failed { status, .. } => *status,
        }
    }

    /// Diagnostic text; empty on success.
    pub fn message(&self) -> &str {
        match self {
            FetchResult::Success(_) => "",
            FetchResult::Failed { message, .. } => message,
        }
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            FetchResult::Success(payload) => Some(payload),
            FetchResult::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }
}

/// Everything [`fetch`] needs to build and send one GET request.
#[derive(Debug, Clone)]
pub struct ProviderRequest<'a> {
    pub integration: IntegrationId,
    pub base_url: &'a str,
    pub path: &'a str,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
}

impl<'a> ProviderRequest<'a> {
    pub fn new(integration: IntegrationId, base_url: &'a str, path: &'a str) -> Self {
        Self { integration, base_url, path, query: Vec::new(), headers: Vec::new() }
    }

    pub fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Base URL followed by an ellipsis marker; stands in for the real URL in messages.
    pub fn redacted_url(&self) -> String {
        format!("{}/...", self.base_url.trim_end_matches('/'))
    }

    pub fn url(&self) -> Result<Url, url::ParseError> {
        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), self.path);
        Url::parse_with_params(&raw, self.query.iter().map(|(k, v)| (*k, v.as_str())))
    }
}

/// Sends `request` through `transport` and parses a 200 body as `T`.
pub async fn fetch<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: &ProviderRequest<'_>,
) -> FetchResult<T> {
    let id = request.integration;
    let redacted = request.redacted_url();

    let url = match request.url() {
        Ok(url) => url,
        Err(e) => {
            return FetchResult::Failed {
                status: None,
                message: format!("{} request failed: {redacted}: {e}\n", id.label()),
            };
        }
    };

    debug!(integration = %id, url = %redacted, "sending request");

    let headers: Vec<(&str, &str)> =
        request.headers.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let response = match transport.get(&url, &headers).await {
        Ok(response) => response,
        Err(TransportError::Send(err)) => {
            let err = err.replace(url.as_str(), &redacted);
            debug!(integration = %id, error = %err, "request failed");
            return FetchResult::Failed {
                status: None,
                message: format!("{} request failed: {redacted}: {err}\n", id.label()),
            };
        }
        Err(TransportError::Body { status, message }) => {
            return FetchResult::Failed {
                status: Some(status),
                message: format!("Failed to read {id} response body: {message}\n"),
            };
        }
    };

    debug!(integration = %id, status = response.status, "response received");
    trace!(integration = %id, body = %response.body);

    if response.status != 200 {
        return FetchResult::Failed {
            status: Some(response.status),
            message: format!("{}\n", response.body),
        };
    }

    match serde_json::from_str::<T>(&response.body) {
        Ok(payload) => FetchResult::Success(payload),
        Err(e) => FetchResult::Failed {
            status: Some(200),
            message: format!("Reading {id} response body failed: {e}\n"),
        },
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Canned transport for tests; records the URL and headers it was called with.
    #[derive(Debug)]
    pub struct FakeTransport {
        reply: Mutex<Option<Result<RawResponse, TransportError>>>,
        pub seen_url: Mutex<Option<Url>>,
        pub seen_headers: Mutex<Vec<(String, String)>>,
    }

    impl FakeTransport {
        pub fn responding(status: u16, body: &str) -> Self {
            Self::with(Ok(RawResponse { status, body: body.to_string() }))
        }

        pub fn failing(err: TransportError) -> Self {
            Self::with(Err(err))
        }

        fn with(reply: Result<RawResponse, TransportError>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                seen_url: Mutex::new(None),
                seen_headers: Mutex::new(Vec::new()),
            }
        }

        pub fn was_called(&self) -> bool {
            self.seen_url.lock().unwrap().is_some()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(
            &self,
            url: &Url,
            headers: &[(&str, &str)],
        ) -> Result<RawResponse, TransportError> {
            *self.seen_url.lock().unwrap() = Some(url.clone());
            *self.seen_headers.lock().unwrap() =
                headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
            self.reply.lock().unwrap().take().expect("FakeTransport called more than once")
        }
    }
}
