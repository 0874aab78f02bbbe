//! RAG webhook client.
//!
//! One call is one `POST` of the request parameters as JSON. The whole round
//! trip, body included, runs under the caller's timeout; when it expires the
//! in-flight request is dropped. Nothing is retried or cached.
//!
//! # Example
//!
//! ```ignore
//! use rag_chat::rag::RagClient;
//! use std::time::Duration;
//!
//! let client = RagClient::builder().validate_certificates(false).build()?;
//! let response = client
//!     .query("https://rag.internal/webhook", &params, Duration::from_secs(30))
//!     .await?;
//! println!("{}", response.answer);
//! ```

use std::error::Error as _;
use std::time::{Duration, Instant};

use reqwest::Url;
use tracing::{debug, info, warn};

use crate::error::ClientError;

use super::request::RequestParameters;
use super::types::{NormalizedResponse, RagResponse};

/// Configuration for building a RAG client.
#[derive(Debug, Clone)]
pub struct RagClientConfig {
    /// Validate TLS certificates of `https` endpoints.
    pub validate_certificates: bool,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for RagClientConfig {
    fn default() -> Self {
        Self {
            validate_certificates: true,
            user_agent: format!("rag-chat/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for constructing a RAG client.
#[derive(Debug, Default)]
pub struct RagClientBuilder {
    config: RagClientConfig,
}

impl RagClientBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables TLS certificate validation.
    #[must_use]
    pub fn validate_certificates(mut self, validate: bool) -> Self {
        self.config.validate_certificates = validate;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the TLS backend cannot be
    /// initialized.
    pub fn build(self) -> Result<RagClient, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(self.config.user_agent.clone())
            .danger_accept_invalid_certs(!self.config.validate_certificates)
            .build()
            .map_err(transport_error)?;

        Ok(RagClient {
            config: self.config,
            http,
        })
    }
}

/// Client for the RAG webhook.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RagClient {
    config: RagClientConfig,
    http: reqwest::Client,
}

impl RagClient {
    /// Creates a new builder for constructing a RAG client.
    pub fn builder() -> RagClientBuilder {
        RagClientBuilder::new()
    }

    /// Whether this client validates TLS certificates.
    pub fn validates_certificates(&self) -> bool {
        self.config.validate_certificates
    }

    /// Sends `params` to `endpoint` and classifies the reply.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Configuration`] for an invalid or non-http(s) endpoint
    /// - [`ClientError::Transport`] for connect, DNS, TLS or read failures
    /// - [`ClientError::Timeout`] when `timeout` elapses first
    /// - [`ClientError::MalformedResponse`] when the body is not valid JSON
    /// - [`ClientError::Application`] for a non-200 `code`
    pub async fn query(
        &self,
        endpoint: &str,
        params: &RequestParameters,
        timeout: Duration,
    ) -> Result<NormalizedResponse, ClientError> {
        let url = parse_endpoint(endpoint)?;

        info!(
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            timeout_ms = timeout.as_millis(),
            "querying RAG webhook"
        );

        let started = Instant::now();
        let round_trip = async {
            let response = self
                .http
                .post(url)
                .json(params)
                .send()
                .await
                .map_err(transport_error)?;
            let status = response.status();
            let body = response.text().await.map_err(transport_error)?;
            Ok::<_, ClientError>((status, body))
        };

        let (status, body) = tokio::time::timeout(timeout, round_trip)
            .await
            .map_err(|_| ClientError::Timeout(timeout))??;

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "webhook responded"
        );

        let response = RagResponse::parse(&body)?;
        match response.classify() {
            Ok(normalized) => {
                info!(sources = normalized.sources.len(), "answer received");
                Ok(normalized)
            }
            Err(err) => {
                warn!(error = %err, "webhook returned an error");
                Err(err)
            }
        }
    }
}

/// Sends one query with a throwaway client.
///
/// # Errors
///
/// See [`RagClient::query`].
pub async fn query(
    endpoint: &str,
    params: &RequestParameters,
    timeout: Duration,
    validate_certificates: bool,
) -> Result<NormalizedResponse, ClientError> {
    RagClient::builder()
        .validate_certificates(validate_certificates)
        .build()?
        .query(endpoint, params, timeout)
        .await
}

/// Parses the webhook URL; only `http` and `https` are accepted.
fn parse_endpoint(endpoint: &str) -> Result<Url, ClientError> {
    let url = Url::parse(endpoint.trim()).map_err(|e| {
        ClientError::Configuration(format!("invalid webhook URL '{endpoint}': {e}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::Configuration(format!(
            "unsupported webhook URL scheme '{other}'; use http or https"
        ))),
    }
}

/// Flattens a reqwest error and its causes into one message.
fn transport_error(err: reqwest::Error) -> ClientError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    ClientError::Transport(message)
}
