//! RAG webhook protocol.
//!
//! This module builds the outbound request, performs the HTTP round trip
//! and classifies the reply into a uniform shape.
//!
//! # Architecture
//!
//! The RAG module is organized into:
//! - `request`: request parameters and the builder merging settings with editor context
//! - `client`: the HTTP client with timeout and TLS controls
//! - `types`: wire types, classification and normalization
//!
//! # Usage
//!
//! ```ignore
//! use rag_chat::rag::{Query, RagClient, RequestBuilder};
//!
//! let query = Query::new("where is the session token refreshed?").unwrap();
//! let params = RequestBuilder::new(&settings).build(&query, None, false)?;
//! let client = RagClient::builder().build()?;
//! let answer = client.query(&settings.webhook_url, &params, settings.timeout()).await?;
//! ```

pub mod client;
pub mod request;
pub mod types;

pub use client::{RagClient, RagClientBuilder, RagClientConfig, query};
pub use request::{
    ContextLines, ParamValue, Query, RequestBuilder, RequestContext, RequestParameters,
};
pub use types::{NO_ANSWER, NormalizedResponse, RagResponse, SourceCitation, UNKNOWN_ERROR};
