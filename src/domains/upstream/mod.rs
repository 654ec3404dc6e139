//! Upstream domain module.
//!
//! Everything needed to talk to the company data REST API:
//!
//! - `transport.rs` - One HTTP round trip (`UpstreamTransport`, reqwest-backed in production)
//! - `client.rs` - Rate-limit aware retry/backoff on top of a transport
//! - `envelope.rs` - Response envelope carrying provenance metadata
//! - `error.rs` - Upstream failure types

mod client;
mod envelope;
mod error;
mod transport;

pub use client::{BackoffClient, MAX_RETRIES, UpstreamResponse};
pub use envelope::{Envelope, Provenance};
pub use error::UpstreamError;
pub use transport::{RawResponse, ReqwestTransport, UpstreamRequest, UpstreamTransport};
