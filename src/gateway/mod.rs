//! Payment gateway subsystem.
//!
//! # Data Flow
//! ```text
//! inbound fields (credential, environment, ids)
//!     → environment.rs (resolve base URL)
//!     → request.rs (validate, rename, default, attach credential)
//!     → client.rs (single outbound call)
//!     → classify.rs (JSON pass-through / synthesized error / transport kind)
//!     → trace.rs (redacted request + response record)
//! ```
//!
//! # Design Decisions
//! - Stateless per call; nothing is shared between requests but the
//!   immutable config and the connection pool
//! - Credentials never reach a trace or a log line unredacted

pub mod classify;
pub mod client;
pub mod environment;
pub mod request;
pub mod trace;

pub use classify::{
    classify_reqwest_error, classify_response, classify_transport_error, Classified, RawResponse,
    TransportFailure, TransportFailureKind,
};
pub use client::GatewayClient;
pub use environment::{normalize_custom_url, BaseUrl, Environment};
pub use request::{
    CancelSession, GatewayTarget, InitiateSession, InvalidInput, Operation, RegisterDevice,
    Rejected, RequestBuilder, TransactionReport, UpdateDevice, UpstreamRequest,
};
pub use trace::{DebugTrace, RecordedRequest, RecordedResponse, REDACTED};
