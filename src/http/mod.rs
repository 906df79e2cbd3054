//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Browser / CLI request
//!     → server.rs (Axum setup, middleware: request ID, trace, body limit)
//!     → extract.rs (JSON / query / path extraction, 400 on malformed input)
//!     → handlers/ (one per gateway operation)
//!     → gateway/ (resolve, build, dispatch, classify, trace)
//!     → response.rs (uniform JSON envelope with `_debug`)
//!     → Send to client
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::ResultEnvelope;
pub use server::{AppState, HttpServer};
