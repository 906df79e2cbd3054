//! Terminal API test-harness proxy library.
//!
//! Forwards browser calls to the card-payment terminal gateway, choosing
//! the production, test, or a custom deployment per call, and returns each
//! result with a redacted request/response trace.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
