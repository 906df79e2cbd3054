//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Gateway hosts must be absolute http(s) URLs
//! - Validate value ranges (limits > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `gateway.test_url`).
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration, collecting every issue.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError {
            field: "listener.max_body_bytes",
            message: "must be greater than zero".to_string(),
        });
    }

    let gateway = &config.gateway;
    check_http_url(&mut errors, "gateway.production_url", &gateway.production_url);
    check_http_url(&mut errors, "gateway.test_url", &gateway.test_url);
    check_http_url(&mut errors, "gateway.report_url", &gateway.report_url);

    let version = gateway.api_version.trim();
    if version.is_empty() || version.contains('/') {
        errors.push(ValidationError {
            field: "gateway.api_version",
            message: format!("must be a single path segment, got '{}'", gateway.api_version),
        });
    }
    if gateway.preview_limit == 0 {
        errors.push(ValidationError {
            field: "gateway.preview_limit",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.timeouts.upstream_secs == Some(0) {
        errors.push(ValidationError {
            field: "timeouts.upstream_secs",
            message: "must be greater than zero when set".to_string(),
        });
    }

    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field,
            message: format!("'{}' is not a socket address", value),
        });
    }
}

fn check_http_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        Ok(url) => errors.push(ValidationError {
            field,
            message: format!("'{}' must be an http(s) URL with a host (scheme '{}')", value, url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field,
            message: format!("'{}' is not a valid URL: {}", value, e),
        }),
    }
}
