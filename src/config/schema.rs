//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the terminal proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Upstream gateway hosts and request defaults.
    pub gateway: GatewayConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Response envelope settings.
    pub envelope: EnvelopeConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Payment gateway deployments and the fixed values stamped onto requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Production device-management host, without the version segment.
    pub production_url: String,

    /// Sandbox device-management host, without the version segment.
    pub test_url: String,

    /// API version path segment appended to every device-management base URL.
    pub api_version: String,

    /// Reporting host (serves `/reportjson`), independent of environment.
    pub report_url: String,

    /// Value sent as `xSoftwareName`.
    pub software_name: String,

    /// Value sent as `xSoftwareVersion`.
    pub software_version: String,

    /// Value sent as `xVersion` on report requests.
    pub report_version: String,

    /// Device make used when the caller omits one.
    pub default_device_make: String,

    /// Prefix of synthesized `xExternalRequestId` values.
    pub external_request_prefix: String,

    /// Maximum characters of a non-JSON body kept for diagnostics.
    pub preview_limit: usize,

    /// Session commands that cannot be initiated without an amount.
    pub amount_required_commands: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            production_url: "https://device.cardknox.com".to_string(),
            test_url: "https://devdevice.cardknox.com".to_string(),
            api_version: "v1".to_string(),
            report_url: "https://x1.cardknox.com".to_string(),
            software_name: "SolaTerminalTester".to_string(),
            software_version: "1.0.0".to_string(),
            report_version: "5.0.0".to_string(),
            default_device_make: "pax".to_string(),
            external_request_prefix: "test".to_string(),
            preview_limit: 500,
            amount_required_commands: vec![
                "cc:sale".to_string(),
                "cc:authonly".to_string(),
                "cc:credit".to_string(),
            ],
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total upstream request timeout in seconds. `None` leaves the
    /// transport default in place.
    pub upstream_secs: Option<u64>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Response envelope configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Also emit the shorthand `endpoint`/`requestBody`/`responseStatus`
    /// fields inside `_debug` for older clients.
    pub legacy_debug_fields: bool,
}
