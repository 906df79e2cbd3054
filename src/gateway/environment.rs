//! Environment selection and base-URL resolution.
//!
//! # Responsibilities
//! - Map (environment, optional custom URL) to the upstream base URL
//! - Normalize operator-supplied custom hosts
//!
//! # Design Decisions
//! - Resolution never fails: an empty custom URL falls back to production,
//!   and malformed custom input still yields a URL string whose problems
//!   surface at dispatch time
//! - Resolving an already-resolved custom URL is a no-op

use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;

/// Gateway deployment targeted by a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[serde(alias = "prod")]
    Production,
    Test,
    Custom,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Test => "test",
            Environment::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute base URL ending in the API version segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a path (e.g. `/Device`) to the base.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    /// Append a path followed by one percent-encoded identifier segment.
    pub fn join_id(&self, path: &str, id: &str) -> String {
        let joined = self.join(path);
        match url::Url::parse(&joined) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(id);
                }
                url.to_string()
            }
            // Unparseable custom hosts still get a best-effort URL; the
            // dispatch step reports what is wrong with it.
            Err(_) => format!("{}/{}", joined, id),
        }
    }
}

impl std::fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl GatewayConfig {
    /// Resolve the upstream base URL for one call.
    pub fn resolve_base_url(&self, environment: Environment, custom_url: Option<&str>) -> BaseUrl {
        let custom = custom_url.map(str::trim).filter(|u| !u.is_empty());
        match (environment, custom) {
            (Environment::Custom, Some(url)) => normalize_custom_url(url, &self.api_version),
            (Environment::Custom, None) => {
                tracing::debug!("Custom environment without a URL, using production");
                versioned(&self.production_url, &self.api_version)
            }
            (Environment::Test, _) => versioned(&self.test_url, &self.api_version),
            (Environment::Production, _) => versioned(&self.production_url, &self.api_version),
        }
    }

    /// Endpoint of the environment-independent reporting host.
    pub fn report_endpoint(&self) -> String {
        format!("{}/reportjson", self.report_url.trim_end_matches('/'))
    }
}

fn version_suffix(api_version: &str) -> String {
    format!("/{}", api_version.trim_matches('/'))
}

fn versioned(host: &str, api_version: &str) -> BaseUrl {
    BaseUrl(format!("{}{}", host.trim_end_matches('/'), version_suffix(api_version)))
}

/// Normalize a custom host into a base URL: default to `https://` when no
/// scheme is given and append the version segment when missing.
pub fn normalize_custom_url(raw: &str, api_version: &str) -> BaseUrl {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let mut url = if lower.starts_with("https://") || lower.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let suffix = version_suffix(api_version);
    let without_slash = url.trim_end_matches('/').len();
    url.truncate(without_slash);
    if !url.ends_with(&suffix) {
        url.push_str(&suffix);
    }
    BaseUrl(url)
}
