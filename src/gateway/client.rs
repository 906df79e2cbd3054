//! HTTP client for the payment gateway.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::gateway::classify::RawResponse;
use crate::gateway::request::UpstreamRequest;

/// Thin wrapper over a shared `reqwest::Client`. One call per dispatch;
/// nothing is retried.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("terminal-proxy/", env!("CARGO_PKG_VERSION")));

        if let Some(secs) = timeouts.upstream_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Send the request and read the full response.
    pub async fn dispatch(&self, request: &UpstreamRequest) -> Result<RawResponse, reqwest::Error> {
        let mut builder = self.http.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let body = response.text().await?;

        Ok(RawResponse {
            status,
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}
