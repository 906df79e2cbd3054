use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::*;

pub struct TerminalClient {
    client: Client,
    proxy_url: String,
}

impl TerminalClient {
    pub fn new(proxy_url: &str) -> Self {
        Self {
            client: Client::new(),
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn register_device(
        &self,
        target: &Target,
        device: &DeviceRegistration,
    ) -> Result<Envelope<RegisterDeviceResponse>, reqwest::Error> {
        self.send_json(Method::POST, &["api", "device"], target, device).await
    }

    pub async fn list_devices(
        &self,
        target: &Target,
    ) -> Result<Envelope<ListDevicesResponse>, reqwest::Error> {
        self.send_query(&["api", "device"], target).await
    }

    pub async fn device_status(
        &self,
        target: &Target,
        device_id: &str,
    ) -> Result<Envelope<DeviceStatusResponse>, reqwest::Error> {
        self.send_query(&["api", "device", device_id], target).await
    }

    pub async fn update_device(
        &self,
        target: &Target,
        device_id: &str,
        friendly_name: &str,
    ) -> Result<Envelope<GatewayResult>, reqwest::Error> {
        let fields = serde_json::json!({ "friendlyName": friendly_name });
        self.send_json(Method::PUT, &["api", "device", device_id], target, &fields)
            .await
    }

    pub async fn delete_device(
        &self,
        target: &Target,
        device_id: &str,
    ) -> Result<Envelope<GatewayResult>, reqwest::Error> {
        let fields = serde_json::json!({});
        self.send_json(Method::DELETE, &["api", "device", device_id], target, &fields)
            .await
    }

    pub async fn initiate_session(
        &self,
        target: &Target,
        session: &SessionRequest,
    ) -> Result<Envelope<SessionInitiateResponse>, reqwest::Error> {
        self.send_json(Method::POST, &["api", "session"], target, session).await
    }

    pub async fn session_status(
        &self,
        target: &Target,
        session_id: &str,
    ) -> Result<Envelope<SessionStatusResponse>, reqwest::Error> {
        self.send_query(&["api", "session", session_id], target).await
    }

    pub async fn cancel_session(
        &self,
        target: &Target,
        session_id: &str,
        device_id: &str,
    ) -> Result<Envelope<GatewayResult>, reqwest::Error> {
        let fields = serde_json::json!({ "deviceId": device_id });
        self.send_json(Method::DELETE, &["api", "session", session_id], target, &fields)
            .await
    }

    /// Report payloads vary by transaction type, so they stay untyped.
    pub async fn transaction_report(
        &self,
        target: &Target,
        ref_num: &str,
    ) -> Result<Envelope<Map<String, Value>>, reqwest::Error> {
        let fields = serde_json::json!({ "refNum": ref_num });
        self.send_json(Method::POST, &["api", "report"], target, &fields).await
    }

    /// `GET /api/health`; returns the raw health document.
    pub async fn health(&self) -> Result<Value, reqwest::Error> {
        self.client
            .get(self.endpoint(&["api", "health"]))
            .send()
            .await?
            .json()
            .await
    }

    async fn send_json<T, F>(
        &self,
        method: Method,
        segments: &[&str],
        target: &Target,
        fields: &F,
    ) -> Result<Envelope<T>, reqwest::Error>
    where
        T: DeserializeOwned,
        F: Serialize,
    {
        let mut body = to_object(target);
        body.extend(to_object(fields));
        let builder = self
            .client
            .request(method, self.endpoint(segments))
            .json(&body);
        Self::envelope(builder).await
    }

    async fn send_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        target: &Target,
    ) -> Result<Envelope<T>, reqwest::Error> {
        let builder = self
            .client
            .get(self.endpoint(segments))
            .query(target);
        Self::envelope(builder).await
    }

    /// Proxy URL with `segments` appended; ids are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> String {
        match Url::parse(&self.proxy_url) {
            Ok(mut url) => {
                if let Ok(mut path) = url.path_segments_mut() {
                    path.pop_if_empty().extend(segments);
                }
                url.to_string()
            }
            Err(_) => format!("{}/{}", self.proxy_url, segments.join("/")),
        }
    }

    async fn envelope<T: DeserializeOwned>(
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, reqwest::Error> {
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let mut envelope: Envelope<T> = resp.json().await?;
        envelope.status = status;
        Ok(envelope)
    }
}

fn to_object<S: Serialize>(value: &S) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_ids() {
        let client = TerminalClient::new("http://localhost:8080/");
        assert_eq!(
            client.endpoint(&["api", "session", "s/1?x"]),
            "http://localhost:8080/api/session/s%2F1%3Fx"
        );
        assert_eq!(client.endpoint(&["api", "device"]), "http://localhost:8080/api/device");
    }
}
