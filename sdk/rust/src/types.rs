use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway deployment targeted by a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Test,
    Custom,
}

/// Credential plus environment selection sent with every call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub api_key: String,
    pub environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_base_url: Option<String>,
}

impl Target {
    pub fn production(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            environment: Environment::Production,
            custom_base_url: None,
        }
    }

    pub fn test(api_key: impl Into<String>) -> Self {
        Self {
            environment: Environment::Test,
            ..Self::production(api_key)
        }
    }

    pub fn custom(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            environment: Environment::Custom,
            custom_base_url: Some(base_url.into()),
            ..Self::production(api_key)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    pub serial_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub device_id: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_tip_prompt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_request_id: Option<String>,
}

/// Envelope returned by the proxy: upstream fields plus `_debug`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// HTTP status of the proxy response.
    #[serde(skip)]
    pub status: u16,
    #[serde(flatten)]
    pub data: T,
    /// Proxy-side failure message (validation or transport).
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "_debug")]
    pub debug: Option<DebugTrace>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugTrace {
    pub version: u32,
    pub request: DebugRequest,
    pub response: Option<DebugResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

/// Fields every gateway reply may carry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResult {
    pub x_refnum: Option<String>,
    pub x_result: Option<String>,
    pub x_error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub x_device_id: String,
    pub x_device_serial_number: Option<String>,
    pub x_device_make: Option<String>,
    pub x_device_friendly_name: Option<String>,
    pub x_device_status: Option<String>,
    pub x_device_model: Option<String>,
    pub x_device_local_ip_address: Option<String>,
    #[serde(rename = "xDeviceOSVersion")]
    pub x_device_os_version: Option<String>,
    pub x_device_cardknox_application_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceResponse {
    pub x_device_id: Option<String>,
    #[serde(flatten)]
    pub result: GatewayResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDevicesResponse {
    pub x_devices: Option<Vec<Device>>,
    #[serde(flatten)]
    pub result: GatewayResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusResponse {
    pub x_device_id: Option<String>,
    pub x_device_status: Option<String>,
    #[serde(flatten)]
    pub result: GatewayResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInitiateResponse {
    pub x_session_id: Option<String>,
    #[serde(flatten)]
    pub result: GatewayResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub x_session_status: Option<String>,
    pub x_gateway_refnum: Option<String>,
    pub x_gateway_status: Option<String>,
    pub x_transaction_result: Option<Value>,
    #[serde(flatten)]
    pub result: GatewayResult,
}
