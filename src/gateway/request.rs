//! Upstream request construction.
//!
//! # Responsibilities
//! - Validate mandatory inputs before any network call
//! - Rename caller fields to the gateway's `x`-prefixed names
//! - Fill gateway-required defaults (device make, software name, ...)
//! - Attach the caller's credential verbatim, in header or body
//!
//! # Design Decisions
//! - One builder method per operation, all sharing `assemble`
//! - Builders are pure; they never touch the network
//! - `Debug` on `UpstreamRequest` prints the redacted form only

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::gateway::environment::{BaseUrl, Environment};
use crate::gateway::trace::{RecordedRequest, REDACTED};

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";

/// Logical gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterDevice,
    ListDevices,
    DeviceStatus,
    UpdateDevice,
    DeleteDevice,
    InitiateSession,
    SessionStatus,
    CancelSession,
    TransactionReport,
}

impl Operation {
    /// Stable name used in logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RegisterDevice => "register_device",
            Operation::ListDevices => "list_devices",
            Operation::DeviceStatus => "device_status",
            Operation::UpdateDevice => "update_device",
            Operation::DeleteDevice => "delete_device",
            Operation::InitiateSession => "initiate_session",
            Operation::SessionStatus => "session_status",
            Operation::CancelSession => "cancel_session",
            Operation::TransactionReport => "transaction_report",
        }
    }

    /// Upstream HTTP method.
    pub fn method(&self) -> Method {
        match self {
            Operation::RegisterDevice
            | Operation::InitiateSession
            | Operation::CancelSession
            | Operation::TransactionReport => Method::POST,
            Operation::ListDevices | Operation::DeviceStatus | Operation::SessionStatus => Method::GET,
            Operation::UpdateDevice => Method::PUT,
            Operation::DeleteDevice => Method::DELETE,
        }
    }

    fn credential(&self) -> CredentialSlot {
        match self {
            Operation::TransactionReport => CredentialSlot::BodyField("xKey"),
            _ => CredentialSlot::Header,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the credential travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialSlot {
    Header,
    BodyField(&'static str),
}

/// Missing or unusable caller input, detected before dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("API key is required")]
    MissingApiKey,
    #[error("Device ID is required")]
    MissingDeviceId,
    #[error("Session ID is required")]
    MissingSessionId,
    #[error("Serial number is required")]
    MissingSerialNumber,
    #[error("Friendly name is required")]
    MissingFriendlyName,
    #[error("Command is required")]
    MissingCommand,
    #[error("Amount is required for {0}")]
    MissingAmount(String),
    #[error("Reference number is required")]
    MissingRefNum,
}

/// A request that failed validation, with what is known of its target.
#[derive(Debug, Clone)]
pub struct Rejected {
    pub operation: Operation,
    pub reason: InvalidInput,
    pub request: RecordedRequest,
}

/// Credential and environment selection shared by every operation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTarget {
    pub api_key: Option<String>,
    pub environment: Option<Environment>,
    pub custom_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDevice {
    #[serde(flatten)]
    pub target: GatewayTarget,
    pub serial_number: Option<String>,
    pub device_make: Option<String>,
    pub friendly_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDevice {
    #[serde(flatten)]
    pub target: GatewayTarget,
    pub friendly_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSession {
    #[serde(flatten)]
    pub target: GatewayTarget,
    pub device_id: Option<String>,
    pub command: Option<String>,
    pub amount: Option<Value>,
    pub enable_tip_prompt: Option<bool>,
    pub invoice: Option<String>,
    pub tip: Option<Value>,
    pub external_request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSession {
    #[serde(flatten)]
    pub target: GatewayTarget,
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReport {
    #[serde(flatten)]
    pub target: GatewayTarget,
    pub ref_num: Option<String>,
}

/// Fully built outbound call. Holds the live credential.
#[derive(Clone)]
pub struct UpstreamRequest {
    pub operation: Operation,
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    credential: CredentialSlot,
}

impl UpstreamRequest {
    /// Copy suitable for traces and logs: the credential is masked.
    pub fn redacted(&self) -> RecordedRequest {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(AUTHORIZATION) {
                    (name.clone(), REDACTED.to_string())
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect();

        let mut body = self.body.clone().unwrap_or(Value::Null);
        if let (CredentialSlot::BodyField(field), Some(map)) = (self.credential, body.as_object_mut()) {
            if map.contains_key(field) {
                map.insert(field.to_string(), json!(REDACTED));
            }
        }

        RecordedRequest {
            method: self.method.to_string(),
            url: self.url.clone(),
            headers,
            body,
        }
    }
}

impl std::fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamRequest")
            .field("operation", &self.operation)
            .field("request", &self.redacted())
            .finish()
    }
}

/// Builds `UpstreamRequest`s against the configured gateway.
pub struct RequestBuilder<'a> {
    gateway: &'a GatewayConfig,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(gateway: &'a GatewayConfig) -> Self {
        Self { gateway }
    }

    fn base(&self, target: &GatewayTarget) -> BaseUrl {
        self.gateway.resolve_base_url(
            target.environment.unwrap_or_default(),
            target.custom_base_url.as_deref(),
        )
    }

    pub fn register_device(&self, input: &RegisterDevice) -> Result<UpstreamRequest, Rejected> {
        let url = self.base(&input.target).join("Device");
        self.assemble(Operation::RegisterDevice, url, &input.target, || {
            let serial = required(&input.serial_number, InvalidInput::MissingSerialNumber)?;
            let make = present(&input.device_make).unwrap_or(self.gateway.default_device_make.as_str());
            let mut body = Map::new();
            body.insert("xDeviceSerialNumber".into(), json!(serial));
            body.insert("xDeviceMake".into(), json!(make));
            if let Some(name) = present(&input.friendly_name) {
                body.insert("xDeviceFriendlyName".into(), json!(name));
            }
            Ok(Some(body))
        })
    }

    pub fn list_devices(&self, target: &GatewayTarget) -> Result<UpstreamRequest, Rejected> {
        let url = self.base(target).join("Device");
        self.assemble(Operation::ListDevices, url, target, || Ok(None))
    }

    pub fn device_status(&self, target: &GatewayTarget, device_id: &str) -> Result<UpstreamRequest, Rejected> {
        let url = self.base(target).join_id("Device", device_id.trim());
        self.assemble(Operation::DeviceStatus, url, target, || {
            required_str(device_id, InvalidInput::MissingDeviceId)?;
            Ok(None)
        })
    }

    pub fn update_device(&self, device_id: &str, input: &UpdateDevice) -> Result<UpstreamRequest, Rejected> {
        let url = self.base(&input.target).join_id("Device", device_id.trim());
        self.assemble(Operation::UpdateDevice, url, &input.target, || {
            required_str(device_id, InvalidInput::MissingDeviceId)?;
            let name = required(&input.friendly_name, InvalidInput::MissingFriendlyName)?;
            let mut body = Map::new();
            body.insert("xDeviceFriendlyName".into(), json!(name));
            Ok(Some(body))
        })
    }

    pub fn delete_device(&self, target: &GatewayTarget, device_id: &str) -> Result<UpstreamRequest, Rejected> {
        let url = self.base(target).join_id("Device", device_id.trim());
        self.assemble(Operation::DeleteDevice, url, target, || {
            required_str(device_id, InvalidInput::MissingDeviceId)?;
            Ok(None)
        })
    }

    pub fn initiate_session(&self, input: &InitiateSession) -> Result<UpstreamRequest, Rejected> {
        let url = self.base(&input.target).join("Session/initiate");
        self.assemble(Operation::InitiateSession, url, &input.target, || {
            let device_id = required(&input.device_id, InvalidInput::MissingDeviceId)?;
            let command = required(&input.command, InvalidInput::MissingCommand)?;
            let amount = input.amount.as_ref().filter(|v| !is_blank(v));
            if amount.is_none() && self.requires_amount(command) {
                return Err(InvalidInput::MissingAmount(command.to_string()));
            }

            let external_id = match present(&input.external_request_id) {
                Some(id) => id.to_string(),
                None => self.external_request_id(),
            };

            let mut payload = Map::new();
            payload.insert("xCommand".into(), json!(command));
            payload.insert("xSoftwareName".into(), json!(self.gateway.software_name));
            payload.insert("xSoftwareVersion".into(), json!(self.gateway.software_version));
            payload.insert("xExternalRequestId".into(), json!(external_id));
            if let Some(amount) = amount {
                payload.insert("xAmount".into(), amount.clone());
            }
            if let Some(prompt) = input.enable_tip_prompt {
                payload.insert("xEnableTipPrompt".into(), json!(prompt));
            }
            if let Some(invoice) = present(&input.invoice) {
                payload.insert("xInvoice".into(), json!(invoice));
            }
            if let Some(tip) = input.tip.as_ref().filter(|v| !is_blank(v)) {
                payload.insert("xTip".into(), tip.clone());
            }

            let mut body = Map::new();
            body.insert("xPayload".into(), Value::Object(payload));
            body.insert("xDeviceId".into(), json!(device_id));
            Ok(Some(body))
        })
    }

    pub fn session_status(&self, target: &GatewayTarget, session_id: &str) -> Result<UpstreamRequest, Rejected> {
        let url = self.base(target).join_id("Session", session_id.trim());
        self.assemble(Operation::SessionStatus, url, target, || {
            required_str(session_id, InvalidInput::MissingSessionId)?;
            Ok(None)
        })
    }

    pub fn cancel_session(&self, session_id: &str, input: &CancelSession) -> Result<UpstreamRequest, Rejected> {
        let url = self.base(&input.target).join("Session/cancel");
        self.assemble(Operation::CancelSession, url, &input.target, || {
            let session_id = required_str(session_id, InvalidInput::MissingSessionId)?;
            let device_id = required(&input.device_id, InvalidInput::MissingDeviceId)?;
            let mut body = Map::new();
            body.insert("xSessionId".into(), json!(session_id));
            body.insert("xDeviceId".into(), json!(device_id));
            Ok(Some(body))
        })
    }

    pub fn transaction_report(&self, input: &TransactionReport) -> Result<UpstreamRequest, Rejected> {
        let url = self.gateway.report_endpoint();
        self.assemble(Operation::TransactionReport, url, &input.target, || {
            let ref_num = required(&input.ref_num, InvalidInput::MissingRefNum)?;
            let mut body = Map::new();
            body.insert("xVersion".into(), json!(self.gateway.report_version));
            body.insert("xSoftwareName".into(), json!(self.gateway.software_name));
            body.insert("xSoftwareVersion".into(), json!(self.gateway.software_version));
            body.insert("xCommand".into(), json!("Report:Transaction"));
            body.insert("xRefnum".into(), json!(ref_num));
            Ok(Some(body))
        })
    }

    /// Validate the credential, then the operation's own fields, and place
    /// the credential where the operation expects it.
    fn assemble<F>(
        &self,
        operation: Operation,
        url: String,
        target: &GatewayTarget,
        fields: F,
    ) -> Result<UpstreamRequest, Rejected>
    where
        F: FnOnce() -> Result<Option<Map<String, Value>>, InvalidInput>,
    {
        let method = operation.method();
        let reject = |reason: InvalidInput| Rejected {
            operation,
            reason,
            request: RecordedRequest {
                method: method.to_string(),
                url: url.clone(),
                headers: BTreeMap::new(),
                body: Value::Null,
            },
        };

        let api_key = verbatim(&target.api_key, InvalidInput::MissingApiKey).map_err(reject)?;
        let mut body = fields().map_err(reject)?;

        let credential = operation.credential();
        let mut headers = BTreeMap::new();
        match credential {
            CredentialSlot::Header => {
                headers.insert(AUTHORIZATION.to_string(), api_key.to_string());
            }
            CredentialSlot::BodyField(field) => {
                body.get_or_insert_with(Map::new)
                    .insert(field.to_string(), json!(api_key));
            }
        }
        if body.is_some() {
            headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());
        }

        Ok(UpstreamRequest {
            operation,
            method,
            url,
            headers,
            body: body.map(Value::Object),
            credential,
        })
    }

    fn requires_amount(&self, command: &str) -> bool {
        self.gateway
            .amount_required_commands
            .iter()
            .any(|c| c.eq_ignore_ascii_case(command))
    }

    /// Operator-visible label of the form `<prefix>-<unix millis>`.
    fn external_request_id(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("{}-{}", self.gateway.external_request_prefix, millis)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'v>(value: &'v Option<String>, missing: InvalidInput) -> Result<&'v str, InvalidInput> {
    present(value).ok_or(missing)
}

/// Like `required`, but hands back the value untrimmed.
fn verbatim<'v>(value: &'v Option<String>, missing: InvalidInput) -> Result<&'v str, InvalidInput> {
    present(value).ok_or(missing)?;
    Ok(value.as_deref().unwrap_or_default())
}

fn required_str(value: &str, missing: InvalidInput) -> Result<&str, InvalidInput> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(missing)
    } else {
        Ok(trimmed)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
