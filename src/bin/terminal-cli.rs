use clap::{Args, Parser, Subcommand};
use reqwest::Method;
use serde_json::{json, Map, Value};
use url::Url;

#[derive(Parser)]
#[command(name = "terminal-cli")]
#[command(about = "Drive the terminal proxy from the command line", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Gateway API key, forwarded verbatim.
    #[arg(short, long, default_value = "")]
    key: String,

    /// Gateway deployment: production, test, or custom.
    #[arg(short, long, default_value = "production")]
    environment: String,

    /// Base URL used with `--environment custom`.
    #[arg(long)]
    custom_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register, inspect, and manage devices
    #[command(subcommand)]
    Device(DeviceCommand),
    /// Start, poll, and cancel payment sessions
    #[command(subcommand)]
    Session(SessionCommand),
    /// Fetch the transaction report for a reference number
    Report { ref_num: String },
    /// Check proxy liveness
    Health,
}

#[derive(Subcommand)]
enum DeviceCommand {
    Register {
        serial_number: String,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    List,
    Status { device_id: String },
    Update { device_id: String, name: String },
    Delete { device_id: String },
}

#[derive(Subcommand)]
enum SessionCommand {
    Initiate(InitiateArgs),
    Status { session_id: String },
    Cancel { session_id: String, device_id: String },
}

#[derive(Args)]
struct InitiateArgs {
    device_id: String,
    command: String,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    tip: Option<String>,
    #[arg(long)]
    invoice: Option<String>,
    #[arg(long)]
    tip_prompt: bool,
    #[arg(long)]
    external_request_id: Option<String>,
}

impl Cli {
    /// Credential and environment fields shared by every operation.
    fn target(&self) -> Map<String, Value> {
        let mut target = Map::new();
        target.insert("apiKey".into(), json!(self.key));
        target.insert("environment".into(), json!(self.environment));
        if let Some(custom) = &self.custom_url {
            target.insert("customBaseUrl".into(), json!(custom));
        }
        target
    }

    fn with_target(&self, fields: Value) -> Value {
        let mut body = self.target();
        if let Value::Object(fields) = fields {
            body.extend(fields);
        }
        Value::Object(body)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (method, path, body) = match &cli.command {
        Commands::Device(cmd) => match cmd {
            DeviceCommand::Register { serial_number, make, name } => (
                Method::POST,
                vec!["api", "device"],
                Some(cli.with_target(json!({
                    "serialNumber": serial_number,
                    "deviceMake": make,
                    "friendlyName": name,
                }))),
            ),
            DeviceCommand::List => (Method::GET, vec!["api", "device"], None),
            DeviceCommand::Status { device_id } => {
                (Method::GET, vec!["api", "device", device_id.as_str()], None)
            }
            DeviceCommand::Update { device_id, name } => (
                Method::PUT,
                vec!["api", "device", device_id.as_str()],
                Some(cli.with_target(json!({ "friendlyName": name }))),
            ),
            DeviceCommand::Delete { device_id } => (
                Method::DELETE,
                vec!["api", "device", device_id.as_str()],
                Some(cli.with_target(json!({}))),
            ),
        },
        Commands::Session(cmd) => match cmd {
            SessionCommand::Initiate(args) => (
                Method::POST,
                vec!["api", "session"],
                Some(cli.with_target(json!({
                    "deviceId": args.device_id,
                    "command": args.command,
                    "amount": args.amount,
                    "tip": args.tip,
                    "invoice": args.invoice,
                    "enableTipPrompt": args.tip_prompt.then_some(true),
                    "externalRequestId": args.external_request_id,
                }))),
            ),
            SessionCommand::Status { session_id } => {
                (Method::GET, vec!["api", "session", session_id.as_str()], None)
            }
            SessionCommand::Cancel { session_id, device_id } => (
                Method::DELETE,
                vec!["api", "session", session_id.as_str()],
                Some(cli.with_target(json!({ "deviceId": device_id }))),
            ),
        },
        Commands::Report { ref_num } => (
            Method::POST,
            vec!["api", "report"],
            Some(cli.with_target(json!({ "refNum": ref_num }))),
        ),
        Commands::Health => (Method::GET, vec!["api", "health"], None),
    };

    let mut request = client.request(method.clone(), endpoint(&cli.url, &path)?);
    match body {
        Some(body) => request = request.json(&body),
        None if method == Method::GET => {
            let mut query = vec![
                ("apiKey", cli.key.clone()),
                ("environment", cli.environment.clone()),
            ];
            if let Some(custom) = &cli.custom_url {
                query.push(("customBaseUrl", custom.clone()));
            }
            request = request.query(&query);
        }
        None => {}
    }

    let res = request.send().await?;
    print_response(res).await
}

/// Append path segments to the proxy URL, percent-encoding each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_ids() {
        let url = endpoint("http://localhost:8080", &["api", "device", "a/b?c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/device/a%2Fb%3Fc");

        let url = endpoint("http://localhost:8080/", &["api", "health"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/health");
    }
}
