//! Command-line client for the mock server.

use clap::Parser;
use jsonrpc_mock_server::{
    client::RpcClient,
    config::DEFAULT_BIND_PORT,
    domain::greeter::{SAY_HELLO, SERVICE_NAME},
    RPC_PATH,
};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "say-hello")]
#[command(about = "Send one JSON-RPC request to the mock server and print the reply")]
#[command(version)]
struct Cli {
    /// Full URL of the JSON-RPC endpoint
    #[arg(long, default_value_t = default_endpoint())]
    endpoint: String,
    /// Wire method name
    #[arg(long, default_value_t = format!("{SERVICE_NAME}.{SAY_HELLO}"))]
    method: String,
    /// Request params as JSON
    #[arg(long, default_value = r#"{"Name": "Jesse Pinkman"}"#, value_parser = parse_json)]
    params: Value,
    /// Request id
    #[arg(long, default_value_t = 0)]
    id: i64,
}

fn default_endpoint() -> String {
    format!("http://localhost:{DEFAULT_BIND_PORT}{RPC_PATH}")
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("params must be valid JSON: {err}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = RpcClient::new(cli.endpoint);

    let request = RpcClient::request_body(&cli.method, &cli.params, &Value::from(cli.id));
    println!("request:\n{}\n", serde_json::to_string_pretty(&request)?);

    let response = client
        .call_raw(&cli.method, cli.params, Value::from(cli.id))
        .await?;
    println!("response:\n{}", serde_json::to_string_pretty(&response)?);

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
