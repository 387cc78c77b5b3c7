use clap::Parser;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use apikey_gate::auth::API_KEY_HEADER;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Call an endpoint behind apikey-gate", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "https://localhost:8443")]
    url: String,

    #[arg(short, long, env = "APIKEY_GATE_KEY")]
    key: Option<String>,

    /// Header the key is sent in.
    #[arg(long, default_value = API_KEY_HEADER)]
    header: String,

    /// Accept self-signed certificates (local development only).
    #[arg(long)]
    insecure: bool,

    /// Path to GET, e.g. /api/greeting
    path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(cli.insecure)
        .build()?;

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            HeaderName::from_bytes(cli.header.as_bytes())?,
            HeaderValue::from_str(key)?,
        );
    }

    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.path);
    let res = client.get(&url).headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gate returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
