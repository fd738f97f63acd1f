//! Registers the RoutePilot voice assistant with the assistant platform.
//!
//! Reads `VAPI_API_KEY` and `ASSISTANT_SERVER_URL` (the public URL of this
//! service's `/flightsearch` route) and prints the platform's response.

use dotenvy::dotenv;
use routepilot_agent::assistant::{assistant_payload, ASSISTANT_API_URL, ASSISTANT_NAME};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let api_key = env::var("VAPI_API_KEY")
        .map_err(|_| anyhow::anyhow!("VAPI_API_KEY environment variable required"))?;
    let server_url = env::var("ASSISTANT_SERVER_URL")
        .map_err(|_| anyhow::anyhow!("ASSISTANT_SERVER_URL environment variable required"))?;
    url::Url::parse(&server_url)
        .map_err(|e| anyhow::anyhow!("ASSISTANT_SERVER_URL is not a valid URL: {}", e))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    tracing::info!("Registering assistant {} -> {}", ASSISTANT_NAME, server_url);
    let response = client
        .post(ASSISTANT_API_URL)
        .bearer_auth(&api_key)
        .json(&assistant_payload(&server_url))
        .send()
        .await?;

    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        anyhow::bail!("Assistant registration failed with status {}", status);
    }

    Ok(())
}
