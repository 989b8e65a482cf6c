use std::time::Duration;

use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::Value;

use crate::cli::utils::output_details;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from the /health endpoint")]
    Health {
        #[arg(long, help = "Server base URL (defaults to the configured local port)")]
        url: Option<String>,
    },

    #[command(about = "Show server information from the API root endpoint")]
    Info {
        #[arg(long, help = "Server base URL (defaults to the configured local port)")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => {
            let base = base_url(url);
            let (status, body) = fetch(&format!("{}/health", base)).await?;

            let rows = [
                ("server", base.clone()),
                ("status", status.to_string()),
                ("database", body["data"]["database"].as_str().unwrap_or("unavailable").to_string()),
            ];
            output_details(output_format, &rows, &body)?;

            if !status.is_success() {
                bail!("server at {} is unhealthy ({})", base, status);
            }
            Ok(())
        }
        ServerCommands::Info { url } => {
            let base = base_url(url);
            let (_, body) = fetch(&base).await?;

            let data = &body["data"];
            let rows = [
                ("server", base.clone()),
                ("name", data["name"].as_str().unwrap_or("-").to_string()),
                ("version", data["version"].as_str().unwrap_or("-").to_string()),
            ];
            output_details(output_format, &rows, &body)
        }
    }
}

fn base_url(url: Option<String>) -> String {
    url.unwrap_or_else(|| format!("http://localhost:{}", config::config().api.port))
        .trim_end_matches('/')
        .to_string()
}

async fn fetch(url: &str) -> anyhow::Result<(reqwest::StatusCode, Value)> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("could not reach {}", url))?;
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(base_url(Some("http://api.example.com/".into())), "http://api.example.com");
    }
}
