use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Parser)]
#[command(name = "certmint-cli")]
#[command(about = "Management CLI for the credential issuance service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a credential from a template
    Issue {
        #[arg(long)]
        template_id: u64,
        #[arg(long)]
        recipient: String,
        /// Field values as name=value, repeatable
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Check a credential's token URI and revocation status
    Verify { token_id: u64 },
    /// List certificate templates
    Templates,
    /// Check service health
    Health,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Issue {
            template_id,
            recipient,
            fields,
        } => {
            let dynamic_data: BTreeMap<_, _> = fields.into_iter().collect();
            let res = client
                .post(format!("{}/api/credentials/issue", cli.url))
                .json(&json!({
                    "template_id": template_id,
                    "recipient_address": recipient,
                    "dynamic_data": dynamic_data,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Verify { token_id } => {
            let res = client
                .get(format!("{}/api/credentials/{}/verify", cli.url, token_id))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Templates => {
            let res = client
                .get(format!("{}/api/templates", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/healthz", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
