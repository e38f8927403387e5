use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "tracegate-cli")]
#[command(about = "Inspection CLI for a running tracegate server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Trace the CLI request under an existing trace
    #[arg(long)]
    traceparent: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,
    /// Show per-endpoint API call counts
    Calls,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let path = match cli.command {
        Commands::Health => "/api/health",
        Commands::Calls => "/api/telemetry",
    };

    let mut request = client.get(format!("{}{}", cli.url.trim_end_matches('/'), path));
    if let Some(traceparent) = &cli.traceparent {
        request = request.header("traceparent", traceparent);
    }
    let res = request.send().await?;

    if let Some(traceparent) = res.headers().get("traceparent") {
        eprintln!("traceparent: {}", traceparent.to_str().unwrap_or("<invalid>"));
    }
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
