//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `resilient_http` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use resilient_http::initialization::{init_crypto_provider, init_logger_with};
use resilient_http::{Cli, Command, GetArgs, ResolveArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // .env may carry SSL_CERT_FILE, HTTP_AGENT and friends; try the current
    // directory first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;
    init_crypto_provider();

    let outcome = match &cli.command {
        Command::Get(args) => get(args).await,
        Command::Resolve(args) => resolve(args).await,
    };
    if let Err(e) = outcome {
        eprintln!("resilient_http error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn get(args: &GetArgs) -> Result<()> {
    let client = args
        .to_factory()
        .create_http_client()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(&args.url)
        .await
        .with_context(|| format!("Request to {} failed", args.url))?;

    println!("{} {}", response.status(), response.url());
    for (name, value) in response.headers() {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    if args.head_only {
        return Ok(());
    }
    println!();
    let body = response.text().await.context("Failed to read body")?;
    println!("{body}");
    Ok(())
}

async fn resolve(args: &ResolveArgs) -> Result<()> {
    let addresses = args
        .to_resolver()
        .resolve(&args.host)
        .await
        .with_context(|| format!("Failed to resolve {}", args.host))?;
    for address in addresses {
        println!("{address}");
    }
    Ok(())
}
