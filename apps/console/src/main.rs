use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, FinanceClient, SubmitOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "botbi", about = "Financial news, market tickers and newsletter signup")]
struct Cli {
    /// Finance service base url; overrides client.toml and environment settings.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load news and markets and print the page.
    Show,
    /// Subscribe an email address to the daily summary.
    Subscribe { email: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = client_core::config::normalize_api_base_url(&api_url);
    }
    info!(api_base_url = %settings.api_base_url, "console: starting");
    let client = FinanceClient::from_settings(&settings)?;

    let result = match cli.command {
        Command::Show => show(&client).await,
        Command::Subscribe { email } => subscribe(&client, &email).await,
    };
    client.shutdown().await;
    result
}

async fn show(client: &FinanceClient) -> Result<()> {
    let state = client.load().await;
    let snapshot = client.snapshot().await;
    print!("{}", render::render_page(&snapshot));

    if let Some(err) = state.error() {
        return Err(err.clone()).context("page data unavailable");
    }
    Ok(())
}

async fn subscribe(client: &FinanceClient, email: &str) -> Result<()> {
    let outcome = client.subscription().submit(email).await;
    let snapshot = client.snapshot().await;
    print!("{}", render::render_subscription(&snapshot));

    match outcome {
        SubmitOutcome::Accepted(ack) => {
            if let Some(message) = ack.message {
                info!("console: service replied: {message}");
            }
            Ok(())
        }
        SubmitOutcome::Failed(err) => Err(err).context("subscription rejected"),
        SubmitOutcome::EmptyEmail => bail!("email must not be empty"),
        SubmitOutcome::Blocked(state) => bail!("subscription form is busy ({state})"),
    }
}
