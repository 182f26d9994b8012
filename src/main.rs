use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ci_triage::config::AppConfig;
use ci_triage::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "ci-triage", about = "AI-powered triage for failed Jenkins builds")]
struct Cli {
    /// Jenkins build status URL; overrides the status_url setting
    status_url: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(&cli).await {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: &Cli) -> ci_triage::error::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate(cli.status_url.as_deref())?;

    // validate() guarantees one of the two is present
    let status_url = cli
        .status_url
        .clone()
        .or_else(|| config.status_url.clone())
        .unwrap_or_default();

    tracing::info!(status_url = %status_url, "Starting Jenkins AI analysis");

    let pipeline = Pipeline::from_config(&config)?;
    pipeline.run(&status_url).await?;

    tracing::info!("Jenkins AI analysis completed successfully");
    Ok(())
}
