use clap::Parser;
use court_reports::cli::utils::output_failure;
use court_reports::cli::{Cli, OutputFormat};
use court_reports::is_development;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so API_BASE_URL, SESSION_JWT_SECRET, etc. apply
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = court_reports::cli::run(cli).await {
        let verbose = is_development!() || matches!(std::env::var("CLI_VERBOSE").as_deref(), Ok("true") | Ok("1"));
        output_failure(&output_format, &e, verbose);
        std::process::exit(1);
    }

    Ok(())
}
