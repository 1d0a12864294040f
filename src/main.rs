use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use pylog_check::client::PluginClient;
use pylog_check::config::{CliConfig, ClientConfig};
use pylog_check::scenario::LogScenario;

/// Checks how a running MLDB server's python plugin renders mldb.log() calls
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the MLDB server (default http://localhost:8080)
    #[arg(short, long, env = "MLDB_URL")]
    url: Option<String>,

    /// Route of the python plugin run endpoint
    #[arg(long, env = "MLDB_RUN_ROUTE")]
    run_route: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "MLDB_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// YAML configuration file; command line options take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the embedded script and exit without contacting the server
    #[arg(long)]
    print_script: bool,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        CliConfig {
            base_url: cli.url.clone(),
            run_route: cli.run_route.clone(),
            timeout_secs: cli.timeout_secs,
        }
    }
}

/// Returns the result marker, or `None` when nothing was run.
async fn run(cli: Cli) -> anyhow::Result<Option<&'static str>> {
    let scenario = LogScenario::standard();

    if cli.print_script {
        print!("{}", scenario.script().source());
        return Ok(None);
    }

    // Environment values already reach clap through `env`, so the file is
    // the only base besides the defaults.
    let base = match &cli.config {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ClientConfig::default(),
    };
    let config = base
        .with_cli(CliConfig::from(&cli))
        .context("Invalid configuration")?;

    let client = PluginClient::new(&config)?;
    let report = scenario
        .run(&client)
        .await
        .with_context(|| format!("Log rendering check against {} failed", config.base_url))?;

    Ok(Some(report.result_marker()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(marker) => {
            if let Some(marker) = marker {
                println!("{}", marker);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
