//! aws-oidc-sts CLI entrypoint.

use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;

use commands::{AwsCommands, Commands, ConfigCommands, CreateCommands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "aws-oidc-sts")]
#[command(author, version, about = "Self-hosted OIDC identity provider for AWS STS", long_about = None)]
struct Cli {
    /// Directory that receives the tls/ key material (defaults to the current directory)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(config: &CliConfig, verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else {
        config.log_filter.as_deref().unwrap_or("info")
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = match cli.output_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Create { command } => match command {
            CreateCommands::RsaKeyPair => handlers::create_key_pair(&config, &output_dir)?,
            CreateCommands::IdentityProvider => handlers::create_jwks(&config, &output_dir)?,
            CreateCommands::Jwt => handlers::create_jwt(&config, &output_dir)?,
        },
        Commands::Aws { command } => match command {
            AwsCommands::RsaKeyPair => handlers::create_key_pair(&config, &output_dir)?,
            AwsCommands::IdentityProvider {
                bucket_name,
                region,
            } => {
                handlers::create_identity_provider(&config, &output_dir, &bucket_name, &region)
                    .await?
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config)?,
        },
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config, cli.verbose);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{} {}", style("✗").red(), e);
            ExitCode::FAILURE
        }
    }
}
