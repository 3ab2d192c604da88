//! Command handlers.

use crate::config::CliConfig;
use console::style;
use oidc_auth::KeyPairStatus;
use oidc_aws::AwsConnector;
use oidc_provision::Provisioner;
use std::path::Path;
use tracing::info;

type HandlerResult = Result<(), Box<dyn std::error::Error>>;

fn provisioner(config: &CliConfig, output_dir: &Path) -> Provisioner<AwsConnector> {
    Provisioner::new(config.identity.clone(), output_dir, AwsConnector)
}

fn report_key_pair(status: KeyPairStatus, dir: &Path) {
    match status {
        KeyPairStatus::Generated => {
            println!("{} Created RSA key pair in {}", style("✓").green(), dir.display())
        }
        KeyPairStatus::AlreadyPresent => println!(
            "{} RSA key pair already exists in {}",
            style("!").yellow(),
            dir.display()
        ),
    }
}

/// Generate the RSA key pair.
pub fn create_key_pair(config: &CliConfig, output_dir: &Path) -> HandlerResult {
    let provisioner = provisioner(config, output_dir);
    let status = provisioner.create_key_pair()?;
    report_key_pair(status, provisioner.key_store().layout().dir());
    Ok(())
}

/// Generate the key pair and the JWKS.
pub fn create_jwks(config: &CliConfig, output_dir: &Path) -> HandlerResult {
    let provisioner = provisioner(config, output_dir);
    let (status, signing_key) = provisioner.create_jwks()?;
    report_key_pair(status, provisioner.key_store().layout().dir());

    println!(
        "{} Wrote JSON Web Key Set to {}",
        style("✓").green(),
        provisioner.key_store().layout().jwks().display()
    );
    println!("  kid: {}", style(signing_key.kid()).dim());
    Ok(())
}

/// Generate the key pair and JWKS, then print a signed JWT.
pub fn create_jwt(config: &CliConfig, output_dir: &Path) -> HandlerResult {
    let provisioner = provisioner(config, output_dir);
    let report = provisioner.create_token()?;
    report_key_pair(report.key_pair, provisioner.key_store().layout().dir());

    info!("Successfully created RSA key pair, JWKS, and JWT");
    println!("Signed JWT: {}", report.token);
    Ok(())
}

/// Run the full identity provider workflow.
pub async fn create_identity_provider(
    config: &CliConfig,
    output_dir: &Path,
    bucket_name: &str,
    region: &str,
) -> HandlerResult {
    let provisioner = provisioner(config, output_dir);
    let report = provisioner
        .create_identity_provider(bucket_name, region)
        .await?;

    report_key_pair(report.key_pair, provisioner.key_store().layout().dir());
    println!(
        "{} Wrote JSON Web Key Set to {}",
        style("✓").green(),
        report.jwks_path.display()
    );
    println!(
        "{} Created S3 bucket {} in {}",
        style("✓").green(),
        style(&report.bucket.bucket).bold(),
        report.bucket.region
    );
    println!("{} Identity provider created successfully", style("✓").green());
    Ok(())
}

/// Show the effective configuration.
pub fn show_config(config: &CliConfig) -> HandlerResult {
    match CliConfig::config_path() {
        Ok(path) => println!("# {}", style(path.display()).dim()),
        Err(_) => println!("# {}", style("no config directory").dim()),
    }
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
