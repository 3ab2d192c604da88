//! CLI command definitions.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Create local identity material (key pair, JWKS, JWT)
    Create {
        #[command(subcommand)]
        command: CreateCommands,
    },

    /// Create identity provider resources in AWS
    Aws {
        #[command(subcommand)]
        command: AwsCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum CreateCommands {
    /// Generate an RSA key pair in the output directory
    RsaKeyPair,

    /// Generate a JSON Web Key Set for the identity provider
    IdentityProvider,

    /// Generate the key pair and JWKS, then print a signed JWT
    Jwt,
}

#[derive(Subcommand)]
pub enum AwsCommands {
    /// Generate an RSA key pair in the output directory
    RsaKeyPair,

    /// Generate identity material and create the S3 bucket that hosts it
    IdentityProvider {
        /// S3 bucket name to store the JWKS and openid-configuration
        #[arg(short, long, required = true)]
        bucket_name: String,

        /// AWS region
        #[arg(short, long, required = true)]
        region: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
}
