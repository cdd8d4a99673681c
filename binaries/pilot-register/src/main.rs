//! pilot-register
//!
//! Provisions the device key pair and registers with the auth service.
//! Prints `(dongle_id, access_token)` on stdout, or `None` when no
//! credential could be obtained.

use anyhow::Context;
use clap::Parser;
use pilot_auth::RegistrationBootstrap;
use pilot_config::PilotConfig;

#[derive(Parser)]
#[command(name = "pilot-register")]
#[command(about = "Register this device and print its dongle id and access token")]
#[command(version)]
#[command(after_help = "ENVIRONMENT:
    API_HOST             Auth service base URL (default: https://api.commadotai.com)
    PILOT_PARAMS_DIR     Parameter store directory
    PILOT_PERSIST_DIR    Key pair directory
    PILOT_AUTH_TIMEOUT   Auth request timeout in seconds (default: 15)
    PILOT_DEVICE_MARKER  File whose presence marks a physical device (default: /EON)
    PILOT_REPO_DIR       Checkout whose git metadata is recorded
    RUST_LOG             Log filter, logs go to stderr")]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pilot_register=info".parse()?)
                .add_directive("pilot_auth=info".parse()?)
                .add_directive("pilot_device=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = PilotConfig::from_env();
    tracing::info!(
        api_host = %config.api_host,
        persist_dir = %config.persist_dir.display(),
        device = config.is_device(),
        "starting registration"
    );

    let mut bootstrap =
        RegistrationBootstrap::from_config(&config).context("failed to set up registration")?;
    let outcome = bootstrap.register().await.context("registration failed")?;
    tracing::info!(state = ?bootstrap.state(), "registration finished");

    match outcome.credential() {
        Some(credential) => println!(
            "({:?}, {:?})",
            credential.dongle_id, credential.access_token
        ),
        None => println!("None"),
    }
    Ok(())
}
