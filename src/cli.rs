use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::signature;

#[derive(Parser)]
#[command(name = "paylike-gateway")]
#[command(about = "Paylike Gateway - card payment transaction lifecycle", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Configuration validation
    Config,

    /// Compute the return signature for an order
    Sign {
        /// Order total exactly as rendered in the checkout form, e.g. 25.00
        #[arg(long)]
        total: String,

        #[arg(long)]
        order_id: String,
    },
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    let settings = &config.gateway;
    let urls = config.urls();

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Site URL: {}", config.site_url);
    println!("  Admin API: {}", if config.admin_api_key.is_some() { "enabled" } else { "disabled" });
    println!("  Enabled: {}", settings.enabled);
    println!("  Test Mode: {}", settings.testmode);
    println!("  Capture: {}", settings.capture);
    println!("  Compatibility Mode: {}", settings.compatibility_mode);
    println!("  Direct Checkout: {}", settings.direct_checkout);
    println!("  API URL: {}", settings.api_url);
    println!("  Signature Algorithm: {}", settings.signature_algorithm);
    println!("  Return URL: {}", urls.payment_return());

    let gateway = settings.resolve()?;
    println!("  Public Key: {}", gateway.public_key);
    println!("  Secret Key: {}", gateway.secret_key);

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

/// Signature the checkout form would carry for this order.
pub fn return_signature(config: &Config, total: &str, order_id: &str) -> anyhow::Result<String> {
    let gateway = config.gateway.resolve()?;
    Ok(signature::sign_with(
        gateway.signature_algorithm,
        total,
        order_id,
        &gateway.public_key,
    ))
}

pub fn handle_sign(config: &Config, total: &str, order_id: &str) -> anyhow::Result<()> {
    let token = return_signature(config, total, order_id)?;
    println!("{}", token);
    Ok(())
}
