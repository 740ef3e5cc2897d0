use anyhow::Context;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::paylike::DEFAULT_API_URL;
use crate::signature::SignatureAlgorithm;

pub mod currencies;

const TEST_MODE_NOTICE: &str = "TEST MODE ENABLED. In test mode, you can use the card number \
4100 0000 0000 0000 with any CVC and a valid expiration date.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// API secret that never prints its value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(****)")
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "****")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Capture as soon as the shopper returns from the payment widget.
    #[default]
    Instant,
    /// Only authorize; capture later from the admin side.
    Delayed,
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "instant" | "yes" => Ok(Self::Instant),
            "delayed" | "no" => Ok(Self::Delayed),
            other => Err(format!("expected 'instant' or 'delayed', got '{}'", other)),
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant => write!(f, "instant"),
            Self::Delayed => write!(f, "delayed"),
        }
    }
}

/// Gateway settings as entered by the merchant. Read-only to the core.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub testmode: bool,
    pub secret_key: SecretKey,
    pub public_key: String,
    pub test_secret_key: SecretKey,
    pub test_public_key: String,
    pub capture: CaptureMode,
    pub compatibility_mode: bool,
    pub direct_checkout: bool,
    pub card_types: Vec<String>,
    pub logging: bool,
    pub api_url: String,
    pub signature_algorithm: SignatureAlgorithm,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "Credit card (Paylike)".to_string(),
            description: "Secure payment with credit card via Paylike".to_string(),
            testmode: true,
            secret_key: SecretKey::default(),
            public_key: String::new(),
            test_secret_key: SecretKey::default(),
            test_public_key: String::new(),
            capture: CaptureMode::Instant,
            compatibility_mode: true,
            direct_checkout: true,
            card_types: Vec::new(),
            logging: false,
            api_url: DEFAULT_API_URL.to_string(),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }
}

impl GatewaySettings {
    /// Reads `PAYLIKE_*` values through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let flag = |key: &'static str, default: bool| match get(key) {
            Some(raw) => parse_flag(key, &raw),
            None => Ok(default),
        };

        let capture = match get("PAYLIKE_CAPTURE") {
            Some(raw) => raw
                .parse()
                .map_err(|message| ConfigurationError::Invalid {
                    key: "PAYLIKE_CAPTURE",
                    message,
                })?,
            None => defaults.capture,
        };

        let signature_algorithm = match get("PAYLIKE_SIGNATURE_ALGORITHM") {
            Some(raw) => raw
                .parse()
                .map_err(|message| ConfigurationError::Invalid {
                    key: "PAYLIKE_SIGNATURE_ALGORITHM",
                    message,
                })?,
            None => defaults.signature_algorithm,
        };

        let card_types = get("PAYLIKE_CARD_TYPES")
            .map(|raw| {
                raw.split(',')
                    .map(|entry| entry.trim().to_lowercase())
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            enabled: flag("PAYLIKE_ENABLED", defaults.enabled)?,
            title: get("PAYLIKE_TITLE").unwrap_or(defaults.title),
            description: get("PAYLIKE_DESCRIPTION").unwrap_or(defaults.description),
            testmode: flag("PAYLIKE_TESTMODE", defaults.testmode)?,
            secret_key: SecretKey::new(get("PAYLIKE_SECRET_KEY").unwrap_or_default()),
            public_key: get("PAYLIKE_PUBLIC_KEY").unwrap_or_default(),
            test_secret_key: SecretKey::new(get("PAYLIKE_TEST_SECRET_KEY").unwrap_or_default()),
            test_public_key: get("PAYLIKE_TEST_PUBLIC_KEY").unwrap_or_default(),
            capture,
            compatibility_mode: flag("PAYLIKE_COMPATIBILITY_MODE", defaults.compatibility_mode)?,
            direct_checkout: flag("PAYLIKE_DIRECT_CHECKOUT", defaults.direct_checkout)?,
            card_types,
            logging: flag("PAYLIKE_LOGGING", defaults.logging)?,
            api_url: get("PAYLIKE_API_URL").unwrap_or(defaults.api_url),
            signature_algorithm,
        })
    }

    /// Picks the key pair for the active mode.
    pub fn resolve(&self) -> Result<GatewayConfig, ConfigurationError> {
        let (secret_key, public_key, secret_name, public_name) = if self.testmode {
            (
                &self.test_secret_key,
                &self.test_public_key,
                "PAYLIKE_TEST_SECRET_KEY",
                "PAYLIKE_TEST_PUBLIC_KEY",
            )
        } else {
            (
                &self.secret_key,
                &self.public_key,
                "PAYLIKE_SECRET_KEY",
                "PAYLIKE_PUBLIC_KEY",
            )
        };

        if secret_key.is_empty() {
            return Err(ConfigurationError::Missing(secret_name));
        }
        if public_key.trim().is_empty() {
            return Err(ConfigurationError::Missing(public_name));
        }

        Ok(GatewayConfig {
            secret_key: secret_key.clone(),
            public_key: public_key.trim().to_string(),
            capture_mode: self.capture,
            testmode: self.testmode,
            compatibility_mode: self.compatibility_mode,
            direct_checkout: self.direct_checkout,
            logging: self.logging,
            api_url: self.api_url.clone(),
            signature_algorithm: self.signature_algorithm,
        })
    }

    /// Whether checkout may offer this gateway for `currency`.
    ///
    /// Live mode additionally requires the checkout to be served over TLS.
    pub fn is_available(&self, currency: &str, secure_checkout: bool) -> bool {
        self.enabled
            && (self.testmode || secure_checkout)
            && self.resolve().is_ok()
            && currencies::is_supported(currency)
    }

    pub fn checkout_description(&self) -> String {
        if self.testmode {
            format!("{}\n{}", self.description, TEST_MODE_NOTICE)
                .trim()
                .to_string()
        } else {
            self.description.clone()
        }
    }
}

/// Resolved gateway configuration handed to the client and the orchestrator.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub secret_key: SecretKey,
    pub public_key: String,
    pub capture_mode: CaptureMode,
    pub testmode: bool,
    pub compatibility_mode: bool,
    pub direct_checkout: bool,
    pub logging: bool,
    pub api_url: String,
    pub signature_algorithm: SignatureAlgorithm,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub site_url: Url,
    pub admin_api_key: Option<SecretKey>,
    pub gateway: GatewaySettings,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site_url = lookup("SITE_URL").context("SITE_URL is required")?;

        Ok(Config {
            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a port number")?,
            site_url: Url::parse(&site_url).context("SITE_URL must be an absolute URL")?,
            admin_api_key: lookup("ADMIN_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .map(SecretKey::new),
            gateway: GatewaySettings::from_lookup(&lookup)?,
        })
    }

    pub fn urls(&self) -> SiteUrls {
        SiteUrls::new(&self.site_url)
    }
}

/// Storefront pages the return flow redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base: String,
}

impl SiteUrls {
    pub fn new(site_url: &Url) -> Self {
        Self {
            base: site_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// Whether the storefront is served over TLS.
    pub fn is_secure(&self) -> bool {
        self.base.starts_with("https://")
    }

    pub fn cart(&self) -> String {
        format!("{}/cart", self.base)
    }

    pub fn checkout(&self) -> String {
        format!("{}/checkout", self.base)
    }

    /// Checkout page carrying a notice for the shopper.
    pub fn checkout_with_notice(&self, notice: &str) -> String {
        match Url::parse(&self.checkout()) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("notice", notice);
                url.to_string()
            }
            Err(_) => self.checkout(),
        }
    }

    pub fn order_received(&self, order_id: &str) -> String {
        format!("{}/checkout/order-received/{}", self.base, order_id)
    }

    pub fn order_pay(&self, order_id: &str) -> String {
        format!("{}/checkout/order-pay/{}", self.base, order_id)
    }

    pub fn payment_return(&self) -> String {
        format!("{}/paylike/return", self.base)
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigurationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        other => Err(ConfigurationError::Invalid {
            key,
            message: format!("expected yes or no, got '{}'", other),
        }),
    }
}
