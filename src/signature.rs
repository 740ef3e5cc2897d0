//! Return-callback signatures.
//!
//! The token binds the order total, the order reference and the public key:
//! `HEX(hash(total || order_id || public_key))`, uppercase, no separators.
//! Because the fields are concatenated without a delimiter, total `"1"` with
//! order `"23"` signs the same bytes as total `"12"` with order `"3"`.

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    #[default]
    Sha256,
    /// Tokens issued by older deployments of the plugin.
    Md5,
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "md5" => Ok(Self::Md5),
            other => Err(format!("unknown signature algorithm '{}'", other)),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Md5 => write!(f, "md5"),
        }
    }
}

/// Signs with the default algorithm.
pub fn sign(order_total: &str, order_id: &str, public_key: &str) -> String {
    sign_with(SignatureAlgorithm::default(), order_total, order_id, public_key)
}

pub fn sign_with(
    algorithm: SignatureAlgorithm,
    order_total: &str,
    order_id: &str,
    public_key: &str,
) -> String {
    let message = format!("{}{}{}", order_total, order_id, public_key);
    match algorithm {
        SignatureAlgorithm::Sha256 => hex::encode_upper(Sha256::digest(message.as_bytes())),
        SignatureAlgorithm::Md5 => hex::encode_upper(Md5::digest(message.as_bytes())),
    }
}

pub fn verify(token: &str, order_total: &str, order_id: &str, public_key: &str) -> bool {
    verify_with(
        SignatureAlgorithm::default(),
        token,
        order_total,
        order_id,
        public_key,
    )
}

/// Recomputes the token and compares it in constant time.
pub fn verify_with(
    algorithm: SignatureAlgorithm,
    token: &str,
    order_total: &str,
    order_id: &str,
    public_key: &str,
) -> bool {
    let expected = sign_with(algorithm, order_total, order_id, public_key);
    expected.as_bytes().ct_eq(token.as_bytes()).into()
}
