//! Registration token minting
//!
//! The token is an RS256 JWT signed with the device private key:
//!
//! ```text
//! base64url({"alg":"RS256","typ":"JWT"}) . base64url(claims) . base64url(sig)
//! ```

use crate::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Lifetime of a registration token
pub const REGISTER_TOKEN_TTL_HOURS: i64 = 1;

const JWT_HEADER: &str = r#"{"alg":"RS256","typ":"JWT"}"#;

/// Claims of a registration token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterClaims {
    pub register: bool,
    /// Expiry, unix seconds
    pub exp: i64,
}

impl RegisterClaims {
    pub fn new() -> Self {
        Self::expiring_in(Duration::hours(REGISTER_TOKEN_TTL_HOURS))
    }

    pub fn expiring_in(ttl: Duration) -> Self {
        Self {
            register: true,
            exp: (Utc::now() + ttl).timestamp(),
        }
    }
}

impl Default for RegisterClaims {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces a signed token from claims and a private key
pub trait TokenSigner: Send + Sync {
    fn sign(&self, claims: &RegisterClaims, private_key: &Path) -> Result<String>;
}

/// `header.payload` part of the JWT
pub fn signing_input(claims: &RegisterClaims) -> Result<String> {
    let payload =
        serde_json::to_vec(claims).map_err(|e| Error::Signing(format!("claims: {}", e)))?;
    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(JWT_HEADER),
        URL_SAFE_NO_PAD.encode(payload)
    ))
}

/// RS256 signing through `openssl dgst`
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSslSigner;

impl TokenSigner for OpenSslSigner {
    fn sign(&self, claims: &RegisterClaims, private_key: &Path) -> Result<String> {
        let input = signing_input(claims)?;

        let mut child = Command::new("openssl")
            .args(["dgst", "-sha256", "-sign"])
            .arg(private_key)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Signing(format!("failed to run openssl: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .map_err(|e| Error::Signing(format!("openssl stdin: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Signing(format!("openssl: {}", e)))?;
        if !output.status.success() || output.stdout.is_empty() {
            return Err(Error::Signing(format!(
                "openssl dgst exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(format!("{}.{}", input, URL_SAFE_NO_PAD.encode(&output.stdout)))
    }
}
