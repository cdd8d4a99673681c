//! # Pilot Auth
//!
//! Bootstraps the device identity and registers it with the auth service.
//!
//! ```text
//! Uninitialized
//!      │ key pair present (generated on first run)
//!      ▼
//! KeyEnsured
//!      │ signed {"register": true, "exp": now + 1h}
//!      ▼
//! TokenMinted
//!      │ POST /v2/pilotauth/
//!      ├── ok ─────────────► Authenticated            (credential persisted)
//!      ├── err + cached ───► Authenticated(fromCache) (nothing written)
//!      └── err, no cache ──► Failed                   (no identity available)
//! ```
//!
//! The private key stays in the persist directory and is never sent.

pub mod api;
pub mod bootstrap;
pub mod keys;
pub mod token;

pub use api::{AuthApi, HttpAuthApi, PilotAuthRequest};
pub use bootstrap::{BootstrapState, RegistrationBootstrap, RegistrationOutcome};
pub use keys::{ensure_keypair, KeyGenerator, KeyPair, OpenSslKeyGenerator};
pub use token::{OpenSslSigner, RegisterClaims, TokenSigner};

use serde::{Deserialize, Serialize};

/// Result type for pilot-auth operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from provisioning and registration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Key provisioning failed: {0}")]
    Provisioning(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Auth request failed: {0}")]
    Transport(String),

    #[error("Auth endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Malformed auth response: {0}")]
    Malformed(String),

    #[error("Identity read failed: {0}")]
    Identity(#[from] pilot_device::IdentityError),

    #[error("Parameter store error: {0}")]
    Params(#[from] pilot_config::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dongle id and access token issued by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCredential {
    pub dongle_id: String,
    pub access_token: String,
}
