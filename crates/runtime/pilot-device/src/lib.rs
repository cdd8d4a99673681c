//! # Pilot Device
//!
//! Reads the identity of the device the registration runs on.
//!
//! ```text
//! DeviceIdentityClient
//!    │ call("iphonesubinfo", 3, [i32 0])
//!    ▼
//! ServiceCall ──► `service call ...` ──► raw dump
//!    │
//!    ▼
//! ParcelDecoder ──► Some(text) | None ──► fallback per field
//! ```
//!
//! Off-device (no marker file) every service call reports
//! [`ServiceReply::NotPhysical`] and each field goes straight to its fallback.

pub mod identity;
pub mod power;
pub mod props;
pub mod service;

pub use identity::{DeviceIdentityClient, IdentityField};
pub use props::{AndroidProperties, PropertySource};
pub use service::{AndroidServiceCall, ServiceArg, ServiceCall, ServiceReply};

/// Result type for subprocess backed operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Failures running a platform command
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Caller errors on identity reads
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("SIM slot must be 0 or 1, got {0:?}")]
    InvalidSlot(String),
}
