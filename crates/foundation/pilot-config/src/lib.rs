//! # Pilot Config
//!
//! Where things live and what was persisted last time.
//!
//! - [`PilotConfig`]: endpoints, directories and timeouts, read from the
//!   environment
//! - [`ParamsStore`]: persisted key/value parameters (dongle id, access token,
//!   version metadata)
//! - [`VersionInfo`]: build metadata recorded on every registration run

pub mod config;
pub mod params;
pub mod version;

pub use config::PilotConfig;
pub use params::{keys, FileParams, MemoryParams, ParamsStore};
pub use version::VersionInfo;

/// Result type for pilot-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the parameter store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter key: {0:?}")]
    InvalidKey(String),

    #[error("Parameter {0} is not valid UTF-8")]
    NotUtf8(String),
}
