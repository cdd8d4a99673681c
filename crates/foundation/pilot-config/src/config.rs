//! Environment driven configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_HOST: &str = "https://api.commadotai.com";
pub const DEFAULT_DEVICE_MARKER: &str = "/EON";
pub const DEVICE_PARAMS_DIR: &str = "/data/params/d";
pub const DEVICE_PERSIST_DIR: &str = "/persist/comma";
pub const DEVICE_REPO_DIR: &str = "/data/openpilot";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 15;

/// Runtime configuration for a registration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotConfig {
    /// Base URL of the auth API
    pub api_host: String,
    /// Directory holding one file per persisted parameter
    pub params_dir: PathBuf,
    /// Directory holding the device key pair
    pub persist_dir: PathBuf,
    /// Timeout for the pilotauth request
    pub auth_timeout: Duration,
    /// File whose presence marks a physical device
    pub device_marker: PathBuf,
    /// Installed checkout whose git metadata is recorded
    pub repo_dir: PathBuf,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl PilotConfig {
    /// Build from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let device_marker = lookup("PILOT_DEVICE_MARKER")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE_MARKER));
        let on_device = device_marker.exists();

        let api_host = lookup("API_HOST").unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let params_dir = lookup("PILOT_PARAMS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_dir(on_device, DEVICE_PARAMS_DIR, "params"));
        let persist_dir = lookup("PILOT_PERSIST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_dir(on_device, DEVICE_PERSIST_DIR, "persist"));
        let repo_dir = lookup("PILOT_REPO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_repo_dir(on_device));
        let auth_timeout = lookup("PILOT_AUTH_TIMEOUT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS);

        Self {
            api_host,
            params_dir,
            persist_dir,
            auth_timeout: Duration::from_secs(auth_timeout),
            device_marker,
            repo_dir,
        }
    }

    /// True when running on the physical target
    pub fn is_device(&self) -> bool {
        self.device_marker.exists()
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.persist_dir.join("id_rsa")
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.persist_dir.join("id_rsa.pub")
    }
}

fn default_dir(on_device: bool, device_path: &str, name: &str) -> PathBuf {
    if on_device {
        return PathBuf::from(device_path);
    }
    dirs::home_dir()
        .unwrap_or_else(env::temp_dir)
        .join(".pilot")
        .join(name)
}

/// Off device the checkout is wherever the binary was installed from
fn default_repo_dir(on_device: bool) -> PathBuf {
    if on_device {
        return PathBuf::from(DEVICE_REPO_DIR);
    }
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_off_device() {
        let config = PilotConfig::from_lookup(lookup_from(&[(
            "PILOT_DEVICE_MARKER",
            "/nonexistent/pilot-marker",
        )]));

        assert_eq!(config.api_host, DEFAULT_API_HOST);
        assert_eq!(config.auth_timeout, Duration::from_secs(15));
        assert!(!config.is_device());
        assert!(config.params_dir.ends_with(".pilot/params"));
        assert!(config.persist_dir.ends_with(".pilot/persist"));
        let exe_dir = env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(config.repo_dir, exe_dir);
    }

    #[test]
    fn test_overrides() {
        let config = PilotConfig::from_lookup(lookup_from(&[
            ("API_HOST", "http://127.0.0.1:8080"),
            ("PILOT_PARAMS_DIR", "/tmp/params"),
            ("PILOT_PERSIST_DIR", "/tmp/persist"),
            ("PILOT_AUTH_TIMEOUT", "3"),
            ("PILOT_REPO_DIR", "/opt/pilot"),
        ]));

        assert_eq!(config.api_host, "http://127.0.0.1:8080");
        assert_eq!(config.params_dir, PathBuf::from("/tmp/params"));
        assert_eq!(config.private_key_path(), PathBuf::from("/tmp/persist/id_rsa"));
        assert_eq!(config.public_key_path(), PathBuf::from("/tmp/persist/id_rsa.pub"));
        assert_eq!(config.auth_timeout, Duration::from_secs(3));
        assert_eq!(config.repo_dir, PathBuf::from("/opt/pilot"));
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let config = PilotConfig::from_lookup(lookup_from(&[("PILOT_AUTH_TIMEOUT", "soon")]));
        assert_eq!(config.auth_timeout, Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS));
    }

    #[test]
    fn test_device_marker_switches_defaults() {
        let marker = tempfile::NamedTempFile::new().unwrap();
        let config = PilotConfig::from_lookup(lookup_from(&[(
            "PILOT_DEVICE_MARKER",
            marker.path().to_str().unwrap(),
        )]));

        assert!(config.is_device());
        assert_eq!(config.params_dir, PathBuf::from(DEVICE_PARAMS_DIR));
        assert_eq!(config.persist_dir, PathBuf::from(DEVICE_PERSIST_DIR));
        assert_eq!(config.repo_dir, PathBuf::from(DEVICE_REPO_DIR));
    }
}
