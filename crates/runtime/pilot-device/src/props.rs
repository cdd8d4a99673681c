//! System property port

use std::process::Command;

/// Reads system properties
pub trait PropertySource: Send + Sync {
    /// Property value, empty when unset or unavailable
    fn get(&self, key: &str) -> String;
}

/// `getprop` on the device, empty values elsewhere
#[derive(Debug, Clone)]
pub struct AndroidProperties {
    physical: bool,
}

impl AndroidProperties {
    pub fn new(physical: bool) -> Self {
        Self { physical }
    }
}

impl PropertySource for AndroidProperties {
    fn get(&self, key: &str) -> String {
        if !self.physical {
            return String::new();
        }

        match Command::new("getprop").arg(key).output() {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            Ok(output) => {
                tracing::warn!(key, status = %output.status, "getprop failed");
                String::new()
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "getprop unavailable");
                String::new()
            }
        }
    }
}
