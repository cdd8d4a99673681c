//! `service call` port

use crate::{DeviceError, Result};
use std::path::Path;
use std::process::Command;

/// Typed argument appended to a service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceArg {
    I32(i32),
    S16(String),
    Null,
}

impl ServiceArg {
    /// Command line form understood by `service call`
    pub fn to_args(&self) -> Vec<String> {
        match self {
            ServiceArg::I32(v) => vec!["i32".to_string(), v.to_string()],
            ServiceArg::S16(s) => vec!["s16".to_string(), s.clone()],
            ServiceArg::Null => vec!["null".to_string()],
        }
    }
}

/// What came back from a service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceReply {
    /// Text printed by the call
    Dump(String),
    /// Not running on the physical target, nothing was invoked
    NotPhysical,
}

/// Invokes a method on a binder service
pub trait ServiceCall: Send + Sync {
    fn call(&self, service: &str, method: u32, args: &[ServiceArg]) -> Result<ServiceReply>;
}

/// Runs `service call` on the device
#[derive(Debug, Clone)]
pub struct AndroidServiceCall {
    physical: bool,
}

impl AndroidServiceCall {
    pub fn new(physical: bool) -> Self {
        Self { physical }
    }

    /// Physical when `marker` exists
    pub fn detect(marker: &Path) -> Self {
        Self::new(marker.exists())
    }

    pub fn is_physical(&self) -> bool {
        self.physical
    }
}

/// Full argument vector for `service`
pub fn command_line(service: &str, method: u32, args: &[ServiceArg]) -> Vec<String> {
    let mut argv = vec!["call".to_string(), service.to_string(), method.to_string()];
    argv.extend(args.iter().flat_map(ServiceArg::to_args));
    argv
}

impl ServiceCall for AndroidServiceCall {
    fn call(&self, service: &str, method: u32, args: &[ServiceArg]) -> Result<ServiceReply> {
        if !self.physical {
            return Ok(ServiceReply::NotPhysical);
        }

        let argv = command_line(service, method, args);
        let command = format!("service {}", argv.join(" "));
        tracing::debug!(%command, "invoking service");

        let output = Command::new("service")
            .args(&argv)
            .output()
            .map_err(|source| DeviceError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DeviceError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(ServiceReply::Dump(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let argv = command_line("iphonesubinfo", 3, &[ServiceArg::I32(1)]);
        assert_eq!(argv, vec!["call", "iphonesubinfo", "3", "i32", "1"]);

        let argv = command_line(
            "power",
            16,
            &[ServiceArg::I32(0), ServiceArg::S16("update".to_string()), ServiceArg::Null],
        );
        assert_eq!(argv, vec!["call", "power", "16", "i32", "0", "s16", "update", "null"]);
    }

    #[test]
    fn test_not_physical_skips_subprocess() {
        let service = AndroidServiceCall::new(false);
        let reply = service.call("iphonesubinfo", 7, &[]).unwrap();
        assert_eq!(reply, ServiceReply::NotPhysical);
    }

    #[test]
    fn test_detect_missing_marker() {
        let service = AndroidServiceCall::detect(Path::new("/nonexistent/pilot-marker"));
        assert!(!service.is_physical());
    }
}
