//! Power manager control

use crate::service::{ServiceArg, ServiceCall, ServiceReply};
use crate::Result;

pub const POWER_SERVICE: &str = "power";
/// IPowerManager.reboot
pub const METHOD_REBOOT: u32 = 16;

/// Arguments for IPowerManager.reboot: no confirmation, reason, wait
pub fn reboot_args(reason: Option<&str>) -> Vec<ServiceArg> {
    let reason = match reason {
        Some(reason) => ServiceArg::S16(reason.to_string()),
        None => ServiceArg::Null,
    };
    vec![ServiceArg::I32(0), reason, ServiceArg::I32(1)]
}

/// Ask the power manager to reboot. Does nothing off-device.
pub fn reboot(service: &dyn ServiceCall, reason: Option<&str>) -> Result<()> {
    tracing::info!(reason = reason.unwrap_or("none"), "requesting reboot");
    match service.call(POWER_SERVICE, METHOD_REBOOT, &reboot_args(reason))? {
        ServiceReply::Dump(_) => Ok(()),
        ServiceReply::NotPhysical => {
            tracing::debug!("not on device, reboot skipped");
            Ok(())
        }
    }
}
