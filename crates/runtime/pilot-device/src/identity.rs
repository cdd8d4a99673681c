//! Device identity client
//!
//! | Field | Source | Fallback |
//! |---|---|---|
//! | IMEI (slot 0/1) | `iphonesubinfo` method 3, `i32 slot` | random 15 digit number |
//! | Serial | `ro.serialno` | `cccccccc` |
//! | Subscriber info | `iphonesubinfo` method 7 | empty string |

use crate::props::PropertySource;
use crate::service::{ServiceArg, ServiceCall, ServiceReply};
use crate::IdentityError;
use pilot_parcel::{ParcelDecoder, TextParcelDecoder, ValueKind};
use rand::Rng;
use std::fmt::Display;

pub const SUBINFO_SERVICE: &str = "iphonesubinfo";
pub const METHOD_GET_IMEI: u32 = 3;
pub const METHOD_GET_SUBSCRIBER_INFO: u32 = 7;
pub const SERIAL_PROPERTY: &str = "ro.serialno";
pub const SERIAL_FALLBACK: &str = "cccccccc";
pub const MIN_SUBSCRIBER_INFO_LEN: usize = 8;

/// Identity values the client can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Imei(u8),
    SerialNumber,
    SubscriberInfo,
}

/// Reads identity fields through the service-call port
pub struct DeviceIdentityClient {
    service: Box<dyn ServiceCall>,
    props: Box<dyn PropertySource>,
    decoder: Box<dyn ParcelDecoder + Send + Sync>,
}

impl DeviceIdentityClient {
    pub fn new(service: Box<dyn ServiceCall>, props: Box<dyn PropertySource>) -> Self {
        Self {
            service,
            props,
            decoder: Box::new(TextParcelDecoder),
        }
    }

    /// Swap the reply decoder
    pub fn with_decoder(mut self, decoder: Box<dyn ParcelDecoder + Send + Sync>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Read any field
    pub fn read(&self, field: IdentityField) -> Result<String, IdentityError> {
        match field {
            IdentityField::Imei(slot) => self.imei(slot),
            IdentityField::SerialNumber => Ok(self.serial()),
            IdentityField::SubscriberInfo => Ok(self.subscriber_info()),
        }
    }

    /// IMEI of SIM `slot`, which must render as "0" or "1".
    ///
    /// A reply that cannot be decoded yields a random placeholder so that
    /// non-phone hardware still gets a distinct identity.
    pub fn imei(&self, slot: impl Display) -> Result<String, IdentityError> {
        let slot = slot.to_string();
        let index = match slot.as_str() {
            "0" => 0,
            "1" => 1,
            _ => return Err(IdentityError::InvalidSlot(slot)),
        };

        let imei = self
            .call_string16(METHOD_GET_IMEI, &[ServiceArg::I32(index)])
            .filter(|imei| !imei.is_empty())
            .unwrap_or_else(|| {
                tracing::debug!(slot = index, "no IMEI reply, using placeholder");
                placeholder_imei()
            });
        Ok(imei)
    }

    pub fn serial(&self) -> String {
        let serial = self.props.get(SERIAL_PROPERTY);
        if serial.is_empty() {
            SERIAL_FALLBACK.to_string()
        } else {
            serial
        }
    }

    /// Subscriber info, empty when missing or implausibly short
    pub fn subscriber_info(&self) -> String {
        self.call_string16(METHOD_GET_SUBSCRIBER_INFO, &[])
            .filter(|info| info.chars().count() >= MIN_SUBSCRIBER_INFO_LEN)
            .unwrap_or_default()
    }

    fn call_string16(&self, method: u32, args: &[ServiceArg]) -> Option<String> {
        match self.service.call(SUBINFO_SERVICE, method, args) {
            Ok(ServiceReply::Dump(dump)) => self
                .decoder
                .decode(&dump, ValueKind::String16)
                .and_then(|value| value.into_text()),
            Ok(ServiceReply::NotPhysical) => None,
            Err(e) => {
                tracing::warn!(method, error = %e, "service call failed");
                None
            }
        }
    }
}

/// 15 digit, zero padded
fn placeholder_imei() -> String {
    let n: u64 = rand::thread_rng().gen_range(0..=1u64 << 32);
    format!("{:015}", n)
}
