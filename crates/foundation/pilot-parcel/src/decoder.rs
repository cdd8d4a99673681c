//! Parcel decoding
//!
//! Extraction and parsing behind one seam. Callers only see "a value" or
//! "no value"; where it failed is not reported.

use crate::extract::extract;
use crate::value::{parse_int32, parse_string16};
use crate::{TypedValue, ValueKind};

/// Turns a reply produced by some IPC transport into a typed value
pub trait ParcelDecoder {
    fn decode(&self, dump: &str, kind: ValueKind) -> Option<TypedValue>;
}

/// Decoder for the hex dump printed by `service call`
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParcelDecoder;

impl ParcelDecoder for TextParcelDecoder {
    fn decode(&self, dump: &str, kind: ValueKind) -> Option<TypedValue> {
        decode(dump, kind)
    }
}

/// Extract the reply bytes from `dump` and parse them as `kind`
pub fn decode(dump: &str, kind: ValueKind) -> Option<TypedValue> {
    let bytes = extract(dump)?;
    match kind {
        ValueKind::Int32 => parse_int32(&bytes).map(TypedValue::Int32),
        ValueKind::String16 => parse_string16(&bytes).map(TypedValue::Text),
    }
}
