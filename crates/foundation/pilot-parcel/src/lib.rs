//! # Pilot Parcel
//!
//! Decodes the text that `service call` prints for a binder reply.
//!
//! ```text
//! Result: Parcel(
//!   0x00000000: 00000000 0000000f 00350033 00300035 '........3.5.0.5.'
//!   ...
//! )
//!        │ extract()
//!        ▼
//!   [00 00 00 00 00 00 00 0f 00 35 00 33 ...]
//!        │ parse_int32() / parse_string16()
//!        ▼
//!   TypedValue::Int32 | TypedValue::Text
//! ```
//!
//! Every failure is reported as `None`. A dump that cannot be decoded is an
//! expected outcome, callers pick their own fallback.

pub mod decoder;
pub mod extract;
pub mod value;

pub use decoder::{decode, ParcelDecoder, TextParcelDecoder};
pub use extract::{extract, PARCEL_MARKER};
pub use value::{parse_int32, parse_string16};

/// Value shapes that can be pulled out of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Single little-endian 32-bit integer
    Int32,
    /// Length-prefixed UTF-16 string
    String16,
}

/// A decoded reply value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Int32(i32),
    Text(String),
}

impl TypedValue {
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            TypedValue::Int32(v) => Some(*v),
            TypedValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) => Some(s),
            TypedValue::Int32(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            TypedValue::Text(s) => Some(s),
            TypedValue::Int32(_) => None,
        }
    }
}
