//! Typed value parsing
//!
//! Interprets reply bytes as one of the two supported shapes.
//!
//! ## String16 layout
//!
//! ```text
//! [ 8 bytes: status + length ][ UTF-16BE code units ... ]
//!   skipped, never validated    characters come out pairwise swapped
//! ```
//!
//! The dump prints little-endian 32-bit words, so reading the words back as
//! big-endian UTF-16 yields "badc" for "abcd". Swapping each pair restores the
//! character order and the NUL padding of the last word is stripped.

/// Bytes in front of the string payload (status word + declared length)
const STRING16_HEADER_LEN: usize = 8;

/// Parse a single little-endian `i32`. The buffer must be exactly 4 bytes.
pub fn parse_int32(buf: &[u8]) -> Option<i32> {
    let bytes: [u8; 4] = buf.try_into().ok()?;
    Some(i32::from_le_bytes(bytes))
}

/// Parse a length-prefixed UTF-16 string with pairwise swap correction.
///
/// The declared length is ignored; the whole remainder is decoded.
pub fn parse_string16(buf: &[u8]) -> Option<String> {
    let payload = buf.get(STRING16_HEADER_LEN..)?;
    if payload.is_empty() || payload.len() % 2 != 0 {
        return None;
    }

    let units = payload
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    let decoded: Vec<char> = char::decode_utf16(units)
        .collect::<Result<_, _>>()
        .ok()?;

    let mut result = String::with_capacity(decoded.len());
    for pair in decoded.chunks(2) {
        match *pair {
            [a, b] => {
                result.push(b);
                result.push(a);
            }
            [a] => {
                result.push('\0');
                result.push(a);
            }
            _ => unreachable!(),
        }
    }

    Some(result.replace('\0', ""))
}
