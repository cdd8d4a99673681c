//! Hex word extraction
//!
//! Pulls the 8-digit hex words out of a `service call` dump and glues them
//! back into the reply bytes.

use lazy_static::lazy_static;
use regex::Regex;

/// Substring present in every successful reply
pub const PARCEL_MARKER: &str = "Parcel";

lazy_static! {
    // Anchored on the leading space or paren so the "0x00000000:" offset
    // column and longer hex runs are skipped.
    static ref HEX_WORD: Regex = Regex::new(r"[ (]([0-9a-f]{8})\b").unwrap();
}

/// Reassemble the reply bytes from a raw dump.
///
/// Returns `None` when the marker is missing, when no word is found, or when
/// a word does not decode.
pub fn extract(dump: &str) -> Option<Vec<u8>> {
    if !dump.contains(PARCEL_MARKER) {
        return None;
    }

    let mut bytes = Vec::new();
    for caps in HEX_WORD.captures_iter(dump) {
        let word = caps.get(1)?.as_str();
        bytes.extend(hex::decode(word).ok()?);
    }

    if bytes.is_empty() {
        return None;
    }

    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMEI_DUMP: &str = "Result: Parcel(\n\
        0x00000000: 00000000 0000000f 00350033 00300035 '........3.5.0.5.'\n\
        0x00000010: 00300030 00300030 00300030 00300030 '0.0.0.0.0.0.0.0.'\n\
        0x00000020: 00000030                            '0...            ')";

    #[test]
    fn test_extract_requires_marker() {
        assert_eq!(extract("Result: (00000000 00000001)"), None);
        assert_eq!(extract(""), None);
        assert_eq!(extract("service: not found"), None);
    }

    #[test]
    fn test_extract_no_words() {
        assert_eq!(extract("Result: Parcel()"), None);
        assert_eq!(extract("Result: Parcel(Error: 0xffffffb6)"), None);
    }

    #[test]
    fn test_extract_preserves_order() {
        let bytes = extract("Result: Parcel(00000001 deadbeef 0a0b0c0d)").unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(
            bytes,
            vec![0x00, 0x00, 0x00, 0x01, 0xde, 0xad, 0xbe, 0xef, 0x0a, 0x0b, 0x0c, 0x0d]
        );
    }

    #[test]
    fn test_extract_skips_offset_column() {
        let bytes = extract(IMEI_DUMP).unwrap();
        // 9 words, offsets and the quoted ascii column are ignored
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[4..8], &[0x00, 0x00, 0x00, 0x0f]);
    }

    #[test]
    fn test_extract_ignores_longer_runs_and_uppercase() {
        let bytes = extract("Parcel(00000001 0123456789 DEADBEEF 00000002)").unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 1, 0, 0, 0, 2]);
    }

    #[test]
    fn test_extract_length_is_four_per_word() {
        for n in 1..6 {
            let words = vec!["cafebabe"; n].join(" ");
            let dump = format!("Result: Parcel({})", words);
            assert_eq!(extract(&dump).unwrap().len(), 4 * n);
        }
    }
}
