//! Modified UTF-8, the string encoding of the DEX format.
//!
//! It differs from standard UTF-8 in two ways: `U+0000` is encoded as
//! the two-byte sequence `0xC0 0x80` so that encoded strings never
//! contain a NUL byte, and supplementary code points are encoded as a
//! surrogate pair of two three-byte units rather than one four-byte
//! sequence. Every UTF-16 code unit, including an unpaired surrogate,
//! maps to one 1-3 byte sequence.

/// A byte sequence that is not valid Modified UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Mutf8Error {
    /// A raw NUL byte; `U+0000` must be encoded as `0xC0 0x80`.
    #[error("raw NUL byte at offset {0}")]
    EmbeddedNul(usize),
    /// A lead byte outside the 1-3 byte forms, or a stray continuation.
    #[error("invalid byte {byte:#04x} at offset {offset}")]
    InvalidByte {
        /// The offending byte.
        byte: u8,
        /// Its offset in the input.
        offset: usize,
    },
    /// The input ended in the middle of a multi-byte sequence.
    #[error("truncated sequence at offset {0}")]
    Truncated(usize),
}

/// Append the encoding of one UTF-16 code unit (1-3 bytes).
pub fn encode_unit(unit: u16, out: &mut Vec<u8>) {
    match unit {
        0x0001..=0x007f => out.push(unit as u8),
        // U+0000 uses the two-byte form so encoded strings are NUL-free.
        0x0000 | 0x0080..=0x07ff => {
            out.push(0xc0 | (unit >> 6) as u8);
            out.push(0x80 | (unit & 0x3f) as u8);
        }
        _ => {
            out.push(0xe0 | (unit >> 12) as u8);
            out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
            out.push(0x80 | (unit & 0x3f) as u8);
        }
    }
}

/// Encode a Rust string, unit by UTF-16 code unit.
///
/// Supplementary code points come out as surrogate pairs.
pub fn encode_str(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        encode_unit(unit, &mut out);
    }
    out
}

/// Decode a byte sequence into UTF-16 code units.
pub fn decode_units(bytes: &[u8]) -> Result<Vec<u16>, Mutf8Error> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let (unit, len) = match b {
            0x00 => return Err(Mutf8Error::EmbeddedNul(i)),
            0x01..=0x7f => (b as u16, 1),
            0xc0..=0xdf => {
                let b1 = continuation(bytes, i, 1)?;
                ((b as u16 & 0x1f) << 6 | b1, 2)
            }
            0xe0..=0xef => {
                let b1 = continuation(bytes, i, 1)?;
                let b2 = continuation(bytes, i, 2)?;
                ((b as u16 & 0x0f) << 12 | b1 << 6 | b2, 3)
            }
            _ => {
                return Err(Mutf8Error::InvalidByte { byte: b, offset: i });
            }
        };
        units.push(unit);
        i += len;
    }
    Ok(units)
}

fn continuation(bytes: &[u8], start: usize, offset: usize) -> Result<u16, Mutf8Error> {
    let i = start + offset;
    match bytes.get(i) {
        Some(&b) if b & 0xc0 == 0x80 => Ok(b as u16 & 0x3f),
        Some(&b) => Err(Mutf8Error::InvalidByte { byte: b, offset: i }),
        None => Err(Mutf8Error::Truncated(start)),
    }
}

/// The number of UTF-16 code units in an encoded string.
///
/// Each unit starts with a non-continuation byte, so no decoding is
/// needed.
pub fn unit_count(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b & 0xc0 != 0x80).count()
}

/// Decode to a Rust string, replacing unpaired surrogates.
pub fn to_string_lossy(bytes: &[u8]) -> String {
    match decode_units(bytes) {
        Ok(units) => String::from_utf16_lossy(&units),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::ascii("hi", &[0x68, 0x69])]
    #[case::nul("\u{0}", &[0xc0, 0x80])]
    #[case::two_byte("\u{7ff}", &[0xdf, 0xbf])]
    #[case::three_byte("\u{ffff}", &[0xef, 0xbf, 0xbf])]
    // U+10400 encodes as the surrogate pair D801 DC00.
    #[case::supplementary("\u{10400}", &[0xed, 0xa0, 0x81, 0xed, 0xb0, 0x80])]
    fn encodes(#[case] s: &str, #[case] expected: &[u8]) {
        assert_eq!(encode_str(s), expected);
    }

    #[rstest]
    #[case("hello")]
    #[case("\u{0}a\u{0}")]
    #[case("päivää \u{4e16}\u{754c}")]
    #[case("\u{10400}\u{1f600}")]
    fn round_trips(#[case] s: &str) {
        let bytes = encode_str(s);
        assert_eq!(to_string_lossy(&bytes), s);
        assert_eq!(unit_count(&bytes), s.encode_utf16().count());
    }

    #[test]
    fn unpaired_surrogate_survives_encoding() {
        let mut bytes = Vec::new();
        encode_unit(0xd801, &mut bytes);
        assert_eq!(bytes, [0xed, 0xa0, 0x81]);
        assert_eq!(decode_units(&bytes).unwrap(), [0xd801]);
        assert_eq!(unit_count(&bytes), 1);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(decode_units(&[0x00]), Err(Mutf8Error::EmbeddedNul(0)));
        assert_eq!(
            decode_units(&[0xf0, 0x80]),
            Err(Mutf8Error::InvalidByte { byte: 0xf0, offset: 0 })
        );
        assert_eq!(
            decode_units(&[0x80]),
            Err(Mutf8Error::InvalidByte { byte: 0x80, offset: 0 })
        );
        assert_eq!(decode_units(&[0xc2]), Err(Mutf8Error::Truncated(0)));
        assert_eq!(
            decode_units(&[0xe0, 0xa0, 0x41]),
            Err(Mutf8Error::InvalidByte { byte: 0x41, offset: 2 })
        );
    }
}
