//! The three byte `.Z` container header.
use crate::error::{FormatError, LzwError};
use crate::{check_max_bits, DEFAULT_MAX_BITS, MAGIC};

/// Mask selecting the maximum code size from the flag byte. The other bits are reserved.
const MAX_BITS_MASK: u8 = 0x1f;

/// The header preceding every packed code stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    max_bits: u8,
}

impl Header {
    pub const LEN: usize = 3;

    pub fn new(max_bits: u8) -> Result<Self, LzwError> {
        if !check_max_bits(max_bits) {
            return Err(LzwError::InvalidMaxBits(max_bits));
        }

        Ok(Header { max_bits })
    }

    /// The largest code size used in the stream.
    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    /// Split a stream into its header and the packed codes following it.
    ///
    /// Only the magic and the low five bits of the flag byte are inspected. No payload byte is
    /// looked at.
    pub fn parse(data: &[u8]) -> Result<(Self, &[u8]), FormatError> {
        if data.len() >= 2 && data[..2] != MAGIC {
            return Err(FormatError::Magic(data[0], data[1]));
        }

        let (flags, payload) = match data {
            [_, _, flags, payload @ ..] => (*flags, payload),
            _ => return Err(FormatError::Truncated(data.len())),
        };

        let max_bits = flags & MAX_BITS_MASK;
        if !check_max_bits(max_bits) {
            return Err(FormatError::MaxBits(max_bits));
        }

        Ok((Header { max_bits }, payload))
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [MAGIC[0], MAGIC[1], self.max_bits]
    }
}

impl Default for Header {
    fn default() -> Self {
        Header {
            max_bits: DEFAULT_MAX_BITS,
        }
    }
}

/// Check whether `data` opens with the `.Z` magic.
///
/// Intended for callers choosing between several container formats, e.g. gzip's `1f 8b`.
pub fn is_compress_stream(data: &[u8]) -> bool {
    data.starts_with(&MAGIC)
}

#[cfg(test)]
mod tests {
    use super::{is_compress_stream, Header};
    use crate::error::{FormatError, LzwError};

    #[test]
    fn writes_max_bits_into_flags() {
        let header = Header::new(12).unwrap();
        assert_eq!(header.to_bytes(), [0x1f, 0x9d, 12]);
    }

    #[test]
    fn reserved_flag_bits_are_ignored() {
        // 0x80 is the block mode flag of historical compress.
        let (header, payload) = Header::parse(&[0x1f, 0x9d, 0x90, 0xaa, 0xbb]).unwrap();
        assert_eq!(header.max_bits(), 16);
        assert_eq!(payload, &[0xaa, 0xbb]);
    }

    #[test]
    fn magic_mismatch() {
        let gzip = [0x1f, 0x8b, 0x08, 0x00];
        assert_eq!(Header::parse(&gzip), Err(FormatError::Magic(0x1f, 0x8b)));
        assert!(!is_compress_stream(&gzip));
        assert!(is_compress_stream(&[0x1f, 0x9d]));
    }

    #[test]
    fn short_input() {
        assert_eq!(Header::parse(&[]), Err(FormatError::Truncated(0)));
        assert_eq!(Header::parse(&[0x1f]), Err(FormatError::Truncated(1)));
        assert_eq!(Header::parse(&[0x1f, 0x9d]), Err(FormatError::Truncated(2)));
    }

    #[test]
    fn unsupported_code_sizes() {
        assert_eq!(Header::parse(&[0x1f, 0x9d, 8]), Err(FormatError::MaxBits(8)));
        assert_eq!(Header::parse(&[0x1f, 0x9d, 0x1f]), Err(FormatError::MaxBits(31)));
        assert_eq!(Header::new(17), Err(LzwError::InvalidMaxBits(17)));
        assert_eq!(Header::new(8), Err(LzwError::InvalidMaxBits(8)));
    }
}
