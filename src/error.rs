use crate::{Code, MAX_CODESIZE, MIN_CODESIZE};

/// The ways in which de- or encoding a `.Z` stream can fail.
///
/// None of them is recoverable within a call; the partial output is discarded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LzwError {
    /// The input is not a `.Z` stream. Callers may want to try another container format.
    #[error("not a compress (.Z) stream: {0}")]
    Format(#[from] FormatError),
    /// A code is neither a known dictionary entry nor the next one to be assigned.
    ///
    /// `offset` is the byte offset in the stream where the code begins, or the index of the code
    /// when decoding an already unpacked sequence of codes.
    #[error("corrupt stream at offset {offset}: code {code} is past the next free code {next_code}")]
    CorruptStream {
        code: Code,
        next_code: Code,
        offset: usize,
    },
    /// The dictionary would need more than `2^max_bits` entries.
    ///
    /// `offset` is the input byte index when encoding and the stream offset when decoding.
    #[error("dictionary of {max_bits} bit codes is exhausted at offset {offset}")]
    Capacity { max_bits: u8, offset: usize },
    /// The encoder was configured with an unsupported maximum code size.
    #[error("maximum code size must be within {min}..={max} bits, got {0}", min = MIN_CODESIZE, max = MAX_CODESIZE)]
    InvalidMaxBits(u8),
}

/// Problems with the three byte container header.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    #[error("{0} bytes are too short for the 3 byte header")]
    Truncated(usize),
    #[error("magic bytes {0:02x} {1:02x} are not 1f 9d")]
    Magic(u8, u8),
    #[error("header declares {0} bit codes, supported are {min}..={max}", min = MIN_CODESIZE, max = MAX_CODESIZE)]
    MaxBits(u8),
}

#[cfg(test)]
mod tests {
    use super::{FormatError, LzwError};

    #[test]
    fn messages_carry_context() {
        let err = LzwError::CorruptStream { code: 600, next_code: 300, offset: 17 };
        assert_eq!(
            err.to_string(),
            "corrupt stream at offset 17: code 600 is past the next free code 300"
        );

        let err = LzwError::from(FormatError::Magic(0x1f, 0x8b));
        assert_eq!(err.to_string(), "not a compress (.Z) stream: magic bytes 1f 8b are not 1f 9d");

        assert_eq!(
            LzwError::InvalidMaxBits(20).to_string(),
            "maximum code size must be within 9..=16 bits, got 20"
        );
    }
}
