//! # Unix `compress` (.Z) encoder and decoder
//!
//! This crate provides an [`Encoder`] and a [`Decoder`] for the adaptive LZW stream used by the
//! classic Unix `compress` utility. Code words are packed least significant bit first and start
//! out 9 bits wide, growing by one bit each time the dictionary fills the current width, up to
//! the maximum code size recorded in the stream header (at most 16 bits).
//!
//! A stream consists of a three byte header followed by the packed codes:
//!
//!  * `0x1f 0x9d`, the magic bytes
//!  * one byte whose low five bits hold the maximum code size
//!
//! The encoder starts every stream with a clear code and finishes it with an end code:
//!
//!  * `CLEAR_CODE == 256`
//!  * `END_CODE   == 257`
//!
//! so that the first code assigned to a new dictionary string is 258. The dictionary is never
//! reset after the leading clear code. Input that would need more than `2^max_bits` codes is
//! rejected with [`LzwError::Capacity`].
//!
//! Exemplary round trip:
//!
//! ```
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//! let compressed = dotz::encode(data, dotz::DEFAULT_MAX_BITS).unwrap();
//! assert_eq!(&compressed[..2], &dotz::MAGIC);
//!
//! let decompressed = dotz::decode(&compressed).unwrap();
//! assert_eq!(decompressed, data);
//! ```
pub(crate) const FIRST_FREE_CODE: Code = END_CODE + 1;

/// The two magic bytes opening every `.Z` stream.
pub const MAGIC: [u8; 2] = [0x1f, 0x9d];
/// Code resetting the dictionary to its 256 single byte strings.
pub const CLEAR_CODE: Code = 256;
/// Code marking the end of the data.
pub const END_CODE: Code = 257;
/// The code size every stream starts with.
pub const MIN_CODESIZE: u8 = 9;
/// The largest maximum code size this implementation accepts.
pub const MAX_CODESIZE: u8 = 16;
/// The maximum code size used when none is configured.
pub const DEFAULT_MAX_BITS: u8 = 16;

/// Alias for a LZW code point.
///
/// Wider than the largest code so that the count of assigned codes, which may reach
/// `1 << MAX_CODESIZE`, fits as well.
pub type Code = u32;

mod bits;
pub mod decode;
pub mod encode;
mod error;
pub mod header;

pub use crate::bits::{BitPacker, BitReader};
pub use crate::decode::Decoder;
pub use crate::encode::Encoder;
pub use crate::error::{FormatError, LzwError};
pub use crate::header::Header;

/// Compress `data` into a complete `.Z` stream with codes of at most `max_bits` bits.
pub fn encode(data: &[u8], max_bits: u8) -> Result<Vec<u8>, LzwError> {
    Encoder::new(max_bits)?.encode(data)
}

/// Decompress a complete `.Z` stream.
pub fn decode(data: &[u8]) -> Result<Vec<u8>, LzwError> {
    Decoder::new().decode(data)
}

pub(crate) fn check_max_bits(max_bits: u8) -> bool {
    (MIN_CODESIZE..=MAX_CODESIZE).contains(&max_bits)
}
