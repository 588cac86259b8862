//! Packing of variable width codes, least significant bit first.
use crate::{Code, MAX_CODESIZE};

/// Receives the codes produced by the encoder together with the width they are packed at.
pub(crate) trait CodeSink {
    fn push_code(&mut self, code: Code, code_size: u8);
}

/// Packs codes into bytes.
///
/// Each code is placed above the bits already buffered; full bytes leave the buffer from its
/// low end. The width may change from one code to the next.
#[derive(Debug, Default)]
pub struct BitPacker {
    /// The buffer bits.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
    out: Vec<u8>,
}

/// Reads codes of a given width from packed bytes.
#[derive(Debug)]
pub struct BitReader<'d> {
    inp: &'d [u8],
    /// Bytes moved from `inp` into the bit buffer so far.
    consumed: usize,
    bit_buffer: u64,
    bits: u8,
}

impl BitPacker {
    pub fn new() -> Self {
        BitPacker::default()
    }

    /// Start the output with `prefix`, for example a stream header.
    pub fn with_prefix(prefix: &[u8]) -> Self {
        BitPacker {
            out: prefix.to_vec(),
            ..BitPacker::default()
        }
    }

    pub fn push_code(&mut self, code: Code, code_size: u8) {
        debug_assert!(code_size <= MAX_CODESIZE);
        debug_assert!(code >> code_size == 0, "code {} wider than {} bits", code, code_size);
        self.buffer |= u64::from(code) << self.bits_in_buffer;
        self.bits_in_buffer += code_size;

        while self.bits_in_buffer >= 8 {
            self.out.push((self.buffer & 0xff) as u8);
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
    }

    /// Pad the last partial byte with zero bits and return all bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits_in_buffer > 0 {
            self.out.push((self.buffer & 0xff) as u8);
        }
        self.out
    }
}

impl CodeSink for BitPacker {
    fn push_code(&mut self, code: Code, code_size: u8) {
        BitPacker::push_code(self, code, code_size)
    }
}

impl CodeSink for Vec<Code> {
    fn push_code(&mut self, code: Code, _: u8) {
        self.push(code)
    }
}

impl<'d> BitReader<'d> {
    pub fn new(inp: &'d [u8]) -> Self {
        BitReader {
            inp,
            consumed: 0,
            bit_buffer: 0,
            bits: 0,
        }
    }

    /// Read the next `code_size` bits, or `None` if fewer bits than that remain.
    pub fn read_code(&mut self, code_size: u8) -> Option<Code> {
        debug_assert!(code_size <= MAX_CODESIZE);
        if self.bits < code_size {
            self.refill_bits();
        }

        if self.bits < code_size {
            return None;
        }

        let mask = (1u64 << code_size) - 1;
        let code = (self.bit_buffer & mask) as Code;
        self.bit_buffer >>= code_size;
        self.bits -= code_size;
        Some(code)
    }

    /// The offset of the byte holding the next unread bit.
    pub fn byte_offset(&self) -> usize {
        self.consumed - usize::from(self.bits / 8) - usize::from(self.bits % 8 != 0)
    }

    fn refill_bits(&mut self) {
        while self.bits <= 56 {
            let (&byte, tail) = match self.inp.split_first() {
                Some(split) => split,
                None => break,
            };
            self.bit_buffer |= u64::from(byte) << self.bits;
            self.bits += 8;
            self.inp = tail;
            self.consumed += 1;
        }
    }
}
