//! A module for all decoding needs.
use crate::bits::BitReader;
use crate::error::LzwError;
use crate::header::Header;
use crate::{check_max_bits, Code, CLEAR_CODE, END_CODE, MIN_CODESIZE};

/// Decodes `.Z` streams.
///
/// The decoder takes all of its parameters from the stream header, so it carries no
/// configuration. Every call rebuilds its own dictionary.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decoder {
    _private: (),
}

#[derive(Clone, Copy)]
struct Link {
    /// The code of the string this one extends by `byte`.
    prefix: Code,
    byte: u8,
    /// The first byte of the whole string.
    first: u8,
}

struct DecodeState {
    /// The maximum code size from the header.
    max_bits: u8,

    /// The table of decoded codes.
    table: Table,

    /// The current code size.
    code_size: u8,

    /// The previously decoded code, `None` right after a reset.
    last: Option<Code>,
}

struct Table {
    inner: Vec<Link>,
    depths: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LzwStatus {
    Ok,
    Done,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder::default()
    }

    /// Decode a complete stream, header included.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        let (header, payload) = Header::parse(data)?;
        tracing::debug!(
            max_bits = header.max_bits(),
            payload = payload.len(),
            "parsed compress header"
        );
        self.decode_stream(header.max_bits(), payload, Header::LEN)
    }

    /// Decode packed codes that are not preceded by a header.
    pub fn decode_payload(&self, max_bits: u8, payload: &[u8]) -> Result<Vec<u8>, LzwError> {
        if !check_max_bits(max_bits) {
            return Err(LzwError::InvalidMaxBits(max_bits));
        }

        self.decode_stream(max_bits, payload, 0)
    }

    /// Decode a sequence of codes that has already been unpacked.
    ///
    /// Errors report the index of the offending code as their offset.
    pub fn decode_codes(&self, max_bits: u8, codes: &[Code]) -> Result<Vec<u8>, LzwError> {
        if !check_max_bits(max_bits) {
            return Err(LzwError::InvalidMaxBits(max_bits));
        }

        let mut state = DecodeState::new(max_bits);
        let mut out = Vec::new();
        for (idx, &code) in codes.iter().enumerate() {
            if state.advance(code, &mut out, idx)? == LzwStatus::Done {
                break;
            }
        }

        Ok(out)
    }

    fn decode_stream(
        &self,
        max_bits: u8,
        payload: &[u8],
        base_offset: usize,
    ) -> Result<Vec<u8>, LzwError> {
        let mut state = DecodeState::new(max_bits);
        let mut reader = BitReader::new(payload);
        let mut out = Vec::with_capacity(payload.len().saturating_mul(2));

        loop {
            let offset = base_offset + reader.byte_offset();
            // Fewer bits than a whole code left: only padding remains.
            let code = match reader.read_code(state.code_size) {
                Some(code) => code,
                None => break,
            };

            if state.advance(code, &mut out, offset)? == LzwStatus::Done {
                break;
            }
        }

        tracing::debug!(
            output = out.len(),
            entries = state.table.len(),
            "decoded compress stream"
        );
        Ok(out)
    }
}

impl DecodeState {
    fn new(max_bits: u8) -> Self {
        DecodeState {
            max_bits,
            table: Table::new(),
            code_size: MIN_CODESIZE,
            last: None,
        }
    }

    fn reset_tables(&mut self) {
        self.code_size = MIN_CODESIZE;
        self.table.clear();
        self.last = None;
        tracing::trace!("clear code, dictionary reset");
    }

    fn next_code(&self) -> Code {
        self.table.len()
    }

    /// Process one code, appending its string to `out`.
    fn advance(
        &mut self,
        code: Code,
        out: &mut Vec<u8>,
        offset: usize,
    ) -> Result<LzwStatus, LzwError> {
        if code == CLEAR_CODE {
            self.reset_tables();
            return Ok(LzwStatus::Ok);
        }

        if code == END_CODE {
            return Ok(LzwStatus::Done);
        }

        let next_code = self.next_code();
        let last = match self.last {
            Some(last) => last,
            // The first code after a reset must be a single byte.
            None if code < CLEAR_CODE => {
                self.table.reconstruct(code, out);
                self.last = Some(code);
                self.bump_code_size();
                return Ok(LzwStatus::Ok);
            }
            None => {
                return Err(LzwError::CorruptStream {
                    code,
                    next_code: CLEAR_CODE,
                    offset,
                })
            }
        };

        // Each newly read code creates one new entry based on the preceding code. The code
        // may refer to exactly that entry, whose string then starts like the preceding one.
        let first = if code < next_code {
            self.table.first_byte(code)
        } else if code == next_code {
            self.table.first_byte(last)
        } else {
            return Err(LzwError::CorruptStream {
                code,
                next_code,
                offset,
            });
        };

        if next_code >> self.max_bits != 0 {
            return Err(LzwError::Capacity {
                max_bits: self.max_bits,
                offset,
            });
        }

        self.table.derive(last, first);
        self.table.reconstruct(code, out);
        self.last = Some(code);
        self.bump_code_size();
        Ok(LzwStatus::Ok)
    }

    fn bump_code_size(&mut self) {
        // The encoder has already assigned the entry we only create with the next code.
        let population = self.next_code() + 1;
        if population >= 1 << self.code_size && self.code_size < self.max_bits {
            self.code_size += 1;
            tracing::trace!(code_size = self.code_size, population, "code size increased");
        }
    }
}

impl Table {
    fn new() -> Self {
        let mut table = Table {
            inner: Vec::new(),
            depths: Vec::new(),
        };
        table.clear();
        table
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.depths.clear();
        for i in 0..=u8::MAX {
            self.inner.push(Link::base(i));
            self.depths.push(1);
        }
        // Clear code.
        self.inner.push(Link::base(0));
        self.depths.push(0);
        // End code.
        self.inner.push(Link::base(0));
        self.depths.push(0);
    }

    fn len(&self) -> Code {
        self.inner.len() as Code
    }

    fn first_byte(&self, code: Code) -> u8 {
        self.inner[code as usize].first
    }

    fn derive(&mut self, prev: Code, byte: u8) {
        let link = self.inner[prev as usize].derive(prev, byte);
        let depth = self.depths[prev as usize] + 1;
        self.inner.push(link);
        self.depths.push(depth);
    }

    /// Append the string of `code` to `out`, walking its prefixes back to front.
    fn reconstruct(&self, code: Code, out: &mut Vec<u8>) {
        let depth = self.depths[code as usize] as usize;
        let start = out.len();
        out.resize(start + depth, 0);

        let mut code_iter = code;
        for ch in out[start..].iter_mut().rev() {
            let entry = &self.inner[code_iter as usize];
            *ch = entry.byte;
            code_iter = entry.prefix;
        }
    }
}

impl Link {
    fn base(byte: u8) -> Self {
        Link {
            prefix: 0,
            byte,
            first: byte,
        }
    }

    fn derive(&self, prev: Code, byte: u8) -> Self {
        Link {
            prefix: prev,
            byte,
            first: self.first,
        }
    }
}
