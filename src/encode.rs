//! A module for all encoding needs.
use crate::bits::{BitPacker, CodeSink};
use crate::error::LzwError;
use crate::header::Header;
use crate::{Code, CLEAR_CODE, END_CODE, FIRST_FREE_CODE, MIN_CODESIZE};

/// The configuration of an encoding pass.
///
/// Every call builds and discards its own dictionary, so one encoder can be shared freely. The
/// default allows codes of up to 16 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Encoder {
    header: Header,
}

struct EncodeState<S: CodeSink> {
    /// The configured maximum code size.
    max_bits: u8,
    /// The current encoding symbol tree.
    tree: Tree,
    /// The size of the next code to emit.
    code_size: u8,
    /// The code corresponding to the currently read characters, `None` before the first one.
    current_code: Option<Code>,
    /// Where the emitted codes go.
    sink: S,
}

/// One tree node for at most each code.
/// To avoid using too much memory we keep nodes with few successors in optimized form. This form
/// doesn't offer lookup by indexing but instead does a linear search.
#[derive(Default)]
struct Tree {
    simples: Vec<Simple>,
    complex: Vec<Full>,
    keys: Vec<Successors>,
}

#[derive(Clone, Copy)]
enum Successors {
    NoSuccessor,
    Simple(u32),
    Full(u32),
}

const SHORT: usize = 16;

/// Marks a character without continuation in a `Full` node.
const NO_CODE: Code = Code::MAX;

#[derive(Clone, Copy, Default)]
struct Simple {
    codes: [Code; SHORT],
    chars: [u8; SHORT],
    count: u8,
}

#[derive(Clone, Copy)]
struct Full {
    char_continuation: [Code; 256],
}

impl Encoder {
    pub fn new(max_bits: u8) -> Result<Self, LzwError> {
        Ok(Encoder {
            header: Header::new(max_bits)?,
        })
    }

    pub fn max_bits(&self) -> u8 {
        self.header.max_bits()
    }

    /// Encode `data` into a complete stream, header included.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        let packer = self.run(data, BitPacker::with_prefix(&self.header.to_bytes()))?;
        let out = packer.finish();
        tracing::debug!(
            input = data.len(),
            output = out.len(),
            max_bits = self.max_bits(),
            "encoded compress stream"
        );
        Ok(out)
    }

    /// Encode `data` into the sequence of codes, before packing.
    ///
    /// The sequence starts with the clear code and ends with the end code.
    pub fn encode_codes(&self, data: &[u8]) -> Result<Vec<Code>, LzwError> {
        self.run(data, Vec::new())
    }

    fn run<S: CodeSink>(&self, data: &[u8], sink: S) -> Result<S, LzwError> {
        let mut state = EncodeState::new(self.max_bits(), sink);
        state.advance(data)?;
        Ok(state.finish())
    }
}

impl<S: CodeSink> EncodeState<S> {
    fn new(max_bits: u8, mut sink: S) -> Self {
        sink.push_code(CLEAR_CODE, MIN_CODESIZE);
        EncodeState {
            max_bits,
            tree: Tree::new(),
            code_size: MIN_CODESIZE,
            current_code: None,
            sink,
        }
    }

    fn advance(&mut self, inp: &[u8]) -> Result<(), LzwError> {
        for (offset, &byte) in inp.iter().enumerate() {
            let current = match self.current_code {
                Some(code) => code,
                None => {
                    self.current_code = Some(Code::from(byte));
                    continue;
                }
            };

            match self.tree.at_key(current, byte) {
                Some(code) => self.current_code = Some(code),
                None => {
                    self.sink.push_code(current, self.code_size);
                    self.grow(current, byte, offset)?;
                    self.current_code = Some(Code::from(byte));
                }
            }
        }

        Ok(())
    }

    fn finish(mut self) -> S {
        if let Some(code) = self.current_code.take() {
            self.sink.push_code(code, self.code_size);

            // When reading this code, the decoder will add an extra entry to its table before
            // reading the end code. Thusly, it may increase its code size based on this
            // additional entry.
            self.bump_code_size(self.tree.next_code() + 1);
        }

        self.sink.push_code(END_CODE, self.code_size);
        self.sink
    }

    fn grow(&mut self, code: Code, byte: u8, offset: usize) -> Result<(), LzwError> {
        if self.tree.next_code() >> self.max_bits != 0 {
            return Err(LzwError::Capacity {
                max_bits: self.max_bits,
                offset,
            });
        }

        self.tree.append(code, byte);
        self.bump_code_size(self.tree.next_code());
        Ok(())
    }

    fn bump_code_size(&mut self, population: Code) {
        if population >= 1 << self.code_size && self.code_size < self.max_bits {
            self.code_size += 1;
            tracing::trace!(code_size = self.code_size, population, "code size increased");
        }
    }
}

impl Tree {
    fn new() -> Self {
        let mut tree = Tree::default();
        // Single bytes and the two reserved codes start without successors.
        tree.keys.resize(FIRST_FREE_CODE as usize, Successors::NoSuccessor);
        tree
    }

    fn next_code(&self) -> Code {
        self.keys.len() as Code
    }

    fn at_key(&self, code: Code, ch: u8) -> Option<Code> {
        let key = self.keys[code as usize];
        match key {
            Successors::NoSuccessor => None,
            Successors::Simple(idx) => {
                let nexts = &self.simples[idx as usize];
                let successors = nexts
                    .codes
                    .iter()
                    .zip(nexts.chars.iter())
                    .take(usize::from(nexts.count));
                for (&scode, &sch) in successors {
                    if sch == ch {
                        return Some(scode);
                    }
                }

                None
            }
            Successors::Full(idx) => {
                let full = &self.complex[idx as usize];
                match full.char_continuation[usize::from(ch)] {
                    NO_CODE => None,
                    precode => Some(precode),
                }
            }
        }
    }

    /// Assign the next code to the string of `code` extended by `ch`.
    fn append(&mut self, code: Code, ch: u8) -> Code {
        let next = self.next_code();
        debug_assert!(self.at_key(code, ch).is_none());
        let key = self.keys[code as usize];
        match key {
            Successors::NoSuccessor => {
                let new_key = Successors::Simple(self.simples.len() as u32);
                let mut simple = Simple::default();
                simple.codes[0] = next;
                simple.chars[0] = ch;
                simple.count = 1;
                self.simples.push(simple);
                self.keys[code as usize] = new_key;
            }
            Successors::Simple(idx) if usize::from(self.simples[idx as usize].count) < SHORT => {
                let nexts = &mut self.simples[idx as usize];
                let nidx = usize::from(nexts.count);
                nexts.chars[nidx] = ch;
                nexts.codes[nidx] = next;
                nexts.count += 1;
            }
            Successors::Simple(idx) => {
                let new_key = Successors::Full(self.complex.len() as u32);
                let simple = &self.simples[idx as usize];
                let mut full = Full {
                    char_continuation: [NO_CODE; 256],
                };
                for (&pch, &pcont) in simple.chars.iter().zip(simple.codes.iter()) {
                    full.char_continuation[usize::from(pch)] = pcont;
                }
                full.char_continuation[usize::from(ch)] = next;
                self.complex.push(full);
                self.keys[code as usize] = new_key;
            }
            Successors::Full(idx) => {
                let full = &mut self.complex[idx as usize];
                full.char_continuation[usize::from(ch)] = next;
            }
        }
        self.keys.push(Successors::NoSuccessor);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::{CodeSink, Encoder, Tree, SHORT};
    use crate::error::LzwError;
    use crate::{Code, CLEAR_CODE, END_CODE};

    /// Records each code with the width it would be packed at.
    #[derive(Default)]
    struct Recorder(Vec<(Code, u8)>);

    impl CodeSink for Recorder {
        fn push_code(&mut self, code: Code, code_size: u8) {
            self.0.push((code, code_size));
        }
    }

    fn record(max_bits: u8, data: &[u8]) -> Vec<(Code, u8)> {
        let encoder = Encoder::new(max_bits).unwrap();
        encoder.run(data, Recorder::default()).unwrap().0
    }

    #[test]
    fn empty_input() {
        let codes = Encoder::default().encode_codes(b"").unwrap();
        assert_eq!(codes, [CLEAR_CODE, END_CODE]);
    }

    #[test]
    fn single_byte() {
        let codes = Encoder::default().encode_codes(b"x").unwrap();
        assert_eq!(codes, [CLEAR_CODE, 120, END_CODE]);
    }

    #[test]
    fn repeated_byte_reuses_entries() {
        let codes = Encoder::default().encode_codes(b"aaaaaaaaaa").unwrap();
        // "a", "aa", "aaa", "aaaa"
        assert_eq!(codes, [CLEAR_CODE, 97, 258, 259, 260, END_CODE]);
    }

    #[test]
    fn classic_sequence() {
        let codes = Encoder::default()
            .encode_codes(b"TOBEORNOTTOBEORTOBEORNOT")
            .unwrap();
        assert_eq!(
            codes,
            [
                CLEAR_CODE, 84, 79, 66, 69, 79, 82, 78, 79, 84, 258, 260, 262, 267, 261, 263, 265,
                END_CODE
            ]
        );
    }

    #[test]
    fn code_size_grows_at_power_of_two() {
        let data: Vec<u8> = (0..600).map(|i| i as u8).collect();
        let codes = record(16, &data);
        assert_eq!(codes.len(), 430);

        // After emitting byte 253 the dictionary holds 512 codes.
        assert_eq!(codes[254], (253, 9));
        assert_eq!(codes[255], (254, 10));
        assert_eq!(codes[codes.len() - 1], (END_CODE, 10));

        let sizes: Vec<u8> = codes.iter().map(|&(_, size)| size).collect();
        assert!(sizes.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 1));
        assert!(codes.iter().all(|&(code, size)| code >> size == 0));
    }

    #[test]
    fn code_size_is_capped() {
        let data: Vec<u8> = (0..255).collect();
        let codes = record(9, &data);
        assert_eq!(codes.len(), 257);
        assert!(codes.iter().all(|&(_, size)| size == 9));
    }

    #[test]
    fn capacity_exhausted() {
        // 256 distinct bytes need 255 new entries, one more than 9 bits allow.
        let data: Vec<u8> = (0..=255).collect();
        let err = Encoder::new(9).unwrap().encode(&data).unwrap_err();
        assert_eq!(err, LzwError::Capacity { max_bits: 9, offset: 255 });

        assert!(Encoder::new(10).unwrap().encode(&data).is_ok());
    }

    #[test]
    fn invalid_max_bits_rejected() {
        assert_eq!(Encoder::new(8), Err(LzwError::InvalidMaxBits(8)));
        assert_eq!(Encoder::new(17), Err(LzwError::InvalidMaxBits(17)));
        assert_eq!(Encoder::default().max_bits(), 16);
    }

    #[test]
    fn header_precedes_codes() {
        let out = Encoder::new(12).unwrap().encode(b"").unwrap();
        // Clear and end code, 9 bits each.
        assert_eq!(out, [0x1f, 0x9d, 12, 0x00, 0x03, 0x02]);
    }

    #[test]
    fn tree_promotes_crowded_nodes() {
        let mut tree = Tree::new();
        let chars: Vec<u8> = (0..SHORT as u8 + 4).map(|i| b'0' + i).collect();
        let codes: Vec<Code> = chars.iter().map(|&ch| tree.append(u32::from(b'a'), ch)).collect();

        for (&ch, &code) in chars.iter().zip(&codes) {
            assert_eq!(tree.at_key(u32::from(b'a'), ch), Some(code));
        }
        assert_eq!(tree.at_key(u32::from(b'a'), b'a'), None);
        assert_eq!(tree.next_code(), 258 + chars.len() as Code);
    }
}
