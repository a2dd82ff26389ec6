//! URI-safe LZ-string compression.
//!
//! Share tokens are the output of the `lz-string` JavaScript library's
//! `compressToEncodedURIComponent`, so links produced by the web builder and
//! by this crate are interchangeable. The format is an LZW variant over
//! UTF-16 code units, packed 6 bits per output character.
//!
//! ## Bit stream
//!
//! Codes are written least-significant bit first, but each output character
//! is filled most-significant bit first. Three codes are reserved:
//!
//! | Code | Meaning |
//! |---|---|
//! | `0` | next 8 bits are a new literal code unit |
//! | `1` | next 16 bits are a new literal code unit |
//! | `2` | end of stream |
//!
//! Code width starts at 2 bits and grows as the dictionary fills. After the
//! end-of-stream code the encoder pads with zero bits until exactly one more
//! character has been emitted, so a canonical token always ends there.
//!
//! ## Alphabet
//!
//! `A-Z a-z 0-9 + -`, one character per 6-bit value. None of these need
//! percent-encoding inside a query string value. Form decoders turn `+` into
//! a space, so decompression maps spaces back to `+` first.
//!
//! The JavaScript library lists a 65th character, `$`, that its encoder never
//! emits. Its decoder reads `$` as value 64, which only ever contributes
//! zero bits; here it is rejected like any other foreign character.
//!
//! ## Output limit
//!
//! A short token can expand enormously: each code may reference the longest
//! phrase so far, so output grows with the square of the token length.
//! Decompression stops with [`LzError::OutputLimit`] once the output would
//! exceed a bound ([`DEFAULT_MAX_OUTPUT_UNITS`] unless the caller picks one).
//! Dictionary phrases are kept as spans of the output, so memory stays linear
//! in the output size.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

const URI_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+-";

/// Decompression bound in UTF-16 code units (128 MiB of output).
pub const DEFAULT_MAX_OUTPUT_UNITS: usize = 64 * 1024 * 1024;

const BITS_PER_CHAR: u32 = 6;

/// Read mask for the first bit of a fresh character.
const RESET_MASK: u32 = 1 << (BITS_PER_CHAR - 1);

const CODE_LITERAL_8: u32 = 0;
const CODE_LITERAL_16: u32 = 1;
const CODE_END: u32 = 2;

#[derive(Error, Debug)]
pub enum LzError {
    #[error("empty input")]
    Empty,
    #[error("invalid character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },
    #[error("input ends before the end-of-stream marker")]
    Truncated,
    #[error("reference to unknown dictionary code {code}")]
    InvalidReference { code: usize },
    #[error("unexpected data after the end-of-stream marker")]
    TrailingData,
    #[error("decompressed data exceeds {limit} code units")]
    OutputLimit { limit: usize },
    #[error("decompressed data is not valid UTF-16: {0}")]
    Utf16(#[from] std::string::FromUtf16Error),
}

/// Whether `ch` belongs to the token alphabet.
pub fn is_token_char(ch: char) -> bool {
    ch.is_ascii() && URI_ALPHABET.contains(&(ch as u8))
}

/// Compress `input` into a URI-safe token.
pub fn compress_to_encoded_uri_component(input: &str) -> String {
    let mut compressor = Compressor::new();
    // Current phrase: its dictionary code, plus the code unit when the
    // phrase is a single character (only those can still be pending).
    let mut phrase: Option<(u32, Option<u16>)> = None;

    for unit in input.encode_utf16() {
        let unit_code = compressor.single_code(unit);
        phrase = match phrase {
            None => Some((unit_code, Some(unit))),
            Some((code, single)) => match compressor.phrases.get(&(code, unit)) {
                Some(&extended) => Some((extended, None)),
                None => {
                    compressor.emit(code, single);
                    let next = compressor.next_code();
                    compressor.phrases.insert((code, unit), next);
                    Some((unit_code, Some(unit)))
                }
            },
        };
    }

    if let Some((code, single)) = phrase {
        compressor.emit(code, single);
    }

    let width = compressor.num_bits;
    compressor.writer.write(CODE_END, width);
    compressor.writer.finish()
}

/// Decompress a token produced by [`compress_to_encoded_uri_component`].
///
/// Rejects characters outside the alphabet, streams without an end marker,
/// unknown dictionary references, non-zero padding or extra characters after
/// the end, and output beyond [`DEFAULT_MAX_OUTPUT_UNITS`].
pub fn decompress_from_encoded_uri_component(input: &str) -> Result<String, LzError> {
    decompress_with_limit(input, DEFAULT_MAX_OUTPUT_UNITS)
}

/// [`decompress_from_encoded_uri_component`] with an explicit bound on the
/// number of UTF-16 code units produced.
pub fn decompress_with_limit(input: &str, max_units: usize) -> Result<String, LzError> {
    if input.is_empty() {
        return Err(LzError::Empty);
    }

    let values = input
        .chars()
        .enumerate()
        .map(|(position, ch)| {
            let ch = if ch == ' ' { '+' } else { ch };
            char_value(ch).ok_or(LzError::InvalidCharacter { ch, position })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let units = decompress_values(&values, max_units)?;
    Ok(String::from_utf16(&units)?)
}

fn char_value(ch: char) -> Option<u8> {
    if !ch.is_ascii() {
        return None;
    }
    URI_ALPHABET
        .iter()
        .position(|&c| c == ch as u8)
        .map(|pos| pos as u8)
}

// ============================================================================
// Compression
// ============================================================================

struct Compressor {
    /// Code assigned to each single code unit seen so far.
    singles: HashMap<u16, u32>,
    /// Single code units whose literal has not been written yet.
    pending: HashSet<u16>,
    /// `(prefix code, next unit)` → code of the extended phrase.
    phrases: HashMap<(u32, u16), u32>,
    dict_size: u32,
    num_bits: u32,
    enlarge_in: u32,
    writer: BitWriter,
}

impl Compressor {
    fn new() -> Self {
        Self {
            singles: HashMap::new(),
            pending: HashSet::new(),
            phrases: HashMap::new(),
            dict_size: 3,
            num_bits: 2,
            // The first literal does not count towards widening.
            enlarge_in: 2,
            writer: BitWriter::default(),
        }
    }

    fn next_code(&mut self) -> u32 {
        let code = self.dict_size;
        self.dict_size += 1;
        code
    }

    fn single_code(&mut self, unit: u16) -> u32 {
        if let Some(&code) = self.singles.get(&unit) {
            return code;
        }
        let code = self.next_code();
        self.singles.insert(unit, code);
        self.pending.insert(unit);
        code
    }

    fn count_code(&mut self) {
        self.enlarge_in -= 1;
        if self.enlarge_in == 0 {
            self.enlarge_in = 1 << self.num_bits;
            self.num_bits += 1;
        }
    }

    /// Write the current phrase: a literal the first time a code unit is
    /// used, its dictionary code afterwards.
    fn emit(&mut self, code: u32, single: Option<u16>) {
        match single {
            Some(unit) if self.pending.remove(&unit) => {
                if unit < 256 {
                    self.writer.write(CODE_LITERAL_8, self.num_bits);
                    self.writer.write(u32::from(unit), 8);
                } else {
                    self.writer.write(CODE_LITERAL_16, self.num_bits);
                    self.writer.write(u32::from(unit), 16);
                }
                self.count_code();
            }
            _ => self.writer.write(code, self.num_bits),
        }
        self.count_code();
    }
}

#[derive(Default)]
struct BitWriter {
    out: String,
    val: u32,
    position: u32,
}

impl BitWriter {
    fn push_bit(&mut self, bit: u32) {
        self.val = (self.val << 1) | bit;
        if self.position == BITS_PER_CHAR - 1 {
            self.position = 0;
            self.out.push(URI_ALPHABET[self.val as usize] as char);
            self.val = 0;
        } else {
            self.position += 1;
        }
    }

    fn write(&mut self, mut value: u32, bits: u32) {
        for _ in 0..bits {
            self.push_bit(value & 1);
            value >>= 1;
        }
    }

    /// Pad with zero bits and emit exactly one final character.
    fn finish(mut self) -> String {
        loop {
            self.val <<= 1;
            if self.position == BITS_PER_CHAR - 1 {
                self.out.push(URI_ALPHABET[self.val as usize] as char);
                break;
            }
            self.position += 1;
        }
        self.out
    }
}

// ============================================================================
// Decompression
// ============================================================================

struct BitReader<'a> {
    values: &'a [u8],
    val: u32,
    mask: u32,
    /// Index of the next character to load; may run one past the end.
    index: usize,
}

impl<'a> BitReader<'a> {
    fn new(values: &'a [u8]) -> Self {
        Self {
            values,
            val: values.first().copied().map(u32::from).unwrap_or(0),
            mask: RESET_MASK,
            index: 1,
        }
    }

    fn read(&mut self, bits: u32) -> u32 {
        let mut result = 0;
        for power in 0..bits {
            let bit = self.val & self.mask;
            self.mask >>= 1;
            if self.mask == 0 {
                self.mask = RESET_MASK;
                self.val = self.values.get(self.index).copied().map(u32::from).unwrap_or(0);
                self.index += 1;
            }
            if bit != 0 {
                result |= 1 << power;
            }
        }
        result
    }

    fn exhausted(&self) -> bool {
        self.index > self.values.len()
    }

    /// After the end marker only zero padding may remain in the current
    /// character, and it must be the last one.
    fn finish(&self) -> Result<(), LzError> {
        if self.exhausted() {
            return Err(LzError::Truncated);
        }
        let unread = self.val & ((self.mask << 1) - 1);
        if self.index != self.values.len() || unread != 0 {
            return Err(LzError::TrailingData);
        }
        Ok(())
    }
}

/// A dictionary phrase, stored as the span of the output where it first
/// appeared.
#[derive(Clone, Copy, Default)]
struct Span {
    start: usize,
    len: usize,
}

impl Span {
    fn range(self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

fn ensure_room(result: &[u16], extra: usize, limit: usize) -> Result<(), LzError> {
    if result.len().saturating_add(extra) > limit {
        return Err(LzError::OutputLimit { limit });
    }
    Ok(())
}

fn decompress_values(values: &[u8], max_units: usize) -> Result<Vec<u16>, LzError> {
    let mut reader = BitReader::new(values);
    // Codes 0..=2 are reserved; their slots are never read.
    let mut dictionary: Vec<Span> = vec![Span::default(); 3];
    let mut enlarge_in: u32 = 4;
    let mut num_bits: u32 = 3;

    let first = match reader.read(2) {
        CODE_LITERAL_8 => reader.read(8) as u16,
        CODE_LITERAL_16 => reader.read(16) as u16,
        CODE_END => {
            reader.finish()?;
            return Ok(Vec::new());
        }
        code => {
            return Err(LzError::InvalidReference {
                code: code as usize,
            });
        }
    };

    let mut result: Vec<u16> = Vec::new();
    ensure_room(&result, 1, max_units)?;
    result.push(first);
    // Span of the most recent output; the next output always follows it.
    let mut previous = Span { start: 0, len: 1 };
    dictionary.push(previous);

    loop {
        if reader.exhausted() {
            return Err(LzError::Truncated);
        }

        let mut code = reader.read(num_bits) as usize;
        let mut literal = None;
        match code as u32 {
            CODE_LITERAL_8 | CODE_LITERAL_16 => {
                let width = if code as u32 == CODE_LITERAL_8 { 8 } else { 16 };
                literal = Some(reader.read(width) as u16);
                dictionary.push(Span {
                    start: result.len(),
                    len: 1,
                });
                code = dictionary.len() - 1;
                enlarge_in -= 1;
            }
            CODE_END => {
                reader.finish()?;
                return Ok(result);
            }
            _ => {}
        }

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }

        let start = result.len();
        let len = if let Some(unit) = literal {
            ensure_room(&result, 1, max_units)?;
            result.push(unit);
            1
        } else if code < dictionary.len() {
            let span = dictionary[code];
            ensure_room(&result, span.len, max_units)?;
            result.extend_from_within(span.range());
            span.len
        } else if code == dictionary.len() {
            // The phrase being defined: previous plus its own first unit.
            ensure_room(&result, previous.len + 1, max_units)?;
            result.extend_from_within(previous.range());
            let head = result[previous.start];
            result.push(head);
            previous.len + 1
        } else {
            return Err(LzError::InvalidReference { code });
        };

        // Previous plus the first unit of this output, which directly follows it.
        dictionary.push(Span {
            start: previous.start,
            len: previous.len + 1,
        });
        enlarge_in -= 1;

        previous = Span { start, len };

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }
    }
}
