//! UTF-8 octet classification shared by the table builder and the decoder.
//!
//! ```text
//! range             code point bits               utf8 bytes
//! 0 - 7F            0xxxxxxx                      0xxxxxxx
//! 80 - 7FF          00000yyy yyxxxxxx             110yyyyy 10xxxxxx
//! 800 - FFFF        zzzzyyyy yyxxxxxx             1110zzzz 10yyyyyy 10xxxxxx
//! 10000 - 10FFFF    000wwwzz zzzzyyyy yyxxxxxx    11110www 10zzzzzz 10yyyyyy 10xxxxxx
//! ```
//!
//! A code point is split into the payload groups carried by each byte, most
//! significant first. Group 0 holds `7 - class` bits, every later group 6.

use crate::errors::TableError;

/// Highest valid Unicode scalar value.
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Maximum number of bytes in one UTF-8 sequence.
pub const MAX_OCTETS: usize = 4;

/// How many bytes a code point occupies in UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OctetClass {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
}

impl OctetClass {
    pub const ALL: [OctetClass; MAX_OCTETS] = [
        OctetClass::One,
        OctetClass::Two,
        OctetClass::Three,
        OctetClass::Four,
    ];

    /// Class index, 0..=3.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Encoded length in bytes, 1..=4.
    #[inline]
    pub const fn len(self) -> usize {
        self as usize + 1
    }

    /// Class of a code point, or `None` above U+10FFFF.
    #[inline]
    pub const fn of(codepoint: u32) -> Option<Self> {
        match codepoint {
            0..=0x7F => Some(OctetClass::One),
            0x80..=0x7FF => Some(OctetClass::Two),
            0x800..=0xFFFF => Some(OctetClass::Three),
            0x10000..=MAX_CODEPOINT => Some(OctetClass::Four),
            _ => None,
        }
    }

    #[inline]
    const fn from_index(index: u8) -> Self {
        match index {
            0 => OctetClass::One,
            1 => OctetClass::Two,
            2 => OctetClass::Three,
            _ => OctetClass::Four,
        }
    }
}

/// A code point split into its per-byte payload groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    class: OctetClass,
    groups: [u32; MAX_OCTETS],
}

impl Split {
    #[inline]
    pub fn class(&self) -> OctetClass {
        self.class
    }

    /// All four groups; entries past `class.index()` are zero.
    #[inline]
    pub fn groups(&self) -> &[u32; MAX_OCTETS] {
        &self.groups
    }

    #[inline]
    pub fn group(&self, position: usize) -> u32 {
        self.groups[position]
    }
}

/// Classify a code point by octet length and split it into payload groups.
///
/// # Example
/// ```
/// use utf8_lookup::{OctetClass, classify_and_split};
///
/// let split = classify_and_split(0x20AC).unwrap(); // €
/// assert_eq!(split.class(), OctetClass::Three);
/// assert_eq!(split.groups(), &[0x2, 0x2, 0x2C, 0]);
/// ```
pub fn classify_and_split(codepoint: u32) -> Result<Split, TableError> {
    let cp = codepoint;
    let (class, groups) = match OctetClass::of(cp) {
        Some(OctetClass::One) => (OctetClass::One, [cp, 0, 0, 0]),
        Some(OctetClass::Two) => (OctetClass::Two, [cp >> 6, cp & 63, 0, 0]),
        Some(OctetClass::Three) => (
            OctetClass::Three,
            [(cp >> 12) & 15, (cp >> 6) & 63, cp & 63, 0],
        ),
        Some(OctetClass::Four) => (
            OctetClass::Four,
            [(cp >> 18) & 7, (cp >> 12) & 63, (cp >> 6) & 63, cp & 63],
        ),
        None => {
            return Err(TableError::InvalidCodePoint {
                codepoint,
                index: 0,
            });
        }
    };
    Ok(Split { class, groups })
}

/// Octet class index for every possible leading byte.
///
/// Continuation bytes (0x80..=0xBF) read as single-byte sequences and
/// 0xF8..=0xFF as four-byte ones, so malformed input stays inside the table.
static LEADING_BYTE_CLASS: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0xC0;
    while i < 256 {
        table[i] = if i < 0xE0 {
            1
        } else if i < 0xF0 {
            2
        } else {
            3
        };
        i += 1;
    }
    table
};

/// Octet class of a sequence, judged from its leading byte alone.
#[inline]
pub fn class_of_leading_byte(byte: u8) -> OctetClass {
    OctetClass::from_index(LEADING_BYTE_CLASS[byte as usize])
}

/// Encode one code point as UTF-8 into `out`, returning the byte count.
///
/// Surrogates are encoded like any other three-byte value. Returns `None`
/// above U+10FFFF.
pub fn encode_utf8(codepoint: u32, out: &mut [u8; MAX_OCTETS]) -> Option<usize> {
    let split = classify_and_split(codepoint).ok()?;
    let g = split.groups();
    match split.class() {
        OctetClass::One => {
            out[0] = g[0] as u8;
        }
        OctetClass::Two => {
            out[0] = 0xC0 | g[0] as u8;
            out[1] = 0x80 | g[1] as u8;
        }
        OctetClass::Three => {
            out[0] = 0xE0 | g[0] as u8;
            out[1] = 0x80 | g[1] as u8;
            out[2] = 0x80 | g[2] as u8;
        }
        OctetClass::Four => {
            out[0] = 0xF0 | g[0] as u8;
            out[1] = 0x80 | g[1] as u8;
            out[2] = 0x80 | g[2] as u8;
            out[3] = 0x80 | g[3] as u8;
        }
    }
    Some(split.class().len())
}

/// Decode the first code point of well-formed UTF-8.
///
/// Returns the code point and its encoded length, or `None` when `bytes` is
/// empty or ends inside the sequence. No validation beyond that.
pub fn next_codepoint(bytes: &[u8]) -> Option<(u32, usize)> {
    let first = *bytes.first()?;
    let class = class_of_leading_byte(first);
    let len = class.len();
    let seq = bytes.get(..len)?;

    let lead_mask: u8 = match class {
        OctetClass::One => 0x7F,
        OctetClass::Two => 0x1F,
        OctetClass::Three => 0x0F,
        OctetClass::Four => 0x07,
    };
    let cp = seq[1..]
        .iter()
        .fold((first & lead_mask) as u32, |acc, b| (acc << 6) | (b & 0x3F) as u32);
    Some((cp, len))
}
