//! Packed UTF-8 to glyph-offset lookup tables.
//!
//! A sorted set of code points is compiled into a position-independent byte
//! table: a bitmap-indexed trie over the UTF-8 encoding, one level per
//! encoded byte. Scanning text against the table yields, for every code
//! point, its glyph offset (its 1-based rank in the set) or 0 when absent.
//! Sizing, building and lookups never allocate.
//!
//! # Example
//!
//! ```
//! use utf8_lookup::{build_table, compute_table_size};
//!
//! let mut codepoints: Vec<u32> = "åäö¥".chars().map(u32::from).collect();
//! codepoints.sort_unstable();
//!
//! let mut buffer = vec![0u8; compute_table_size(&codepoints).unwrap()];
//! let table = build_table(&mut buffer, &codepoints).unwrap();
//!
//! let (consumed, results) = table.lookup("öx".as_bytes(), 16);
//! assert_eq!(consumed, 3);
//! assert_eq!(results[0].offset, 4);
//! assert_eq!(results[1].offset, 0);
//! ```

pub mod bench;
mod core;
mod errors;
mod lookup;
pub mod popcount;
mod table;

pub use crate::core::config::{CharsetConfig, CharsetRegistry, Settings};
pub use crate::core::octet::{
    MAX_CODEPOINT, MAX_OCTETS, OctetClass, Split, class_of_leading_byte, classify_and_split, encode_utf8,
    next_codepoint,
};
pub use errors::{CharsetNotFoundError, TableError};
pub use lookup::{LookupProgress, LookupResult, lookup};
pub use popcount::RankStrategy;
pub use table::{LookupTable, OwnedTable, TableStats, build_table, compute_table_size};

#[cfg(test)]
mod tests;
