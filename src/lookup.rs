//! Translating UTF-8 text into glyph offsets.
//!
//! Every code point walks the trie one byte at a time. A byte's payload bits
//! select a bit in the current node's bitmap; the number of set bits below it
//! (a popcount rank, as in a HAMT) picks the child node, or, on the last
//! byte, the glyph offset. A clear bit sends the walk to node 0, whose bitmap
//! is always empty, so the remaining bytes keep missing without a branch and
//! the result comes out as 0.

use crate::core::octet::{OctetClass, class_of_leading_byte};
use crate::popcount::{Native, Portable, Rank, RankStrategy, has_popcnt};
use crate::table::LookupTable;
use crate::table::layout::START_OFFSET;
use serde::Serialize;

/// Bits of the first byte that select the static node (only single-byte
/// sequences use more than one).
const GROUP_MASK: [u8; 4] = [127, 63, 63, 63];

/// Payload bits of the first byte per class; continuation bytes always use 63.
const GID_MASK: [u8; 4] = [63, 31, 15, 7];

/// One resolved code point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    /// Byte position in the input where the code point starts
    pub position: usize,
    /// Glyph offset, or 0 when the code point is not in the table
    pub offset: u32,
}

/// How far a lookup got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupProgress {
    /// Input bytes consumed; resume from here
    pub consumed: usize,
    /// Results written
    pub written: usize,
}

/// Resolve one complete UTF-8 sequence.
#[inline(always)]
fn resolve<R: Rank>(table: &LookupTable<'_>, class: OctetClass, seq: &[u8]) -> u32 {
    let mut node = START_OFFSET[class.index()] as u64;
    let mut group_mask = GROUP_MASK[class.index()];
    let mut gid_mask = GID_MASK[class.index()];

    for &byte in seq {
        let group = ((byte & group_mask) >> 6) as u64;
        let gid = byte & gid_mask;
        let check_bit = 1u64 << gid;

        group_mask = 63;
        gid_mask = 63;

        let index = (node + group) as usize;
        let bits = table.bits(index);
        let before = R::rank(bits, check_bit);

        node = if bits & check_bit != 0 {
            table.offset(index) as u64 + before
        } else {
            0
        };
    }
    node as u32
}

#[inline(always)]
fn lookup_impl<R: Rank>(
    table: &LookupTable<'_>,
    input: &[u8],
    results: &mut [LookupResult],
) -> LookupProgress {
    let mut pos = 0;
    let mut written = 0;

    while written < results.len() {
        let first = match input.get(pos) {
            Some(&b) if b != 0 => b,
            _ => break,
        };
        let class = class_of_leading_byte(first);
        // a sequence cut off by the end of the input is left for the next call
        let Some(seq) = input.get(pos..pos + class.len()) else {
            break;
        };

        results[written] = LookupResult {
            position: pos,
            offset: resolve::<R>(table, class, seq),
        };
        written += 1;
        pos += class.len();
    }

    LookupProgress {
        consumed: pos,
        written,
    }
}

fn lookup_portable(table: &LookupTable<'_>, input: &[u8], results: &mut [LookupResult]) -> LookupProgress {
    lookup_impl::<Portable>(table, input, results)
}

/// Same loop, compiled so `count_ones` lowers to POPCNT.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "popcnt")]
unsafe fn lookup_popcnt(table: &LookupTable<'_>, input: &[u8], results: &mut [LookupResult]) -> LookupProgress {
    lookup_impl::<Native>(table, input, results)
}

#[cfg(target_arch = "x86_64")]
fn lookup_hardware(table: &LookupTable<'_>, input: &[u8], results: &mut [LookupResult]) -> LookupProgress {
    if !has_popcnt() {
        return lookup_portable(table, input, results);
    }
    // SAFETY: has_popcnt() confirmed the CPU supports the popcnt feature
    unsafe { lookup_popcnt(table, input, results) }
}

#[cfg(not(target_arch = "x86_64"))]
fn lookup_hardware(table: &LookupTable<'_>, input: &[u8], results: &mut [LookupResult]) -> LookupProgress {
    if !has_popcnt() {
        return lookup_portable(table, input, results);
    }
    lookup_impl::<Native>(table, input, results)
}

/// Run the lookup loop with an explicit strategy.
///
/// A hardware request on a CPU without popcount falls back to the portable
/// loop.
pub(crate) fn lookup_with_strategy(
    strategy: RankStrategy,
    table: &LookupTable<'_>,
    input: &[u8],
    results: &mut [LookupResult],
) -> LookupProgress {
    match strategy {
        RankStrategy::Hardware => lookup_hardware(table, input, results),
        RankStrategy::Portable => lookup_portable(table, input, results),
    }
}

impl LookupTable<'_> {
    /// Resolve code points from `input` into `results` without allocating.
    ///
    /// Scanning stops at a NUL byte, at the end of `input`, before a sequence
    /// truncated by the end of `input`, or when `results` is full. Feed the
    /// remaining input (`&input[progress.consumed..]`) to continue.
    /// `input` is assumed to be well-formed UTF-8; malformed input yields
    /// meaningless offsets but never reads out of bounds.
    pub fn lookup_into(&self, input: &[u8], results: &mut [LookupResult]) -> LookupProgress {
        lookup_with_strategy(RankStrategy::active(), self, input, results)
    }

    /// Resolve up to `max_results` code points, returning the consumed byte
    /// count and the results.
    pub fn lookup(&self, input: &[u8], max_results: usize) -> (usize, Vec<LookupResult>) {
        let mut results = vec![LookupResult::default(); max_results.min(input.len())];
        let progress = self.lookup_into(input, &mut results);
        results.truncate(progress.written);
        (progress.consumed, results)
    }

    /// Glyph offset of a single code point, 0 when absent or out of range.
    pub fn offset_of(&self, codepoint: u32) -> u32 {
        let mut buf = [0u8; 4];
        match crate::core::octet::encode_utf8(codepoint, &mut buf) {
            Some(len) => resolve::<Native>(self, class_of_leading_byte(buf[0]), &buf[..len]),
            None => 0,
        }
    }
}

/// Resolve up to `max_results` code points of `input` against `table`.
///
/// Free-function form of [`LookupTable::lookup`].
pub fn lookup(table: &LookupTable<'_>, input: &[u8], max_results: usize) -> (usize, Vec<LookupResult>) {
    table.lookup(input, max_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::OwnedTable;

    fn offsets(results: &[LookupResult]) -> Vec<u32> {
        results.iter().map(|r| r.offset).collect()
    }

    #[test]
    fn test_positions_track_sequence_starts() {
        let owned = OwnedTable::from_chars("aå€𝄞".chars()).unwrap();
        let (consumed, results) = owned.table().lookup("aå€𝄞".as_bytes(), 16);
        assert_eq!(consumed, 10);
        let positions: Vec<usize> = results.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 1, 3, 6]);
        assert_eq!(offsets(&results), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stops_at_nul() {
        let owned = OwnedTable::from_chars("ab".chars()).unwrap();
        let (consumed, results) = owned.table().lookup(b"ab\0ab", 16);
        assert_eq!(consumed, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_resumes_after_capacity() {
        let owned = OwnedTable::from_chars("abc".chars()).unwrap();
        let table = owned.table();
        let input = "cba".as_bytes();
        let mut buf = [LookupResult::default(); 2];

        let first = table.lookup_into(input, &mut buf);
        assert_eq!(first, LookupProgress { consumed: 2, written: 2 });
        assert_eq!(offsets(&buf), vec![3, 2]);

        let second = table.lookup_into(&input[first.consumed..], &mut buf);
        assert_eq!(second, LookupProgress { consumed: 1, written: 1 });
        assert_eq!(buf[0].offset, 1);
    }

    #[test]
    fn test_truncated_sequence_is_left_unconsumed() {
        let owned = OwnedTable::from_chars("a€".chars()).unwrap();
        let bytes = "a€".as_bytes();
        let (consumed, results) = owned.table().lookup(&bytes[..3], 16);
        assert_eq!(consumed, 1);
        assert_eq!(offsets(&results), vec![1]);
    }

    #[test]
    fn test_zero_capacity() {
        let owned = OwnedTable::from_chars("a".chars()).unwrap();
        let mut buf: [LookupResult; 0] = [];
        let progress = owned.table().lookup_into(b"a", &mut buf);
        assert_eq!(progress, LookupProgress::default());
    }

    #[test]
    fn test_strategies_agree() {
        let owned = OwnedTable::from_chars("Grüße, 世界! 🦀 ÅÄÖ".chars()).unwrap();
        let table = owned.table();
        let input = "Grüße aus der Welt, 世界 und 🦀🦐 ÅÄÖ åäö".as_bytes();

        let mut portable = vec![LookupResult::default(); 64];
        let mut hardware = vec![LookupResult::default(); 64];
        let a = lookup_with_strategy(RankStrategy::Portable, &table, input, &mut portable);
        let b = lookup_with_strategy(RankStrategy::Hardware, &table, input, &mut hardware);
        assert_eq!(a, b);
        assert_eq!(portable, hardware);
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        let owned = OwnedTable::from_chars("aé".chars()).unwrap();
        // stray continuations count as single bytes, 0xFF as a four-byte lead
        let garbage = [0x80, 0xBF, 0xFF, 0xFE, 0xC3, 0xF8, 0x80, 0x80, 0x80];
        let (consumed, results) = owned.table().lookup(&garbage, 16);
        assert_eq!(consumed, garbage.len());
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.offset == 0));
    }

    #[test]
    fn test_offset_of() {
        let owned = OwnedTable::build(&[0, 0x41, 0x20AC]).unwrap();
        let table = owned.table();
        assert_eq!(table.offset_of(0), 1);
        assert_eq!(table.offset_of(0x41), 2);
        assert_eq!(table.offset_of(0x20AC), 3);
        assert_eq!(table.offset_of(0x20AD), 0);
        assert_eq!(table.offset_of(0x110000), 0);
    }
}
