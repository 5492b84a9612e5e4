//! Packed lookup tables: layout, sizing, generation and the read-only view.
//!
//! Binary layout (little-endian):
//!
//! ```text
//! offset 0:             u64 item_count
//! offset 8:             u64 avail_bits[item_count]
//! offset 8 + 8*count:   u16 offsets[item_count]
//! ```
//!
//! Bitmaps and offsets are kept in separate arrays so the hot bitmap reads
//! stay dense in cache.

mod builder;
pub(crate) mod layout;
mod view;

pub use builder::build_table;
pub use view::{LookupTable, OwnedTable, TableStats};

use crate::errors::TableError;

pub(crate) const HEADER_SIZE: usize = 8;
pub(crate) const BITMAP_BYTES: usize = 8;
pub(crate) const OFFSET_BYTES: usize = 2;

/// Bytes needed for a table of `item_count` nodes.
#[inline]
pub(crate) const fn table_size(item_count: usize) -> usize {
    HEADER_SIZE + item_count * (BITMAP_BYTES + OFFSET_BYTES)
}

/// Exact number of bytes [`build_table`] needs for `codepoints`.
///
/// `codepoints` must be sorted and free of duplicates. Whenever this returns
/// `Ok`, building the same set into a buffer of that size succeeds.
///
/// # Example
/// ```
/// use utf8_lookup::compute_table_size;
///
/// // an empty set still carries the sink and the static first-byte nodes
/// assert_eq!(compute_table_size(&[]).unwrap(), 8 + 6 * 10);
/// ```
pub fn compute_table_size(codepoints: &[u32]) -> Result<usize, TableError> {
    let walk = layout::plan(codepoints)?;
    Ok(table_size(walk.item_count()))
}
