use super::layout::{self, NodeKind, NodeVisitor, Walk};
use super::view::LookupTable;
use super::{BITMAP_BYTES, HEADER_SIZE, OFFSET_BYTES, table_size};
use crate::core::octet::MAX_OCTETS;
use crate::errors::TableError;

// Placeholders kept in the offset array until offsets are resolved.
const LEAF_MARK: u16 = 1;
const BRANCH_MARK: u16 = 2;

/// Write access to the node arrays of a table under construction.
struct NodeWriter<'b> {
    bitmaps: &'b mut [u8],
    offsets: &'b mut [u8],
}

impl NodeWriter<'_> {
    fn bits(&self, node: usize) -> u64 {
        let at = node * BITMAP_BYTES;
        let mut word = [0u8; BITMAP_BYTES];
        word.copy_from_slice(&self.bitmaps[at..at + BITMAP_BYTES]);
        u64::from_le_bytes(word)
    }

    fn set_bits(&mut self, node: usize, bits: u64) {
        let at = node * BITMAP_BYTES;
        self.bitmaps[at..at + BITMAP_BYTES].copy_from_slice(&bits.to_le_bytes());
    }

    fn offset(&self, node: usize) -> u16 {
        let at = node * OFFSET_BYTES;
        u16::from_le_bytes([self.offsets[at], self.offsets[at + 1]])
    }

    fn set_offset(&mut self, node: usize, offset: u16) {
        let at = node * OFFSET_BYTES;
        self.offsets[at..at + OFFSET_BYTES].copy_from_slice(&offset.to_le_bytes());
    }

    /// Replace the leaf/branch markers with real offsets.
    ///
    /// Leaves get consecutive glyph indices starting at 1, in node order, each
    /// consuming one index per set bit. Branches at a given level get
    /// consecutive child indices starting at the first node of the next
    /// level. Offsets are stored per node only; a bit's own index is the
    /// node offset plus its rank.
    fn resolve_offsets(&mut self, walk: &Walk) {
        let bounds = walk.level_bounds();
        let mut char_offset = 1usize;

        for level in 0..MAX_OCTETS {
            let mut group_offset = bounds[level + 1];

            for node in bounds[level]..bounds[level + 1] {
                let width = self.bits(node).count_ones() as usize;
                match self.offset(node) {
                    LEAF_MARK => {
                        self.set_offset(node, char_offset as u16);
                        char_offset += width;
                    }
                    BRANCH_MARK => {
                        self.set_offset(node, group_offset as u16);
                        group_offset += width;
                    }
                    _ => {}
                }
            }
        }
    }
}

impl NodeVisitor for NodeWriter<'_> {
    fn visit(&mut self, node: usize, bit: u32, kind: NodeKind) {
        let bits = self.bits(node) | (1u64 << bit);
        self.set_bits(node, bits);
        self.set_offset(
            node,
            match kind {
                NodeKind::Leaf => LEAF_MARK,
                NodeKind::Branch => BRANCH_MARK,
            },
        );
    }
}

/// Build a lookup table for `codepoints` into `buffer`.
///
/// `codepoints` must be sorted and free of duplicates. The buffer must be at
/// least [`compute_table_size`](super::compute_table_size) bytes; any extra
/// bytes are zeroed and are not part of the table. On success the written
/// bytes are frozen behind the returned read-only view. On error the buffer
/// contents are unspecified.
///
/// # Example
/// ```
/// use utf8_lookup::{build_table, compute_table_size};
///
/// let codepoints = [u32::from('\n'), u32::from('%')];
/// let mut buffer = vec![0u8; compute_table_size(&codepoints).unwrap()];
/// let table = build_table(&mut buffer, &codepoints).unwrap();
///
/// let (_, results) = table.lookup(b"%d", 16);
/// assert_eq!(results[0].offset, 2);
/// assert_eq!(results[1].offset, 0);
/// ```
pub fn build_table<'a>(buffer: &'a mut [u8], codepoints: &[u32]) -> Result<LookupTable<'a>, TableError> {
    let planned = layout::plan(codepoints)?;
    let item_count = planned.item_count();
    let required = table_size(item_count);

    if buffer.len() < required {
        return Err(TableError::BufferTooSmall {
            required,
            actual: buffer.len(),
        });
    }

    buffer.fill(0);
    buffer[..HEADER_SIZE].copy_from_slice(&(item_count as u64).to_le_bytes());

    {
        let nodes = &mut buffer[HEADER_SIZE..required];
        let (bitmaps, offsets) = nodes.split_at_mut(item_count * BITMAP_BYTES);
        let mut writer = NodeWriter { bitmaps, offsets };

        let written = layout::walk(codepoints, &mut writer)?;
        debug_assert_eq!(written, planned, "sizing and generation walks diverged");
        writer.resolve_offsets(&written);
    }

    tracing::debug!(
        codepoints = codepoints.len(),
        nodes = item_count,
        bytes = required,
        "built lookup table"
    );

    let frozen: &'a [u8] = buffer;
    Ok(LookupTable::from_parts(&frozen[..required], item_count))
}
