use super::layout::{FIRST_DYNAMIC_NODE, MAX_NODES, START_OFFSET};
use super::{BITMAP_BYTES, HEADER_SIZE, OFFSET_BYTES, build_table, compute_table_size, table_size};
use crate::core::octet::OctetClass;
use crate::errors::TableError;
use serde::Serialize;

/// Read-only view of a packed lookup table.
///
/// Produced by [`build_table`] or parsed with [`LookupTable::from_bytes`].
/// There is no way to mutate a table through the view; tables are shared
/// freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct LookupTable<'a> {
    bytes: &'a [u8],
    bitmaps: &'a [u8],
    offsets: &'a [u8],
    item_count: usize,
}

impl<'a> LookupTable<'a> {
    /// Split validated table bytes into their node arrays.
    pub(crate) fn from_parts(bytes: &'a [u8], item_count: usize) -> Self {
        let nodes = &bytes[HEADER_SIZE..];
        let (bitmaps, offsets) = nodes.split_at(item_count * BITMAP_BYTES);
        Self {
            bytes,
            bitmaps,
            offsets,
            item_count,
        }
    }

    /// Interpret `bytes` as a table, checking the header against the length.
    ///
    /// Trailing bytes past the table are ignored.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, TableError> {
        let header: [u8; HEADER_SIZE] = bytes
            .get(..HEADER_SIZE)
            .and_then(|h| h.try_into().ok())
            .ok_or_else(|| TableError::malformed(format!("{} bytes is shorter than the header", bytes.len())))?;

        let count = u64::from_le_bytes(header);
        if count < FIRST_DYNAMIC_NODE as u64 || count > MAX_NODES as u64 {
            return Err(TableError::malformed(format!(
                "item count {} outside {}..={}",
                count, FIRST_DYNAMIC_NODE, MAX_NODES
            )));
        }

        let item_count = count as usize;
        let required = table_size(item_count);
        if bytes.len() < required {
            return Err(TableError::malformed(format!(
                "{} nodes need {} bytes, got {}",
                item_count,
                required,
                bytes.len()
            )));
        }

        let table = Self::from_parts(&bytes[..required], item_count);
        if table.bits(0) != 0 || table.offset(0) != 0 {
            return Err(TableError::malformed("node 0 is not the empty sink"));
        }
        Ok(table)
    }

    /// Number of nodes, the sink and static nodes included.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// The table's bytes, exactly as long as the table.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Availability bitmap of `node`; out-of-range nodes read as the sink.
    #[inline]
    pub fn bits(&self, node: usize) -> u64 {
        let at = node * BITMAP_BYTES;
        self.bitmaps
            .get(at..at + BITMAP_BYTES)
            .and_then(|b| <[u8; BITMAP_BYTES]>::try_from(b).ok())
            .map_or(0, u64::from_le_bytes)
    }

    /// Offset of `node`; out-of-range nodes read as the sink.
    #[inline]
    pub fn offset(&self, node: usize) -> u16 {
        let at = node * OFFSET_BYTES;
        self.offsets
            .get(at..at + OFFSET_BYTES)
            .map_or(0, |b| u16::from_le_bytes([b[0], b[1]]))
    }

    /// Every code point in the table with its glyph offset, ascending.
    ///
    /// Recovered by walking the trie, so it reflects exactly what lookups
    /// will resolve.
    pub fn entries(&self) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for class in OctetClass::ALL {
            // single-byte code points spread over two static nodes
            let first_nodes = if class == OctetClass::One { 2 } else { 1 };
            for group in 0..first_nodes {
                let node = START_OFFSET[class.index()] + group;
                self.collect(node, class, 0, (group as u32) << 6, &mut out);
            }
        }
        out
    }

    fn collect(&self, node: usize, class: OctetClass, depth: usize, prefix: u32, out: &mut Vec<(u32, u32)>) {
        let bits = self.bits(node);
        let base = self.offset(node) as u32;
        let mut rank = 0;

        for bit in 0..64u32 {
            if bits & (1u64 << bit) == 0 {
                continue;
            }
            let value = if depth == 0 { prefix | bit } else { (prefix << 6) | bit };
            if depth == class.index() {
                out.push((value, base + rank));
            } else {
                self.collect((base + rank) as usize, class, depth + 1, value, out);
            }
            rank += 1;
        }
    }

    /// Summary numbers for reporting.
    pub fn stats(&self) -> TableStats {
        let populated_nodes = (0..self.item_count).filter(|&n| self.bits(n) != 0).count();
        TableStats {
            item_count: self.item_count,
            byte_len: self.bytes.len(),
            populated_nodes,
            codepoints: self.entries().len(),
        }
    }
}

/// Size and occupancy of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub item_count: usize,
    pub byte_len: usize,
    pub populated_nodes: usize,
    pub codepoints: usize,
}

/// A lookup table that owns its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTable {
    bytes: Vec<u8>,
    item_count: usize,
}

impl OwnedTable {
    /// Allocate an exactly sized buffer and build `codepoints` into it.
    pub fn build(codepoints: &[u32]) -> Result<Self, TableError> {
        let mut bytes = vec![0u8; compute_table_size(codepoints)?];
        let item_count = build_table(&mut bytes, codepoints)?.item_count();
        Ok(Self { bytes, item_count })
    }

    /// Build a table for any collection of chars, sorting and deduplicating.
    ///
    /// # Example
    /// ```
    /// use utf8_lookup::OwnedTable;
    ///
    /// let table = OwnedTable::from_chars("hello wörld".chars()).unwrap();
    /// // ' ' d e h l o r w ö
    /// assert_eq!(table.table().offset_of('ö' as u32), 9);
    /// ```
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Result<Self, TableError> {
        let mut codepoints: Vec<u32> = chars.into_iter().map(u32::from).collect();
        codepoints.sort_unstable();
        codepoints.dedup();
        Self::build(&codepoints)
    }

    /// Take ownership of serialized table bytes, validating them first.
    pub fn from_bytes(mut bytes: Vec<u8>) -> Result<Self, TableError> {
        let item_count = LookupTable::from_bytes(&bytes)?.item_count();
        bytes.truncate(table_size(item_count));
        Ok(Self { bytes, item_count })
    }

    /// Borrow the read-only view.
    #[inline]
    pub fn table(&self) -> LookupTable<'_> {
        LookupTable::from_parts(&self.bytes, self.item_count)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
