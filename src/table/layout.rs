//! The grouping walk shared by table sizing and table generation.
//!
//! Both passes run the exact same walk; only the visitor differs. The
//! sizing pass ignores the visits and keeps the node count, the generation
//! pass writes bits and markers. Because the node-creation decisions come
//! from one function, the two passes cannot disagree on count, order or
//! grouping.

use crate::core::octet::{MAX_OCTETS, OctetClass, classify_and_split};
use crate::errors::TableError;

/// First node of each octet class's first-byte lookup.
///
/// Single-byte code points carry 7 payload bits in their only byte, one more
/// than fits a 64-bit bitmap, so they take two nodes (1 and 2). Every other
/// class takes one.
pub(crate) const START_OFFSET: [usize; MAX_OCTETS] = [1, 3, 4, 5];

/// Nodes 0..FIRST_DYNAMIC_NODE are always present: the sink plus the
/// static first-byte nodes.
pub(crate) const FIRST_DYNAMIC_NODE: usize = 6;

/// Largest number of code points a table can address with u16 offsets.
pub(crate) const MAX_CODEPOINTS: usize = u16::MAX as usize;

/// Largest node count a table can address with u16 offsets.
pub(crate) const MAX_NODES: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// Set bits are code points; the offset is a glyph index
    Leaf,
    /// Set bits are next-byte values; the offset is a child node index
    Branch,
}

/// Receives every (node, bit) decision the walk makes.
pub(crate) trait NodeVisitor {
    fn visit(&mut self, node: usize, bit: u32, kind: NodeKind);
}

/// The sizing pass only needs the walk's summary.
impl NodeVisitor for () {
    #[inline]
    fn visit(&mut self, _node: usize, _bit: u32, _kind: NodeKind) {}
}

/// Summary of one walk over a code point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Walk {
    /// Highest node index created
    pub last_node: usize,
    /// First node touched at each byte position
    pub level_start: [Option<usize>; MAX_OCTETS],
}

impl Walk {
    /// Nodes in the table: every index the walk touched, and never fewer
    /// than the static region, since a lookup may start at any static node
    /// whatever the set contains.
    pub fn item_count(&self) -> usize {
        (self.last_node + 1).max(FIRST_DYNAMIC_NODE)
    }

    /// Node ranges per byte position: level `i` owns `bounds[i]..bounds[i + 1]`.
    ///
    /// Levels the walk never reached borrow the start of the next populated
    /// level, which leaves them empty.
    pub fn level_bounds(&self) -> [usize; MAX_OCTETS + 1] {
        let mut bounds = [0; MAX_OCTETS + 1];
        let mut next_start = self.last_node + 1;
        bounds[MAX_OCTETS] = next_start;
        for level in (0..MAX_OCTETS).rev() {
            if let Some(start) = self.level_start[level] {
                next_start = start;
            }
            bounds[level] = next_start;
        }
        bounds
    }
}

/// Check the code point set precondition: in range, strictly increasing.
pub(crate) fn validate(codepoints: &[u32]) -> Result<(), TableError> {
    for (index, &codepoint) in codepoints.iter().enumerate() {
        if OctetClass::of(codepoint).is_none() {
            return Err(TableError::InvalidCodePoint { codepoint, index });
        }
        if index > 0 && codepoints[index - 1] >= codepoint {
            return Err(TableError::UnsortedCodePoints { index });
        }
    }
    Ok(())
}

/// Walk a sorted code point set octet by octet, reporting node decisions.
///
/// Position 0 lands in the static region. At later positions a new node is
/// opened whenever the groups before the current position, or the octet
/// class, differ from those of the code point that opened the current node.
/// Code points whose last byte sits at the current position are consumed
/// and skipped by the following passes.
pub(crate) fn walk<V: NodeVisitor>(codepoints: &[u32], visitor: &mut V) -> Result<Walk, TableError> {
    validate(codepoints)?;

    let mut start = 0;
    let mut node = 0;
    let mut level_start = [None; MAX_OCTETS];
    let mut last_class: Option<OctetClass> = None;

    for level in 0..MAX_OCTETS {
        let mut node_prefix: Option<[u32; MAX_OCTETS]> = None;

        for &codepoint in &codepoints[start..] {
            let split = classify_and_split(codepoint)?;
            let class = split.class();

            if level == 0 {
                node = START_OFFSET[class.index()] + (split.group(0) >> 6) as usize;
            } else {
                node = node.max(FIRST_DYNAMIC_NODE - 1);

                let prefix = &split.groups()[..level];
                let same_parent = node_prefix.is_some_and(|p| &p[..level] == prefix);
                if !same_parent || last_class != Some(class) {
                    node += 1;
                    node_prefix = Some(*split.groups());
                }
            }
            last_class = Some(class);

            if level_start[level].is_none() {
                level_start[level] = Some(node);
            }

            let kind = if class.index() == level {
                start += 1;
                NodeKind::Leaf
            } else {
                NodeKind::Branch
            };
            visitor.visit(node, split.group(level) & 63, kind);
        }
    }

    Ok(Walk {
        last_node: node,
        level_start,
    })
}

/// Walk the set and check it fits the 16-bit offset range.
pub(crate) fn plan(codepoints: &[u32]) -> Result<Walk, TableError> {
    if codepoints.len() > MAX_CODEPOINTS {
        return Err(TableError::TooManyCodePoints {
            count: codepoints.len(),
        });
    }
    let walk = walk(codepoints, &mut ())?;
    // distinct prefixes of U+0000..=U+10FFFF stay near 17.7k nodes; this only
    // trips if the node layout ever grows
    if walk.item_count() > MAX_NODES {
        return Err(TableError::TooManyNodes {
            count: walk.item_count(),
        });
    }
    Ok(walk)
}
