//! Huffman code tree construction and serialization.
//!
//! The tree is strictly binary (every internal node has exactly two
//! children) and exclusively owned by one compress or decompress call; no
//! node is ever aliased after construction completes.
//!
//! ## Serialized Form
//!
//! Preorder traversal, one marker byte per node:
//!
//! ```text
//! 0x01 <byte>   leaf holding one symbol
//! 0x00          internal node, followed by its left then right subtree
//! ```
//!
//! A tree over at most 256 symbols has at most 511 nodes, so the
//! serialization never exceeds [`MAX_TREE_BYTES`]. Decoding enforces that
//! bound before recursing, which also caps recursion depth.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{CodecError, Result};

/// Marker byte for a leaf node.
const LEAF_MARKER: u8 = 0x01;

/// Marker byte for an internal node.
const INTERNAL_MARKER: u8 = 0x00;

/// Largest legal tree serialization: 256 leaves (2 bytes each) plus 255
/// internal nodes (1 byte each).
pub const MAX_TREE_BYTES: usize = 256 * 2 + 255;

/// Occurrence counts for every byte value in one input.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    /// Count symbol frequencies over `data`.
    pub fn build(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self { counts }
    }

    /// Occurrence count for one byte value.
    pub fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Number of distinct byte values present.
    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Iterate over `(byte, count)` pairs with nonzero counts, in
    /// ascending byte order.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(b, &c)| (b as u8, c))
    }
}

/// One node of the code tree.
#[derive(Debug, PartialEq, Eq)]
enum Node {
    /// Terminal node holding exactly one byte value.
    Leaf(u8),
    /// Internal node with exactly two children.
    Internal(Box<Node>, Box<Node>),
}

/// Entry in the build queue. Ordered by frequency, with the insertion
/// sequence number as a deterministic tie-break.
struct QueueEntry {
    freq: u64,
    seq: u32,
    node: Node,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.freq, self.seq).cmp(&(other.freq, other.seq))
    }
}

/// Per-symbol variable-length bit codes derived from a [`CodeTree`].
///
/// Codes are prefix-free by construction: symbols live only at leaves.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: Vec<Option<Vec<u8>>>,
}

impl CodeTable {
    /// The code for one byte value, as a slice of 0/1 bits, or `None` if
    /// the symbol was absent from the source input.
    pub fn code(&self, byte: u8) -> Option<&[u8]> {
        self.codes[byte as usize].as_deref()
    }
}

/// An owned Huffman code tree for one compress or decompress call.
#[derive(Debug, PartialEq, Eq)]
pub struct CodeTree {
    root: Node,
}

impl CodeTree {
    /// Build the tree for `freq` by repeatedly merging the two
    /// lowest-frequency nodes.
    ///
    /// Returns `None` when no symbol is present (empty input). A single
    /// distinct symbol is wrapped under one synthetic internal node so its
    /// code is one bit rather than zero bits.
    pub fn from_frequencies(freq: &FrequencyTable) -> Option<Self> {
        let mut seq = 0u32;
        let mut heap: BinaryHeap<Reverse<QueueEntry>> = BinaryHeap::new();
        for (byte, count) in freq.present() {
            heap.push(Reverse(QueueEntry {
                freq: count,
                seq,
                node: Node::Leaf(byte),
            }));
            seq += 1;
        }

        match heap.len() {
            0 => return None,
            1 => {
                // A lone leaf has no encodable path; give it a one-bit code
                // under a synthetic root. Both branches decode to the same
                // symbol, so any reconstruction agrees.
                let Reverse(entry) = heap.pop().expect("heap has one entry");
                let byte = match entry.node {
                    Node::Leaf(b) => b,
                    Node::Internal(..) => unreachable!("only leaves were pushed"),
                };
                return Some(Self {
                    root: Node::Internal(
                        Box::new(Node::Leaf(byte)),
                        Box::new(Node::Leaf(byte)),
                    ),
                });
            }
            _ => {}
        }

        while heap.len() > 1 {
            let Reverse(left) = heap.pop().expect("heap len checked");
            let Reverse(right) = heap.pop().expect("heap len checked");
            heap.push(Reverse(QueueEntry {
                freq: left.freq + right.freq,
                seq,
                node: Node::Internal(Box::new(left.node), Box::new(right.node)),
            }));
            seq += 1;
        }

        let Reverse(root_entry) = heap.pop().expect("one root remains");
        Some(Self {
            root: root_entry.node,
        })
    }

    /// Derive the per-symbol code table by walking the tree.
    ///
    /// Left edges emit a 0 bit, right edges a 1 bit. When the same symbol
    /// appears at two leaves (single-symbol trees), the first code found
    /// wins.
    pub fn code_table(&self) -> CodeTable {
        let mut codes: Vec<Option<Vec<u8>>> = vec![None; 256];
        let mut path = Vec::new();
        Self::walk(&self.root, &mut path, &mut codes);
        CodeTable { codes }
    }

    fn walk(node: &Node, path: &mut Vec<u8>, codes: &mut [Option<Vec<u8>>]) {
        match node {
            Node::Leaf(byte) => {
                if codes[*byte as usize].is_none() {
                    codes[*byte as usize] = Some(path.clone());
                }
            }
            Node::Internal(left, right) => {
                path.push(0);
                Self::walk(left, path, codes);
                path.pop();
                path.push(1);
                Self::walk(right, path, codes);
                path.pop();
            }
        }
    }

    /// Serialize the tree via preorder traversal.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        Self::serialize_node(&self.root, &mut out);
        out
    }

    fn serialize_node(node: &Node, out: &mut Vec<u8>) {
        match node {
            Node::Leaf(byte) => {
                out.push(LEAF_MARKER);
                out.push(*byte);
            }
            Node::Internal(left, right) => {
                out.push(INTERNAL_MARKER);
                Self::serialize_node(left, out);
                Self::serialize_node(right, out);
            }
        }
    }

    /// Reconstruct a tree from its preorder serialization.
    ///
    /// # Errors
    ///
    /// Returns an error when the buffer is truncated, a marker byte is
    /// unknown, the serialization describes more than one tree, or the root
    /// is a bare leaf (which no compressor output ever contains).
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_TREE_BYTES {
            return Err(CodecError::TreeTooLarge {
                declared: bytes.len(),
                max: MAX_TREE_BYTES,
            });
        }
        let mut pos = 0usize;
        let root = Self::deserialize_node(bytes, &mut pos)?;
        if pos != bytes.len() {
            return Err(CodecError::MalformedTree("trailing bytes after root"));
        }
        if matches!(root, Node::Leaf(_)) {
            return Err(CodecError::MalformedTree("bare leaf root"));
        }
        Ok(Self { root })
    }

    fn deserialize_node(bytes: &[u8], pos: &mut usize) -> Result<Node> {
        let marker = *bytes.get(*pos).ok_or(CodecError::Truncated {
            needed: 1,
            offset: *pos,
        })?;
        *pos += 1;
        match marker {
            LEAF_MARKER => {
                let byte = *bytes.get(*pos).ok_or(CodecError::Truncated {
                    needed: 1,
                    offset: *pos,
                })?;
                *pos += 1;
                Ok(Node::Leaf(byte))
            }
            INTERNAL_MARKER => {
                let left = Self::deserialize_node(bytes, pos)?;
                let right = Self::deserialize_node(bytes, pos)?;
                Ok(Node::Internal(Box::new(left), Box::new(right)))
            }
            other => Err(CodecError::InvalidNodeMarker {
                marker: other,
                offset: *pos - 1,
            }),
        }
    }

    /// Decode exactly `valid_bits` bits from `reader`, emitting one byte
    /// per completed code.
    ///
    /// # Errors
    ///
    /// Returns an error when the packed payload runs out before
    /// `valid_bits` bits were consumed, or the final code is incomplete.
    pub fn decode(
        &self,
        reader: &mut crate::bitio::BitReader<'_>,
        valid_bits: u64,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut node = &self.root;
        for _ in 0..valid_bits {
            let bit = reader.next_bit().ok_or(CodecError::BitCountMismatch {
                declared_bits: valid_bits,
                payload_bytes: usize::try_from(reader.bits_read().div_ceil(8)).unwrap_or(0),
            })?;
            node = match node {
                Node::Internal(left, right) => {
                    if bit == 0 {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    }
                }
                Node::Leaf(_) => unreachable!("decode always restarts at the root"),
            };
            if let Node::Leaf(byte) = node {
                out.push(*byte);
                node = &self.root;
            }
        }
        if !std::ptr::eq(node, &self.root) {
            return Err(CodecError::IncompleteSymbol);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::{BitReader, BitWriter};

    #[test]
    fn test_frequency_table_counts() {
        let freq = FrequencyTable::build(b"aab");
        assert_eq!(freq.count(b'a'), 2);
        assert_eq!(freq.count(b'b'), 1);
        assert_eq!(freq.count(b'c'), 0);
        assert_eq!(freq.distinct_symbols(), 2);
    }

    #[test]
    fn test_empty_input_has_no_tree() {
        let freq = FrequencyTable::build(&[]);
        assert!(CodeTree::from_frequencies(&freq).is_none());
    }

    #[test]
    fn test_single_symbol_gets_one_bit_code() {
        let freq = FrequencyTable::build(&[7, 7, 7]);
        let tree = CodeTree::from_frequencies(&freq).unwrap();
        let table = tree.code_table();
        assert_eq!(table.code(7), Some(&[0u8][..]));
        assert!(table.code(8).is_none());
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let freq = FrequencyTable::build(b"this is a test of prefix freedom");
        let tree = CodeTree::from_frequencies(&freq).unwrap();
        let table = tree.code_table();

        let codes: Vec<&[u8]> = (0u16..256)
            .filter_map(|b| table.code(b as u8))
            .collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(
                        !b.starts_with(a),
                        "code {:?} is a prefix of {:?}",
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_tree_construction_is_deterministic() {
        let freq = FrequencyTable::build(b"equal equal tie tie");
        let a = CodeTree::from_frequencies(&freq).unwrap();
        let b = CodeTree::from_frequencies(&freq).unwrap();
        assert_eq!(a.serialize(), b.serialize());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let freq = FrequencyTable::build(b"serialize me back");
        let tree = CodeTree::from_frequencies(&freq).unwrap();
        let bytes = tree.serialize();
        let rebuilt = CodeTree::deserialize(&bytes).unwrap();
        assert_eq!(tree, rebuilt);
    }

    #[test]
    fn test_deserialize_rejects_truncated_tree() {
        let freq = FrequencyTable::build(b"ab");
        let mut bytes = CodeTree::from_frequencies(&freq).unwrap().serialize();
        bytes.pop();
        assert!(matches!(
            CodeTree::deserialize(&bytes),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_bad_marker() {
        let err = CodeTree::deserialize(&[0x00, 0x02, b'a', 0x01, b'b']).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidNodeMarker {
                marker: 0x02,
                offset: 1
            }
        );
    }

    #[test]
    fn test_deserialize_rejects_trailing_bytes() {
        let freq = FrequencyTable::build(b"ab");
        let mut bytes = CodeTree::from_frequencies(&freq).unwrap().serialize();
        bytes.push(0x01);
        bytes.push(b'x');
        assert!(matches!(
            CodeTree::deserialize(&bytes),
            Err(CodecError::MalformedTree(_))
        ));
    }

    #[test]
    fn test_decode_stops_at_exact_bit_count() {
        let data = b"aabbbcc";
        let freq = FrequencyTable::build(data);
        let tree = CodeTree::from_frequencies(&freq).unwrap();
        let table = tree.code_table();

        let mut writer = BitWriter::new();
        for &byte in data {
            writer.push_code(table.code(byte).unwrap());
        }
        let valid_bits = writer.bit_len();
        let packed = writer.into_bytes();

        let mut reader = BitReader::new(&packed);
        let decoded = tree.decode(&mut reader, valid_bits).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decode_rejects_incomplete_final_symbol() {
        let data = b"aabbbcc";
        let freq = FrequencyTable::build(data);
        let tree = CodeTree::from_frequencies(&freq).unwrap();
        let table = tree.code_table();

        let mut writer = BitWriter::new();
        for &byte in data {
            writer.push_code(table.code(byte).unwrap());
        }
        let valid_bits = writer.bit_len();
        let packed = writer.into_bytes();

        let mut reader = BitReader::new(&packed);
        // One bit short of a full final code.
        let result = tree.decode(&mut reader, valid_bits - 1);
        assert_eq!(result, Err(CodecError::IncompleteSymbol));
    }
}
