//! Compressed-stream framing: header layout, compress and decompress.
//!
//! See the crate docs for the byte layout. Both length fields are 4-byte
//! big-endian; the bit count records *bits*, not bytes, so the decoder is
//! never fooled by the zero-padding in the final packed byte.

use crate::bitio::{BitReader, BitWriter};
use crate::error::{CodecError, Result};
use crate::tree::{CodeTree, FrequencyTable, MAX_TREE_BYTES};

/// Bytes occupied by the two fixed header fields.
const HEADER_FIELD_LEN: usize = 4;

/// Compress `data` into a self-describing Huffman stream.
///
/// Empty input produces a valid stream with an empty tree and a zero bit
/// count.
///
/// # Errors
///
/// Returns [`CodecError::InputTooLarge`] when the encoded payload would
/// exceed the 4-byte bit-count field (about 512 MiB of code bits).
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let freq = FrequencyTable::build(data);
    let Some(tree) = CodeTree::from_frequencies(&freq) else {
        // Empty input: empty tree, zero valid bits.
        let mut out = Vec::with_capacity(HEADER_FIELD_LEN * 2);
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        return Ok(out);
    };
    let table = tree.code_table();

    let mut total_bits = 0u64;
    for (byte, count) in freq.present() {
        let code_len = table
            .code(byte)
            .map(|c| c.len() as u64)
            .unwrap_or_default();
        total_bits += count * code_len;
    }
    if total_bits > u64::from(u32::MAX) {
        return Err(CodecError::InputTooLarge { bits: total_bits });
    }

    let tree_bytes = tree.serialize();
    let mut writer = BitWriter::with_capacity(total_bits);
    for &byte in data {
        // Every input byte has a code: the table was built from this input.
        if let Some(code) = table.code(byte) {
            writer.push_code(code);
        }
    }
    debug_assert_eq!(writer.bit_len(), total_bits);
    let packed = writer.into_bytes();

    let mut out =
        Vec::with_capacity(HEADER_FIELD_LEN * 2 + tree_bytes.len() + packed.len());
    out.extend_from_slice(&(tree_bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(&tree_bytes);
    out.extend_from_slice(&(total_bits as u32).to_be_bytes());
    out.extend_from_slice(&packed);
    Ok(out)
}

/// Decompress a stream produced by [`compress`].
///
/// # Errors
///
/// Any structural defect — truncated header, declared lengths past the end
/// of the buffer, unknown tree markers, payload/bit-count disagreement —
/// is a [`CodecError`]; the decoder never reads past declared lengths.
pub fn decompress(stream: &[u8]) -> Result<Vec<u8>> {
    let (tree_len, rest) = read_u32(stream, 0)?;
    let tree_len = tree_len as usize;
    if tree_len > MAX_TREE_BYTES {
        return Err(CodecError::TreeTooLarge {
            declared: tree_len,
            max: MAX_TREE_BYTES,
        });
    }
    if rest.len() < tree_len {
        return Err(CodecError::Truncated {
            needed: tree_len - rest.len(),
            offset: HEADER_FIELD_LEN + rest.len(),
        });
    }
    let (tree_bytes, rest) = rest.split_at(tree_len);
    let (valid_bits, packed) = read_u32(rest, HEADER_FIELD_LEN + tree_len)?;
    let valid_bits = u64::from(valid_bits);

    let expected_payload = usize::try_from(valid_bits.div_ceil(8))
        .map_err(|_| CodecError::InputTooLarge { bits: valid_bits })?;
    if packed.len() != expected_payload {
        return Err(CodecError::BitCountMismatch {
            declared_bits: valid_bits,
            payload_bytes: packed.len(),
        });
    }

    if tree_len == 0 {
        if valid_bits != 0 {
            return Err(CodecError::MalformedTree("empty tree with payload bits"));
        }
        return Ok(Vec::new());
    }

    let tree = CodeTree::deserialize(tree_bytes)?;
    let mut reader = BitReader::new(packed);
    tree.decode(&mut reader, valid_bits)
}

/// Read a big-endian u32 at `offset`'s logical position, returning the
/// value and the remaining bytes.
fn read_u32(bytes: &[u8], offset: usize) -> Result<(u32, &[u8])> {
    if bytes.len() < HEADER_FIELD_LEN {
        return Err(CodecError::Truncated {
            needed: HEADER_FIELD_LEN - bytes.len(),
            offset: offset + bytes.len(),
        });
    }
    let (field, rest) = bytes.split_at(HEADER_FIELD_LEN);
    let value = u32::from_be_bytes(field.try_into().expect("split yields 4 bytes"));
    Ok((value, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_text() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let packed = compress(data).unwrap();
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_empty() {
        let packed = compress(&[]).unwrap();
        assert_eq!(packed.len(), 8);
        assert_eq!(decompress(&packed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_roundtrip_single_byte() {
        let packed = compress(&[42]).unwrap();
        assert_eq!(decompress(&packed).unwrap(), vec![42]);
    }

    #[test]
    fn test_roundtrip_single_distinct_value() {
        let data = vec![0xabu8; 1000];
        let packed = compress(&data).unwrap();
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_all_256_values() {
        let data: Vec<u8> = (0u16..256).map(|b| b as u8).collect();
        let packed = compress(&data).unwrap();
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_repetitive_input_shrinks() {
        let data = vec![b'z'; 4096];
        let packed = compress(&data).unwrap();
        assert!(packed.len() < data.len());
    }

    #[test]
    fn test_decompress_rejects_truncated_header() {
        assert!(matches!(
            decompress(&[0, 0]),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decompress_rejects_tree_past_end() {
        // Declares a 100-byte tree but supplies none.
        let mut stream = Vec::new();
        stream.extend_from_slice(&100u32.to_be_bytes());
        assert!(matches!(
            decompress(&stream),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decompress_rejects_oversized_tree_claim() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&(u32::MAX).to_be_bytes());
        assert!(matches!(
            decompress(&stream),
            Err(CodecError::TreeTooLarge { .. })
        ));
    }

    #[test]
    fn test_decompress_rejects_payload_length_mismatch() {
        let mut packed = compress(b"mismatch").unwrap();
        packed.push(0);
        assert!(matches!(
            decompress(&packed),
            Err(CodecError::BitCountMismatch { .. })
        ));
    }

    #[test]
    fn test_decompress_rejects_empty_tree_with_bits() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&0u32.to_be_bytes());
        stream.extend_from_slice(&3u32.to_be_bytes());
        stream.push(0b1010_0000);
        assert!(matches!(
            decompress(&stream),
            Err(CodecError::MalformedTree(_))
        ));
    }

    #[test]
    fn test_decompress_rejects_corrupt_marker() {
        let mut packed = compress(b"corrupt me").unwrap();
        // First tree byte is the root marker; 0x02 is not a valid marker.
        packed[4] = 0x02;
        assert!(matches!(
            decompress(&packed),
            Err(CodecError::InvalidNodeMarker { .. })
        ));
    }
}
