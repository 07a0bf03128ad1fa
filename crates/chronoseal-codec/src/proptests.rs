//! Property-based tests for the Huffman codec.
//!
//! These verify the codec's structural properties over arbitrary inputs:
//! exact round-trips, self-describing streams, and rejection (never
//! panics, never out-of-bounds) of corrupted streams.

use proptest::prelude::*;

use crate::{compress, decompress};

proptest! {
    /// Decompression inverts compression for any byte sequence.
    #[test]
    fn compress_decompress_roundtrip(data: Vec<u8>) {
        let packed = compress(&data).unwrap();
        prop_assert_eq!(decompress(&packed).unwrap(), data);
    }

    /// Round-trip holds for low-entropy inputs, the codec's best case.
    #[test]
    fn roundtrip_low_entropy(byte: u8, len in 0usize..4096) {
        let data = vec![byte; len];
        let packed = compress(&data).unwrap();
        prop_assert_eq!(decompress(&packed).unwrap(), data);
    }

    /// Compression is deterministic: identical inputs yield identical
    /// streams, so both sides can agree on the reconstructed tree.
    #[test]
    fn compress_is_deterministic(data: Vec<u8>) {
        prop_assert_eq!(compress(&data).unwrap(), compress(&data).unwrap());
    }

    /// Arbitrary garbage never panics the decoder; it either decodes or
    /// reports a structured error.
    #[test]
    fn decompress_never_panics(garbage: Vec<u8>) {
        let _ = decompress(&garbage);
    }

    /// Truncating a valid stream anywhere is always rejected, never
    /// silently misdecoded into the original input.
    #[test]
    fn truncation_is_detected(data in prop::collection::vec(any::<u8>(), 2..256),
                              cut in 1usize..8) {
        let packed = compress(&data).unwrap();
        let cut = cut.min(packed.len());
        let truncated = &packed[..packed.len() - cut];
        match decompress(truncated) {
            Ok(decoded) => prop_assert_ne!(decoded, data),
            Err(_) => {}
        }
    }
}
