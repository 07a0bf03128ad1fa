//! Property-based tests for the container format and release gate.

use proptest::prelude::*;

use chronoseal_crypto::{ContentDigest, KeyMode};

use crate::container::Capsule;
use crate::gate::{is_releasable, remaining};
use crate::metadata::CapsuleMetadata;

fn arb_metadata() -> impl Strategy<Value = CapsuleMetadata> {
    (
        "[a-zA-Z0-9._-]{1,64}",
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        1u64..u64::MAX,
        any::<Vec<u8>>(),
        prop_oneof![Just(KeyMode::Random), Just(KeyMode::PasswordDerived)],
    )
        .prop_map(
            |(name, unlock, created, orig, comp, enc, seed, mode)| CapsuleMetadata {
                original_filename: name,
                unlock_time: unlock,
                created_at: created,
                original_size: orig,
                compressed_size: comp,
                encrypted_size: enc,
                content_digest: ContentDigest::hash(&seed),
                key_mode: mode,
            },
        )
}

proptest! {
    /// Parsing inverts assembly for any metadata/payload combination.
    #[test]
    fn assemble_parse_roundtrip(
        metadata in arb_metadata(),
        key_package in prop::collection::vec(any::<u8>(), 0..512),
        ciphertext in prop::collection::vec(any::<u8>(), 1..1024),
    ) {
        let capsule = Capsule::new(metadata, key_package, ciphertext);
        let bytes = capsule.assemble().unwrap();
        prop_assert_eq!(Capsule::parse(&bytes).unwrap(), capsule);
    }

    /// Arbitrary garbage never panics the parser.
    #[test]
    fn parse_never_panics(garbage: Vec<u8>) {
        let _ = Capsule::parse(&garbage);
    }

    /// The gate is exactly the `now >= unlock` predicate.
    #[test]
    fn gate_matches_comparison(unlock: u64, now: u64) {
        prop_assert_eq!(is_releasable(unlock, now), now >= unlock);
    }

    /// Remaining time is zero exactly when releasable.
    #[test]
    fn remaining_consistent_with_gate(unlock: u64, now: u64) {
        let left = remaining(unlock, now);
        prop_assert_eq!(left.is_zero(), is_releasable(unlock, now));
        if !left.is_zero() {
            prop_assert_eq!(left.as_secs(), unlock - now);
        }
    }
}
