//! Property-based tests for the part codec.
//!
//! - Any file round-trips through encode and decode, in any part order
//! - Encoding is deterministic and never exceeds the capacity
//! - Dropping a part is reported with exactly that index
//! - Tampering with a payload character is never a verified success

use proptest::prelude::*;

use crate::config::{CapacityTable, ErrorCorrection};
use crate::decoder::decode;
use crate::encoder::encode_with_capacity;
use crate::error::FrameError;
use crate::part::Part;

const BASE64_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn texts(parts: &[Part]) -> Vec<String> {
    parts.iter().map(Part::text).collect()
}

fn capacity() -> impl Strategy<Value = usize> {
    prop_oneof![
        Just(ErrorCorrection::Low),
        Just(ErrorCorrection::Medium),
        Just(ErrorCorrection::Quartile),
        Just(ErrorCorrection::High),
    ]
    .prop_map(|level| CapacityTable::default().capacity(level))
    .boxed()
    .prop_union((120usize..700).boxed())
}

fn file_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.]{1,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_trip_in_any_order(
        data in prop::collection::vec(any::<u8>(), 0..4096),
        capacity in capacity(),
        name in file_name(),
        seed in any::<u64>(),
    ) {
        let parts = encode_with_capacity(&data, capacity, &name).unwrap();

        let mut blobs = texts(&parts);
        let len = blobs.len();
        if len > 1 {
            blobs.rotate_left((seed as usize) % len);
            blobs.swap(0, (seed as usize / 7) % len);
        }

        let decoded = decode(&blobs).unwrap();
        prop_assert!(decoded.is_verified());
        prop_assert_eq!(decoded.total, len);
        prop_assert_eq!(decoded.data, data);
        prop_assert_eq!(decoded.file_name, name);
    }

    #[test]
    fn framing_is_deterministic_and_bounded(
        data in prop::collection::vec(any::<u8>(), 0..4096),
        capacity in capacity(),
        name in file_name(),
    ) {
        let first = encode_with_capacity(&data, capacity, &name).unwrap();
        let second = encode_with_capacity(&data, capacity, &name).unwrap();
        prop_assert_eq!(&first, &second);

        let total = first.len();
        for (i, part) in first.iter().enumerate() {
            prop_assert_eq!(part.index, i + 1);
            prop_assert_eq!(part.total, total);
            prop_assert!(part.char_len() <= capacity);
            prop_assert_eq!(part.char_len(), part.text().chars().count());
        }
        prop_assert!(first[total - 1].checksum.is_some());
    }

    #[test]
    fn dropped_part_is_named(
        data in prop::collection::vec(any::<u8>(), 1000..4096),
        pick in any::<prop::sample::Index>(),
    ) {
        let parts = encode_with_capacity(&data, 369, "drop.bin").unwrap();
        let checksum_at = parts.iter().position(|p| p.checksum.is_some()).unwrap();

        // Keep the checksum-bearing part so the transfer check is reached.
        let candidates: Vec<usize> = (0..parts.len()).filter(|i| *i != checksum_at).collect();
        let dropped = candidates[pick.index(candidates.len())];

        let mut blobs = texts(&parts);
        blobs.remove(dropped);
        match decode(&blobs) {
            Err(FrameError::IncompleteTransfer { missing, .. }) => {
                prop_assert_eq!(missing, vec![dropped + 1]);
            }
            other => prop_assert!(false, "unexpected result: {:?}", other.map(|d| d.total)),
        }
    }

    #[test]
    fn tampering_is_never_verified(
        data in prop::collection::vec(any::<u8>(), 1..2048),
        pick in any::<prop::sample::Index>(),
        replacement in prop::sample::select(BASE64_ALPHABET.to_vec()),
    ) {
        let mut parts = encode_with_capacity(&data, 455, "tamper.bin").unwrap();

        let positions: Vec<(usize, usize)> = parts
            .iter()
            .enumerate()
            .flat_map(|(p, part)| {
                part.payload
                    .char_indices()
                    .filter(|(_, c)| *c != '\n' && *c != '=')
                    .map(move |(i, _)| (p, i))
            })
            .collect();
        let (p, i) = positions[pick.index(positions.len())];
        let original = parts[p].payload.as_bytes()[i];
        prop_assume!(original != replacement);

        let mut payload = parts[p].payload.clone().into_bytes();
        payload[i] = replacement;
        parts[p].payload = String::from_utf8(payload).unwrap();

        if let Ok(decoded) = decode(texts(&parts)) {
            prop_assert!(!decoded.is_verified());
        }
    }
}
