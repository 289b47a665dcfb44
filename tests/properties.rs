//! Property-based tests for the invariants enumerated in SPEC_FULL.md §8.
//!
//! Covers invariants 1 (round-trip), 3 (tag symmetry), 5 (SET DER ordering),
//! 8 (OID minimum-octet arcs) and 9 (idempotent re-encode). Generated sizes
//! are bounded so the suite runs in bounded time.

use proptest::prelude::*;

use ber_tlv::tag::{decode_tag, encode_tag, Tag, TagClass};
use ber_tlv::tlv::Tlv;
use ber_tlv::types::{ObjectIdentifier, Set, UniversalType};

fn arb_tag_class() -> impl Strategy<Value = TagClass> {
    prop_oneof![
        Just(TagClass::Universal),
        Just(TagClass::Application),
        Just(TagClass::ContextSpecific),
        Just(TagClass::Private),
    ]
}

/// Tag numbers bounded so the long form never needs more than the 8-octet
/// cap: 7 continuation octets at 7 bits each is 49 bits, so staying well
/// under that keeps every generated number representable.
fn arb_tag_number() -> impl Strategy<Value = u64> {
    prop_oneof![
        (0u64..31),
        (31u64..(1u64 << 20)),
    ]
}

fn arb_tag() -> impl Strategy<Value = Tag> {
    (arb_tag_class(), arb_tag_number()).prop_map(|(class, number)| Tag { class, number })
}

/// Builds an arbitrary `Tlv` tree. Leaves are primitives with a small random
/// value; constructed nodes recurse with a strictly shrinking size budget so
/// the strategy always terminates.
fn arb_tlv() -> impl Strategy<Value = Tlv> {
    let leaf = (arb_tag(), prop::collection::vec(any::<u8>(), 0..8))
        .prop_map(|(tag, value)| Tlv::primitive(tag, value));

    leaf.prop_recursive(4, 32, 4, |inner| {
        (arb_tag(), prop::collection::vec(inner, 0..4))
            .prop_map(|(tag, children)| Tlv::constructed(tag, children))
    })
}

proptest! {
    // Invariant 3: tag encode/decode symmetry.
    #[test]
    fn tag_encode_decode_symmetry(class in arb_tag_class(), constructed in any::<bool>(), number in arb_tag_number()) {
        let encoded = encode_tag(class, constructed, number);
        let (c, ctor, n, consumed) = decode_tag(&encoded, 0).unwrap();
        prop_assert_eq!(c, class);
        prop_assert_eq!(ctor, constructed);
        prop_assert_eq!(n, number);
        prop_assert_eq!(consumed, encoded.len());
    }

    // Invariants 1 and 9: round-trip and idempotent re-encode.
    #[test]
    fn tlv_round_trips_and_reencodes_idempotently(t in arb_tlv()) {
        let encoded = t.encoded();
        let parsed = ber_tlv::parse_slice(encoded.clone()).unwrap();
        prop_assert_eq!(&parsed, &t);
        prop_assert_eq!(parsed.encoded(), encoded);
    }

    // Invariant 5: SET children re-emit in ascending (class, number) order
    // with no duplicate tags.
    #[test]
    fn set_reencodes_in_der_order_without_duplicates(
        tags in prop::collection::hash_set(arb_tag(), 1..8)
    ) {
        let children: Vec<Tlv> = tags
            .into_iter()
            .map(|tag| Tlv::primitive(tag, vec![0u8]))
            .collect();
        let set = Set::new(children).unwrap();
        let encoded_children = set.to_tlv().children().to_vec();

        let mut prev: Option<Tag> = None;
        for child in &encoded_children {
            if let Some(p) = prev {
                prop_assert!(p < child.tag());
            }
            prev = Some(child.tag());
        }
    }

    // Invariant 8: every OID arc re-decodes to a minimum-octet encoding.
    #[test]
    fn oid_arcs_are_minimum_octet(
        first in 0u64..3,
        rest in prop::collection::vec(0u64..(1u64 << 24), 0..6)
    ) {
        let second = if first < 2 { 0u64 } else { 7u64 };
        let mut arcs = vec![first, second];
        arcs.extend(rest);

        let oid = ObjectIdentifier::new(arcs).unwrap();
        let tlv = oid.to_tlv();
        let reparsed = ObjectIdentifier::from_tlv(&tlv).unwrap();

        prop_assert_eq!(reparsed.arcs(), oid.arcs());
        prop_assert_eq!(reparsed.to_tlv().encoded(), tlv.encoded());
        prop_assert!(reparsed.findings().is_empty());
    }
}
