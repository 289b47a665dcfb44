//! Literal end-to-end scenarios S1-S6.

use pretty_assertions::assert_eq;

use num_bigint::BigInt;

use ber_tlv::tag::{Tag, TagClass};
use ber_tlv::tlv::Tlv;
use ber_tlv::types::{Integer, PrintableString, Set, UniversalType};

#[test]
fn s1_two_integers_in_sequence() {
    let data = hex::decode("3006020105020107").unwrap();
    let tlv = ber_tlv::parse_slice(data.clone()).unwrap();

    assert_eq!(tlv.tag(), Tag::universal(0x10));
    assert!(tlv.is_constructed());
    assert_eq!(tlv.children().len(), 2);
    assert_eq!(tlv.children()[0].as_integer().unwrap().value, BigInt::from(5));
    assert_eq!(tlv.children()[1].as_integer().unwrap().value, BigInt::from(7));
    assert_eq!(tlv.encoded(), data);
    assert_eq!(
        ber_tlv::render::render_tree(&tlv, "\n|  "),
        "30 06\n|  02 01 05\n|  02 01 07"
    );
}

#[test]
fn s2_indefinite_length_sequence_canonicalizes_on_reencode() {
    let data = hex::decode("30800201010000").unwrap();
    let tlv = ber_tlv::parse_slice(data).unwrap();

    assert_eq!(tlv.children().len(), 1);
    assert_eq!(tlv.children()[0].as_integer().unwrap().value, 1.into());
    assert_eq!(tlv.encoded(), hex::decode("3003020101").unwrap());
}

#[test]
fn s3_oid_roundtrips() {
    let data = hex::decode("06062a864886f70d").unwrap();
    let tlv = ber_tlv::parse_slice(data.clone()).unwrap();

    assert_eq!(tlv.tag(), Tag::universal(6));
    let oid = tlv.as_oid().unwrap();
    assert_eq!(oid.to_dotted_string(), "1.2.840.113549");
    assert_eq!(tlv.encoded(), data);
}

#[test]
fn s4_redundant_sign_octet_is_a_finding_not_an_error() {
    let data = hex::decode("0202007f").unwrap();
    let tlv = ber_tlv::parse_slice(data).unwrap();

    let int = tlv.as_integer().unwrap();
    assert_eq!(int.value, 127.into());
    assert_eq!(int.findings().len(), 1);
    assert_eq!(int.to_tlv().to_hex(), "02017f");
}

#[test]
fn s5_printable_string_rejects_illegal_character() {
    assert!(PrintableString::new("Hello*").is_err());
}

#[test]
fn s6_set_rejects_duplicate_tags_on_construction() {
    let one = Integer::new(1).to_tlv();
    assert!(Set::new(vec![one.clone(), one.clone(), one]).is_err());
}

#[test]
fn s6_set_of_integer_and_octet_string_sorts_into_der_order() {
    let set = Set::new(vec![
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: 4,
            },
            &b"\xAA"[..],
        ),
        Integer::new(1).to_tlv(),
    ])
    .unwrap();

    assert_eq!(set.to_tlv().to_hex(), "31060201010401aa");
}
