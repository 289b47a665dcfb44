//! INTEGER overlay (tag 2): arbitrary-precision signed two's complement.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use super::{expect_primitive, UniversalType, TAG_INTEGER};
use crate::error::{Error, Result};
use crate::finding::Finding;
use crate::tag::{Tag, TagClass};
use crate::tlv::Tlv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integer {
    pub value: BigInt,
    findings: Vec<Finding>,
}

impl Integer {
    pub fn new(value: impl Into<BigInt>) -> Self {
        Self {
            value: value.into(),
            findings: Vec::new(),
        }
    }

    /// Encodes `value` as big-endian two's complement using the minimum
    /// number of octets (at least one).
    fn minimal_two_complement(value: &BigInt) -> Vec<u8> {
        if value.is_zero() {
            return vec![0x00];
        }
        let (sign, mut bytes_be) = value.to_bytes_be();
        // `to_bytes_be` returns magnitude only; build two's complement by
        // hand so both positive and negative values end up minimal.
        if sign == num_bigint::Sign::Plus {
            if bytes_be[0] & 0x80 != 0 {
                bytes_be.insert(0, 0x00);
            }
            bytes_be
        } else {
            // Two's complement of a negative magnitude: invert and add one
            // over the minimum number of octets such that the result still
            // decodes back to `value`. `bytes_be` octets suffice unless the
            // magnitude exceeds 2^(8*len-1), i.e. the top magnitude byte is
            // over 0x80, or exactly 0x80 with a nonzero byte behind it (the
            // magnitude is not precisely `-2^(8*len-1)`, which *is*
            // representable in `len` octets, e.g. -128 as a single 0x80).
            let mut width = bytes_be.len();
            let top = bytes_be[0];
            let needs_extra_octet = top > 0x80 || (top == 0x80 && bytes_be[1..].iter().any(|&b| b != 0));
            if needs_extra_octet {
                width += 1;
            }
            let modulus = BigInt::from(1u8) << (width * 8);
            let twos = modulus + value;
            let (_, mut be) = twos.to_bytes_be();
            while be.len() < width {
                be.insert(0, 0xFF);
            }
            be
        }
    }

    /// Decodes big-endian two's complement octets into a signed value.
    fn from_two_complement(data: &[u8]) -> BigInt {
        let negative = data[0] & 0x80 != 0;
        if !negative {
            return BigInt::from_bytes_be(num_bigint::Sign::Plus, data);
        }
        let width = data.len();
        let modulus = BigInt::from(1u8) << (width * 8);
        let magnitude = BigInt::from_bytes_be(num_bigint::Sign::Plus, data);
        magnitude - modulus
    }

    /// True when the value-field has a redundant leading sign octet: the
    /// top nine bits (first octet plus the MSB of the second) are all
    /// equal, meaning the first octet could be dropped without changing
    /// the sign.
    fn has_redundant_sign_octet(data: &[u8]) -> bool {
        if data.len() < 2 {
            return false;
        }
        let top_bit = data[0] & 0x80;
        let msb_of_next = data[1] & 0x80;
        (data[0] == 0x00 && msb_of_next == 0) || (data[0] == 0xFF && top_bit != 0 && msb_of_next != 0)
    }
}

impl UniversalType for Integer {
    const TAG_NUMBER: u64 = TAG_INTEGER;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_INTEGER, "INTEGER")?;
        if data.is_empty() {
            return Err(Error::ShapeMismatch {
                expected: "INTEGER (non-empty value)",
                found: "empty value-field",
            });
        }

        let mut findings = Vec::new();
        if Self::has_redundant_sign_octet(&data) {
            findings.push(Finding::new(
                "INTEGER value-field has a redundant leading sign octet (9 MSBits all equal)",
            ));
        }

        Ok(Self {
            value: Self::from_two_complement(&data),
            findings,
        })
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_INTEGER,
            },
            Self::minimal_two_complement(&self.value),
        )
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        format!("INTEGER {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_redundant_sign_octet_is_a_finding() {
        let tlv = Tlv::from_hex("0202007f").unwrap();
        let parsed = Integer::from_tlv(&tlv).unwrap();
        assert_eq!(parsed.value, BigInt::from(127));
        assert_eq!(parsed.findings().len(), 1);
        assert_eq!(parsed.to_tlv().to_hex(), "02017f");
    }

    #[test]
    fn negative_values_roundtrip() {
        for n in [-1i64, -128, -129, -256, 255, 256, 0] {
            let int = Integer::new(BigInt::from(n));
            let tlv = int.to_tlv();
            let parsed = Integer::from_tlv(&tlv).unwrap();
            assert_eq!(parsed.value, BigInt::from(n));
        }
    }

    #[test]
    fn minimal_encoding_has_no_redundant_octet() {
        let int = Integer::new(BigInt::from(127));
        assert_eq!(int.to_tlv().value().unwrap().as_ref(), &[0x7F]);
        let int = Integer::new(BigInt::from(-1));
        assert_eq!(int.to_tlv().value().unwrap().as_ref(), &[0xFF]);
        let int = Integer::new(BigInt::from(128));
        assert_eq!(int.to_tlv().value().unwrap().as_ref(), &[0x00, 0x80]);
    }
}
