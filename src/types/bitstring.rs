//! BIT STRING overlay (tag 3): an unused-bit count plus the bit data.

use bitvec::prelude::*;

use super::{expect_primitive, UniversalType, TAG_BIT_STRING};
use crate::error::{Error, Result};
use crate::finding::Finding;
use crate::tag::{Tag, TagClass};
use crate::tlv::Tlv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    pub unused_bits: u8,
    pub bytes: Vec<u8>,
    findings: Vec<Finding>,
}

impl BitString {
    /// Builds a BitString from raw bytes and a count of unused trailing
    /// bits in the last byte (0-7). Raises if `unused_bits` is out of
    /// range or nonzero on an empty byte sequence.
    pub fn new(bytes: Vec<u8>, unused_bits: u8) -> Result<Self> {
        if unused_bits > 7 {
            return Err(Error::TypedConstructionError {
                reason: format!("BIT STRING unused bit count {} out of range", unused_bits),
            });
        }
        if unused_bits > 0 && bytes.is_empty() {
            return Err(Error::TypedConstructionError {
                reason: "BIT STRING has unused bits but no byte data".into(),
            });
        }
        Ok(Self {
            unused_bits,
            bytes,
            findings: Vec::new(),
        })
    }

    /// Number of significant bits. Saturates to 0 for a non-conforming
    /// parsed overlay that declares unused bits over an empty byte
    /// sequence (`from_tlv` records this as a finding rather than an
    /// error, so `bytes.is_empty()` doesn't imply `unused_bits == 0`).
    pub fn bit_len(&self) -> usize {
        (self.bytes.len() * 8).saturating_sub(self.unused_bits as usize)
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        let bits = self.bytes.view_bits::<Msb0>();
        &bits[..self.bit_len()]
    }
}

impl UniversalType for BitString {
    const TAG_NUMBER: u64 = TAG_BIT_STRING;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_BIT_STRING, "BIT STRING")?;
        if data.is_empty() {
            return Err(Error::ShapeMismatch {
                expected: "BIT STRING (at least the unused-bit count octet)",
                found: "empty value-field",
            });
        }

        let unused = data[0];
        let bytes = data[1..].to_vec();
        let mut findings = Vec::new();

        if unused > 7 {
            return Err(Error::ShapeMismatch {
                expected: "BIT STRING (unused bit count 0-7)",
                found: "unused bit count out of range",
            });
        }
        if unused > 0 && bytes.is_empty() {
            findings.push(Finding::new(
                "BIT STRING declares unused bits but carries no byte data",
            ));
        }

        Ok(Self {
            unused_bits: unused,
            bytes,
            findings,
        })
    }

    fn to_tlv(&self) -> Tlv {
        let mut value = Vec::with_capacity(1 + self.bytes.len());
        value.push(self.unused_bits);
        value.extend_from_slice(&self.bytes);
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_BIT_STRING,
            },
            value,
        )
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        format!(
            "BIT STRING ({} bits, {} unused)",
            self.bit_len(),
            self.unused_bits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bitstring_must_have_zero_unused() {
        assert!(BitString::new(vec![], 0).is_ok());
        assert!(BitString::new(vec![], 3).is_err());
    }

    #[test]
    fn roundtrips_through_tlv() {
        let bs = BitString::new(vec![0b1010_0000], 5).unwrap();
        let tlv = bs.to_tlv();
        assert_eq!(tlv.value().unwrap().as_ref(), &[0x05, 0b1010_0000]);
        let parsed = BitString::from_tlv(&tlv).unwrap();
        assert_eq!(parsed, bs);
        assert_eq!(parsed.bit_len(), 3);
    }

    #[test]
    fn invariant_6_unused_implies_nonempty_on_parse() {
        let tlv = Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_BIT_STRING,
            },
            &[0x01u8][..],
        );
        let parsed = BitString::from_tlv(&tlv).unwrap();
        assert_eq!(parsed.findings().len(), 1);
    }

    #[test]
    fn bit_len_does_not_underflow_on_nonconforming_parse() {
        let tlv = Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_BIT_STRING,
            },
            &[0x01u8][..],
        );
        let parsed = BitString::from_tlv(&tlv).unwrap();
        assert_eq!(parsed.bit_len(), 0);
        assert!(parsed.as_bitslice().is_empty());
    }
}
