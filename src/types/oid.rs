//! OBJECT IDENTIFIER overlay (tag 6).

use super::{expect_primitive, UniversalType, TAG_OBJECT_IDENTIFIER};
use crate::error::{Error, Result};
use crate::finding::Finding;
use crate::tag::{Tag, TagClass};
use crate::tlv::Tlv;

#[derive(Clone)]
pub struct ObjectIdentifier {
    arcs: Vec<u64>,
    findings: Vec<Finding>,
}

impl PartialEq for ObjectIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.arcs == other.arcs
    }
}
impl Eq for ObjectIdentifier {}

impl std::hash::Hash for ObjectIdentifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.arcs.hash(state);
    }
}

impl ObjectIdentifier {
    /// Builds an OID from its arcs, validating the first-two-arc packing
    /// constraint (first arc in {0,1,2}; if it is 0 or 1, the second must
    /// be < 40).
    pub fn new(arcs: Vec<u64>) -> Result<Self> {
        if arcs.len() < 2 {
            return Err(Error::TypedConstructionError {
                reason: "OBJECT IDENTIFIER needs at least two arcs".into(),
            });
        }
        if arcs[0] > 2 {
            return Err(Error::TypedConstructionError {
                reason: "OBJECT IDENTIFIER first arc must be 0, 1, or 2".into(),
            });
        }
        if arcs[0] < 2 && arcs[1] >= 40 {
            return Err(Error::TypedConstructionError {
                reason: "OBJECT IDENTIFIER second arc must be < 40 when the first is 0 or 1"
                    .into(),
            });
        }
        Ok(Self {
            arcs,
            findings: Vec::new(),
        })
    }

    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    pub fn to_dotted_string(&self) -> String {
        self.arcs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    fn encode_arc(arc: u64, out: &mut Vec<u8>) {
        let mut digits = Vec::new();
        let mut n = arc;
        loop {
            digits.push((n & 0x7F) as u8);
            n >>= 7;
            if n == 0 {
                break;
            }
        }
        digits.reverse();
        let last = digits.len() - 1;
        for (i, d) in digits.into_iter().enumerate() {
            out.push(if i == last { d } else { d | 0x80 });
        }
    }

    fn decode_arcs(data: &[u8]) -> Result<(Vec<u64>, Vec<Finding>)> {
        let mut findings = Vec::new();
        if data.is_empty() {
            return Err(Error::ShapeMismatch {
                expected: "OBJECT IDENTIFIER (non-empty value)",
                found: "empty value-field",
            });
        }

        let first = data[0];
        let (a, b): (u64, u64) = if first < 80 {
            ((first / 40) as u64, (first % 40) as u64)
        } else {
            (2, first as u64 - 80)
        };

        let mut arcs = vec![a, b];
        let mut i = 1usize;
        while i < data.len() {
            let mut value: u64 = 0;
            let mut finished = false;
            let mut octets = 0usize;
            while i < data.len() {
                let octet = data[i];
                i += 1;
                octets += 1;
                if octets == 1 && octet == 0x80 {
                    findings.push(Finding::new(
                        "OBJECT IDENTIFIER arc uses non-minimal encoding (leading 0x80)",
                    ));
                }
                value = (value << 7) | u64::from(octet & 0x7F);
                if octet & 0x80 == 0 {
                    finished = true;
                    break;
                }
            }
            if !finished {
                return Err(Error::ShapeMismatch {
                    expected: "OBJECT IDENTIFIER (terminated arc)",
                    found: "truncated arc (missing terminating octet)",
                });
            }
            arcs.push(value);
        }

        Ok((arcs, findings))
    }
}

impl std::fmt::Debug for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OID({})", self.to_dotted_string())
    }
}

// Serializes as the canonical dotted string (the form higher layers already
// use when snapshotting parsed certificates to JSON); findings never cross
// this boundary.
#[cfg(feature = "serde")]
impl serde::Serialize for ObjectIdentifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_dotted_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ObjectIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error as _;
        let s = String::deserialize(deserializer)?;
        let arcs: std::result::Result<Vec<u64>, _> =
            s.split('.').map(|part| part.parse::<u64>()).collect();
        let arcs = arcs.map_err(|_| D::Error::custom("OBJECT IDENTIFIER dotted string has a non-numeric arc"))?;
        ObjectIdentifier::new(arcs).map_err(D::Error::custom)
    }
}

impl UniversalType for ObjectIdentifier {
    const TAG_NUMBER: u64 = TAG_OBJECT_IDENTIFIER;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_OBJECT_IDENTIFIER, "OBJECT IDENTIFIER")?;
        let (arcs, findings) = Self::decode_arcs(&data)?;
        Ok(Self { arcs, findings })
    }

    fn to_tlv(&self) -> Tlv {
        let mut value = Vec::new();
        value.push((40 * self.arcs[0] + self.arcs[1]) as u8);
        for arc in &self.arcs[2..] {
            Self::encode_arc(*arc, &mut value);
        }
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_OBJECT_IDENTIFIER,
            },
            value,
        )
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        match crate::render::friendly_name(self) {
            Some(name) => format!("OID {} ({})", self.to_dotted_string(), name),
            None => format!("OID {}", self.to_dotted_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_pkcs1_rsa_encryption_roundtrips() {
        let tlv = Tlv::from_hex("06062a864886f70d").unwrap();
        let oid = ObjectIdentifier::from_tlv(&tlv).unwrap();
        assert_eq!(oid.to_dotted_string(), "1.2.840.113549");
        assert_eq!(oid.to_tlv().to_hex(), "06062a864886f70d");
    }

    #[test]
    fn construction_validates_first_two_arcs() {
        assert!(ObjectIdentifier::new(vec![3, 1]).is_err());
        assert!(ObjectIdentifier::new(vec![1, 40]).is_err());
        assert!(ObjectIdentifier::new(vec![2, 999]).is_ok());
    }

    #[test]
    fn invariant_8_every_arc_minimal() {
        let oid = ObjectIdentifier::new(vec![1, 2, 840, 113549, 1, 1, 5]).unwrap();
        let tlv = oid.to_tlv();
        let reparsed = ObjectIdentifier::from_tlv(&tlv).unwrap();
        assert_eq!(reparsed, oid);
        assert_eq!(reparsed.to_tlv().encoded(), tlv.encoded());
    }
}
