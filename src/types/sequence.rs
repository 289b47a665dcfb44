//! SEQUENCE (tag 0x10) and SET (tag 0x11) overlays: the two constructed
//! universal types.

use super::{expect_constructed, UniversalType, TAG_SEQUENCE, TAG_SET};
use crate::error::{Error, Result};
use crate::finding::Finding;
use crate::tag::{Tag, TagClass};
use crate::tlv::Tlv;

/// An ordered child list with no ordering constraint on re-encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub children: Vec<Tlv>,
}

impl Sequence {
    pub fn new(children: Vec<Tlv>) -> Self {
        Self { children }
    }
}

impl UniversalType for Sequence {
    const TAG_NUMBER: u64 = TAG_SEQUENCE;
    const CONSTRUCTED: bool = true;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let children = expect_constructed(tlv, TAG_SEQUENCE, "SEQUENCE")?;
        Ok(Self {
            children: children.to_vec(),
        })
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::constructed(
            Tag {
                class: TagClass::Universal,
                number: TAG_SEQUENCE,
            },
            self.children.clone(),
        )
    }

    fn findings(&self) -> &[Finding] {
        &[]
    }

    fn comment(&self) -> String {
        format!("SEQUENCE ({} elements)", self.children.len())
    }
}

/// A child list re-emitted in DER tag order with duplicate tags rejected on
/// construction-from-typed and merely noted as a finding on parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    children: Vec<Tlv>,
    findings: Vec<Finding>,
}

impl Set {
    /// Sorts `children` into DER order, raising if any two share a tag.
    pub fn new(mut children: Vec<Tlv>) -> Result<Self> {
        children.sort_by_key(|c| c.tag());
        if children.windows(2).any(|w| w[0].tag() == w[1].tag()) {
            return Err(Error::TypedConstructionError {
                reason: "SET cannot contain two children with the same tag".into(),
            });
        }
        Ok(Self {
            children,
            findings: Vec::new(),
        })
    }

    pub fn children(&self) -> &[Tlv] {
        &self.children
    }
}

impl UniversalType for Set {
    const TAG_NUMBER: u64 = TAG_SET;
    const CONSTRUCTED: bool = true;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let parsed = expect_constructed(tlv, TAG_SET, "SET")?;
        let mut findings = Vec::new();

        let is_sorted = parsed
            .windows(2)
            .all(|w| w[0].tag() <= w[1].tag());
        if !is_sorted {
            findings.push(Finding::new(
                "SET children are not in ascending DER tag order",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        let mut children = Vec::with_capacity(parsed.len());
        for child in parsed {
            if seen.insert(child.tag()) {
                children.push(child.clone());
            } else {
                findings.push(Finding::new(format!(
                    "SET drops duplicate child with tag {:?} (first occurrence kept)",
                    child.tag()
                )));
            }
        }

        Ok(Self { children, findings })
    }

    fn to_tlv(&self) -> Tlv {
        let mut children = self.children.clone();
        children.sort_by_key(|c| c.tag());
        Tlv::constructed(
            Tag {
                class: TagClass::Universal,
                number: TAG_SET,
            },
            children,
        )
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        format!("SET ({} elements)", self.children.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Integer, OctetString};

    #[test]
    fn sequence_preserves_insertion_order() {
        let seq = Sequence::new(vec![
            Integer::new(1).to_tlv(),
            Integer::new(2).to_tlv(),
        ]);
        assert_eq!(seq.to_tlv().children().len(), 2);
    }

    #[test]
    fn s6_duplicate_tags_raise_on_construction() {
        let one = Integer::new(1).to_tlv();
        assert!(Set::new(vec![one.clone(), one.clone(), one]).is_err());
    }

    #[test]
    fn s6_mixed_tags_sort_into_der_order() {
        let set = Set::new(vec![
            OctetString::new(&b"\xAA"[..]).to_tlv(),
            Integer::new(1).to_tlv(),
        ])
        .unwrap();
        assert_eq!(set.to_tlv().to_hex(), "31060201010401aa");
    }

    #[test]
    fn duplicate_tags_on_parse_keep_first_and_record_finding() {
        let raw = Tlv::constructed(
            Tag {
                class: TagClass::Universal,
                number: TAG_SET,
            },
            vec![
                Integer::new(1).to_tlv(),
                Integer::new(2).to_tlv(),
            ],
        );
        let set = Set::from_tlv(&raw).unwrap();
        assert_eq!(set.children().len(), 1);
        assert_eq!(set.findings().len(), 1);
    }
}
