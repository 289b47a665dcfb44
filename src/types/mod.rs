//! Universal-type overlays (§4.4): typed, finding-aware views over a
//! primitive or constructed [`Tlv`](crate::tlv::Tlv) whose tag matches one
//! of the fourteen universal ASN.1 types this crate knows about.
//!
//! Each overlay is built from a `Tlv` via `from_tlv` (parsing, which
//! records deviations as findings instead of failing) or from a typed
//! value via a constructor (which raises [`crate::error::Error::TypedConstructionError`]
//! on the same deviations).

pub mod bitstring;
pub mod integer;
pub mod oid;
pub mod sequence;
pub mod strings;
pub mod time;

pub use bitstring::BitString;
pub use integer::Integer;
pub use oid::ObjectIdentifier;
pub use sequence::{Sequence, Set};
pub use strings::{Ia5String, PrintableString, TeletexString, Utf8String};
pub use time::{Date, UtcTime};

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::finding::Finding;
use crate::tag::{Tag, TagClass};
use crate::tlv::Tlv;

pub const TAG_END_OF_CONTENT: u64 = 0;
pub const TAG_BOOLEAN: u64 = 1;
pub const TAG_INTEGER: u64 = 2;
pub const TAG_BIT_STRING: u64 = 3;
pub const TAG_OCTET_STRING: u64 = 4;
pub const TAG_NULL: u64 = 5;
pub const TAG_OBJECT_IDENTIFIER: u64 = 6;
pub const TAG_UTF8_STRING: u64 = 12;
pub const TAG_SEQUENCE: u64 = 0x10;
pub const TAG_SET: u64 = 0x11;
pub const TAG_PRINTABLE_STRING: u64 = 19;
pub const TAG_T61_STRING: u64 = 20;
pub const TAG_IA5_STRING: u64 = 22;
pub const TAG_UTC_TIME: u64 = 23;
/// DATE (tag 31 in the 2015 X.680 revision). Tag number 31 sits exactly on
/// the short-form/long-form boundary, so its wire identifier octets are
/// `1F 1F` (universal, primitive, long-form number 31) — the two-octet
/// spelling §4.4's contract table writes as `0x1F1F`; see [`time::Date`].
pub const TAG_DATE: u64 = 31;

/// Shared shape for every universal-type overlay: a decoded value, a set of
/// parse-time findings, and a human-readable comment for the text renderer.
pub trait UniversalType: Sized {
    /// The universal tag-number this overlay wraps.
    const TAG_NUMBER: u64;
    /// Whether the wire shape is constructed (SEQUENCE, SET) or primitive.
    const CONSTRUCTED: bool;

    /// Parses `tlv` into this overlay. Fails with [`Error::ShapeMismatch`]
    /// if the tag/shape don't match; conformance deviations become
    /// findings, not errors.
    fn from_tlv(tlv: &Tlv) -> Result<Self>;

    /// Re-encodes this overlay as a generic TLV node.
    fn to_tlv(&self) -> Tlv;

    /// Non-fatal deviations noted while parsing (always empty for a value
    /// built from a typed constructor).
    fn findings(&self) -> &[Finding];

    /// A short human-readable description for the commented tree render.
    fn comment(&self) -> String;
}

fn universal_tag(number: u64) -> Tag {
    Tag {
        class: TagClass::Universal,
        number,
    }
}

/// Checks that `tlv` has the expected universal tag and shape, returning its
/// value octets (for primitives).
fn expect_primitive(tlv: &Tlv, number: u64, type_name: &'static str) -> Result<Bytes> {
    if tlv.tag() != universal_tag(number) || tlv.is_constructed() {
        return Err(Error::ShapeMismatch {
            expected: type_name,
            found: "different tag or shape",
        });
    }
    Ok(tlv.value().expect("primitive checked above").clone())
}

fn expect_constructed<'a>(
    tlv: &'a Tlv,
    number: u64,
    type_name: &'static str,
) -> Result<&'a [Tlv]> {
    if tlv.tag() != universal_tag(number) || !tlv.is_constructed() {
        return Err(Error::ShapeMismatch {
            expected: type_name,
            found: "different tag or shape",
        });
    }
    Ok(tlv.children())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boolean {
    pub value: bool,
    findings: Vec<Finding>,
}

impl Boolean {
    pub fn new(value: bool) -> Self {
        Self {
            value,
            findings: Vec::new(),
        }
    }
}

impl UniversalType for Boolean {
    const TAG_NUMBER: u64 = TAG_BOOLEAN;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_BOOLEAN, "BOOLEAN")?;
        if data.len() != 1 {
            return Err(Error::ShapeMismatch {
                expected: "BOOLEAN (one octet)",
                found: "value-field of different length",
            });
        }
        let mut findings = Vec::new();
        let value = match data[0] {
            0x00 => false,
            0xFF => true,
            other => {
                findings.push(Finding::new(format!(
                    "non-canonical BOOLEAN true byte 0x{:02X}",
                    other
                )));
                true
            }
        };
        Ok(Self { value, findings })
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(universal_tag(TAG_BOOLEAN), &[if self.value { 0xFFu8 } else { 0x00 }][..])
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        format!("BOOLEAN {}", self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Null;

impl UniversalType for Null {
    const TAG_NUMBER: u64 = TAG_NULL;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_NULL, "NULL")?;
        if !data.is_empty() {
            return Err(Error::ShapeMismatch {
                expected: "NULL (empty value)",
                found: "non-empty value-field",
            });
        }
        Ok(Null)
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(universal_tag(TAG_NULL), &b""[..])
    }

    fn findings(&self) -> &[Finding] {
        &[]
    }

    fn comment(&self) -> String {
        "NULL".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    pub bytes: Bytes,
}

impl OctetString {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl UniversalType for OctetString {
    const TAG_NUMBER: u64 = TAG_OCTET_STRING;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let bytes = expect_primitive(tlv, TAG_OCTET_STRING, "OCTET STRING")?;
        Ok(Self { bytes })
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(universal_tag(TAG_OCTET_STRING), self.bytes.clone())
    }

    fn findings(&self) -> &[Finding] {
        &[]
    }

    fn comment(&self) -> String {
        format!("OCTET STRING ({} bytes)", self.bytes.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfContent;

impl UniversalType for EndOfContent {
    const TAG_NUMBER: u64 = TAG_END_OF_CONTENT;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_END_OF_CONTENT, "End-of-Content")?;
        if !data.is_empty() {
            return Err(Error::ShapeMismatch {
                expected: "End-of-Content (empty value)",
                found: "non-empty value-field",
            });
        }
        Ok(EndOfContent)
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(universal_tag(TAG_END_OF_CONTENT), &b""[..])
    }

    fn findings(&self) -> &[Finding] {
        &[]
    }

    fn comment(&self) -> String {
        "EOC".to_string()
    }
}
