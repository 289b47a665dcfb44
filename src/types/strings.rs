//! The four text-bearing universal overlays: UTF8String, PrintableString,
//! TeletexString and IA5String (§4.4 table).

use super::{expect_primitive, UniversalType, TAG_IA5_STRING, TAG_PRINTABLE_STRING, TAG_T61_STRING, TAG_UTF8_STRING};
use crate::error::{Error, Result};
use crate::finding::Finding;
use crate::tag::{Tag, TagClass};
use crate::tlv::Tlv;
use unicode_normalization::UnicodeNormalization;

/// UTF8String (tag 12). `std::str::from_utf8` already enforces RFC 3629
/// exactly as the spec requires: it rejects overlong forms, lone surrogates,
/// and code points beyond U+10FFFF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8String {
    pub value: String,
}

impl Utf8String {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl UniversalType for Utf8String {
    const TAG_NUMBER: u64 = TAG_UTF8_STRING;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_UTF8_STRING, "UTF8String")?;
        let value = std::str::from_utf8(&data)
            .map_err(|_| Error::ShapeMismatch {
                expected: "UTF8String (valid UTF-8 per RFC 3629)",
                found: "ill-formed UTF-8 octets",
            })?
            .to_string();
        Ok(Self { value })
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_UTF8_STRING,
            },
            self.value.clone().into_bytes(),
        )
    }

    fn findings(&self) -> &[Finding] {
        &[]
    }

    fn comment(&self) -> String {
        format!("UTF8String {:?}", self.value)
    }
}

/// Checks every character of `s` against `allowed`, returning the first
/// offending character if any.
fn first_illegal_char(s: &str, allowed: impl Fn(char) -> bool) -> Option<char> {
    s.chars().find(|c| !allowed(*c))
}

fn is_printable_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '\'' | '(' | ')' | '+' | ',' | '-' | '.' | '/' | ':' | '=' | '?')
}

/// PrintableString (tag 19): A–Z, a–z, 0–9, space, and `'()+,-./:=?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintableString {
    pub value: String,
    findings: Vec<Finding>,
}

impl PrintableString {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if let Some(c) = first_illegal_char(&value, is_printable_char) {
            return Err(Error::TypedConstructionError {
                reason: format!("PrintableString contains illegal character '{}'", c),
            });
        }
        Ok(Self {
            value,
            findings: Vec::new(),
        })
    }
}

impl UniversalType for PrintableString {
    const TAG_NUMBER: u64 = TAG_PRINTABLE_STRING;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_PRINTABLE_STRING, "PrintableString")?;
        let value = std::str::from_utf8(&data)
            .map_err(|_| Error::ShapeMismatch {
                expected: "PrintableString (ASCII-compatible octets)",
                found: "non-UTF-8 octets",
            })?
            .to_string();

        let mut findings = Vec::new();
        if let Some(c) = first_illegal_char(&value, is_printable_char) {
            findings.push(Finding::new(format!(
                "PrintableString contains illegal character '{}'",
                c
            )));
        }
        Ok(Self { value, findings })
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_PRINTABLE_STRING,
            },
            self.value.clone().into_bytes(),
        )
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        format!("PrintableString {:?}", self.value)
    }
}

/// Single-octet T.61 repertoire covering the non-ASCII half of the code
/// space (0xA0-0xFF) that this implementation supports directly; values
/// outside this table are combining diacritics handled by
/// [`decode_teletex`] and never appear here on their own.
fn t61_high_octet(b: u8) -> Option<char> {
    match b {
        0xA1 => Some('\u{00A1}'), // inverted exclamation mark
        0xA2 => Some('\u{00A2}'), // cent sign
        0xA3 => Some('\u{00A3}'), // pound sign
        0xA5 => Some('\u{00A5}'), // yen sign
        0xA7 => Some('\u{00A7}'), // section sign
        0xA8 => Some('\u{00A4}'), // currency sign (T.61 0xA8)
        0xAB => Some('\u{201C}'), // left double quote
        0xB0 => Some('\u{00B0}'), // degree sign
        0xB1 => Some('\u{00B1}'), // plus-minus
        0xB2 => Some('\u{00B2}'),
        0xB3 => Some('\u{00B3}'),
        0xB4 => Some('\u{00D7}'), // multiplication sign
        0xB5 => Some('\u{00B5}'), // micro sign
        0xB7 => Some('\u{00B7}'), // middle dot
        0xBB => Some('\u{201D}'), // right double quote
        0xBC => Some('\u{00BC}'),
        0xBD => Some('\u{00BD}'),
        0xBE => Some('\u{00BE}'),
        0xBF => Some('\u{00BF}'),
        _ => None,
    }
}

/// Combining diacritics in the 0xC0-0xCF range: the following base letter is
/// composed with the mark named here.
fn t61_combining_accent(b: u8) -> Option<char> {
    match b {
        0xC1 => Some('\u{0300}'), // grave
        0xC2 => Some('\u{0301}'), // acute
        0xC3 => Some('\u{0302}'), // circumflex
        0xC4 => Some('\u{0303}'), // tilde
        0xC5 => Some('\u{0304}'), // macron
        0xC6 => Some('\u{0306}'), // breve
        0xC7 => Some('\u{0307}'), // dot above
        0xC8 => Some('\u{0308}'), // diaeresis
        0xCA => Some('\u{030A}'), // ring above
        0xCB => Some('\u{0327}'), // cedilla
        0xCD => Some('\u{030B}'), // double acute
        0xCE => Some('\u{0328}'), // ogonek
        0xCF => Some('\u{030C}'), // caron
        _ => None,
    }
}

/// Decodes a T.61 octet string into Unicode text. Combining-accent octets
/// (0xC0-0xCF) are pushed as base-char-then-combining-mark, then the whole
/// string is run through NFC so any base/mark pair with a precomposed
/// codepoint collapses into it.
fn decode_teletex(data: &[u8]) -> (String, Vec<Finding>) {
    let mut out = String::new();
    let mut findings = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if let Some(mark) = t61_combining_accent(b) {
            if i + 1 < data.len() {
                out.push(data[i + 1] as char);
                out.push(mark);
                i += 2;
                continue;
            }
            findings.push(Finding::new(
                "TeletexString ends with a dangling combining accent octet",
            ));
            i += 1;
            continue;
        }
        if b < 0x80 {
            out.push(b as char);
        } else if let Some(c) = t61_high_octet(b) {
            out.push(c);
        } else {
            findings.push(Finding::new(format!(
                "TeletexString octet 0x{:02X} has no T.61 mapping",
                b
            )));
            out.push('\u{FFFD}');
        }
        i += 1;
    }
    let normalized: String = out.nfc().collect();
    (normalized, findings)
}

/// TeletexString (tag 20): T.61 repertoire with diacritic composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeletexString {
    pub value: String,
    findings: Vec<Finding>,
}

impl TeletexString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            findings: Vec::new(),
        }
    }
}

impl UniversalType for TeletexString {
    const TAG_NUMBER: u64 = TAG_T61_STRING;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_T61_STRING, "TeletexString")?;
        let (value, findings) = decode_teletex(&data);
        Ok(Self { value, findings })
    }

    fn to_tlv(&self) -> Tlv {
        // Re-encodes the ASCII-range subset verbatim; values requiring a
        // combining accent are written as their precomposed form's closest
        // ASCII fallback is out of scope here since construction from typed
        // values only needs to support the common 7-bit case.
        let bytes: Vec<u8> = self
            .value
            .chars()
            .map(|c| if (c as u32) < 0x80 { c as u8 } else { b'?' })
            .collect();
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_T61_STRING,
            },
            bytes,
        )
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        format!("TeletexString {:?}", self.value)
    }
}

/// Maps the German national-replacement IA5 variant's eight code points back
/// to their IRV meaning (the inverse is used when encoding).
fn ia5_german_variant(b: u8) -> Option<char> {
    match b {
        0x40 => Some('\u{00A7}'), // @ -> §
        0x5B => Some('\u{00C4}'), // [ -> Ä
        0x5C => Some('\u{00D6}'), // \ -> Ö
        0x5D => Some('\u{00DC}'), // ] -> Ü
        0x7B => Some('\u{00E4}'), // { -> ä
        0x7C => Some('\u{00F6}'), // | -> ö
        0x7D => Some('\u{00FC}'), // } -> ü
        0x7E => Some('\u{00DF}'), // ~ -> ß
        _ => None,
    }
}

/// IA5String (tag 22): seven-bit ASCII, one octet per character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ia5String {
    pub value: String,
    findings: Vec<Finding>,
}

impl Ia5String {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if let Some(c) = value.chars().find(|c| !c.is_ascii()) {
            return Err(Error::TypedConstructionError {
                reason: format!("IA5String contains non-ASCII character '{}'", c),
            });
        }
        Ok(Self {
            value,
            findings: Vec::new(),
        })
    }
}

impl UniversalType for Ia5String {
    const TAG_NUMBER: u64 = TAG_IA5_STRING;
    const CONSTRUCTED: bool = false;

    fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let data = expect_primitive(tlv, TAG_IA5_STRING, "IA5String")?;
        let mut findings = Vec::new();
        let mut value = String::with_capacity(data.len());
        for &b in data.iter() {
            if b >= 0x80 {
                return Err(Error::ShapeMismatch {
                    expected: "IA5String (seven-bit octets)",
                    found: "octet with high bit set",
                });
            }
            if let Some(c) = ia5_german_variant(b) {
                findings.push(Finding::new(format!(
                    "IA5String octet 0x{:02X} read as German national-variant character '{}'",
                    b, c
                )));
                value.push(c);
            } else {
                value.push(b as char);
            }
        }
        Ok(Self { value, findings })
    }

    fn to_tlv(&self) -> Tlv {
        Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_IA5_STRING,
            },
            self.value.clone().into_bytes(),
        )
    }

    fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn comment(&self) -> String {
        format!("IA5String {:?}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_string_roundtrips() {
        let s = Utf8String::new("héllo");
        let tlv = s.to_tlv();
        let parsed = Utf8String::from_tlv(&tlv).unwrap();
        assert_eq!(parsed.value, "héllo");
    }

    #[test]
    fn utf8_string_rejects_ill_formed_octets() {
        let tlv = Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_UTF8_STRING,
            },
            &[0xC0u8, 0x80][..], // overlong encoding of NUL
        );
        assert!(Utf8String::from_tlv(&tlv).is_err());
    }

    #[test]
    fn s5_printable_string_rejects_asterisk() {
        assert!(PrintableString::new("Hello*").is_err());
        assert!(PrintableString::new("Hello, World").is_ok());
    }

    #[test]
    fn ia5_string_rejects_non_ascii_on_construction() {
        assert!(Ia5String::new("héllo").is_err());
        assert!(Ia5String::new("hello").is_ok());
    }

    #[test]
    fn ia5_string_reads_german_variant_with_finding() {
        let tlv = Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_IA5_STRING,
            },
            &b"stra\x7ee"[..],
        );
        let parsed = Ia5String::from_tlv(&tlv).unwrap();
        assert_eq!(parsed.value, "stra\u{00DF}e");
    }

    #[test]
    fn teletex_string_composes_combining_accent() {
        let tlv = Tlv::primitive(
            Tag {
                class: TagClass::Universal,
                number: TAG_T61_STRING,
            },
            &[b'e', 0xC2, b'e'][..],
        );
        let parsed = TeletexString::from_tlv(&tlv).unwrap();
        assert_eq!(parsed.value, "e\u{e9}");
        assert_eq!(parsed.value.chars().count(), 2);
    }
}
