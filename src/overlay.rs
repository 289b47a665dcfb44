//! Aggregates every universal-type overlay behind one enum so a caller can
//! dispatch on a [`Tlv`]'s tag without knowing which overlay it expects,
//! plus `as_*` convenience accessors directly on [`Tlv`] for the common case
//! where the caller does know.

use crate::error::Result;
use crate::tag::TagClass;
use crate::tlv::Tlv;
use crate::types::{
    BitString, Boolean, Date, EndOfContent, Ia5String, Integer, Null, ObjectIdentifier,
    OctetString, PrintableString, Sequence, Set, TeletexString, UniversalType, Utf8String,
    UtcTime,
};

/// A typed view over a [`Tlv`] chosen by its tag. `Other` covers generic
/// nodes: non-universal tags, and universal tags whose shape doesn't match
/// the overlay's contract (e.g. a primitive node tagged SEQUENCE).
#[derive(Debug, Clone)]
pub enum Overlay {
    EndOfContent(EndOfContent),
    Boolean(Boolean),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null(Null),
    Oid(ObjectIdentifier),
    Utf8String(Utf8String),
    Sequence(Sequence),
    Set(Set),
    PrintableString(PrintableString),
    TeletexString(TeletexString),
    Ia5String(Ia5String),
    UtcTime(UtcTime),
    Date(Date),
    Other(Tlv),
}

macro_rules! try_overlay {
    ($tlv:expr, $variant:ident, $ty:ty) => {
        if $tlv.tag().class == TagClass::Universal
            && $tlv.tag().number == <$ty as UniversalType>::TAG_NUMBER
            && $tlv.is_constructed() == <$ty as UniversalType>::CONSTRUCTED
        {
            if let Ok(value) = <$ty as UniversalType>::from_tlv($tlv) {
                return Overlay::$variant(value);
            }
        }
    };
}

impl Overlay {
    /// Dispatches `tlv` to the overlay matching its tag and shape. Never
    /// fails: a tag that isn't universal, or whose value doesn't parse
    /// under its nominal overlay, falls back to [`Overlay::Other`].
    pub fn from_tlv(tlv: &Tlv) -> Overlay {
        try_overlay!(tlv, EndOfContent, EndOfContent);
        try_overlay!(tlv, Boolean, Boolean);
        try_overlay!(tlv, Integer, Integer);
        try_overlay!(tlv, BitString, BitString);
        try_overlay!(tlv, OctetString, OctetString);
        try_overlay!(tlv, Null, Null);
        try_overlay!(tlv, Oid, ObjectIdentifier);
        try_overlay!(tlv, Utf8String, Utf8String);
        try_overlay!(tlv, Sequence, Sequence);
        try_overlay!(tlv, Set, Set);
        try_overlay!(tlv, PrintableString, PrintableString);
        try_overlay!(tlv, TeletexString, TeletexString);
        try_overlay!(tlv, Ia5String, Ia5String);
        try_overlay!(tlv, UtcTime, UtcTime);
        try_overlay!(tlv, Date, Date);
        Overlay::Other(tlv.clone())
    }

    pub fn comment(&self) -> String {
        match self {
            Overlay::EndOfContent(v) => v.comment(),
            Overlay::Boolean(v) => v.comment(),
            Overlay::Integer(v) => v.comment(),
            Overlay::BitString(v) => v.comment(),
            Overlay::OctetString(v) => v.comment(),
            Overlay::Null(v) => v.comment(),
            Overlay::Oid(v) => v.comment(),
            Overlay::Utf8String(v) => v.comment(),
            Overlay::Sequence(v) => v.comment(),
            Overlay::Set(v) => v.comment(),
            Overlay::PrintableString(v) => v.comment(),
            Overlay::TeletexString(v) => v.comment(),
            Overlay::Ia5String(v) => v.comment(),
            Overlay::UtcTime(v) => v.comment(),
            Overlay::Date(v) => v.comment(),
            Overlay::Other(tlv) => format!(
                "{:?} ({})",
                tlv.tag(),
                if tlv.is_constructed() { "constructed" } else { "primitive" }
            ),
        }
    }
}

/// Typed accessors on the generic TLV tree (§6 "Navigate"). Each fails with
/// [`crate::error::Error::ShapeMismatch`] if the node's tag or shape does
/// not match.
impl Tlv {
    pub fn as_boolean(&self) -> Result<Boolean> {
        Boolean::from_tlv(self)
    }

    pub fn as_integer(&self) -> Result<Integer> {
        Integer::from_tlv(self)
    }

    pub fn as_bit_string(&self) -> Result<BitString> {
        BitString::from_tlv(self)
    }

    pub fn as_octet_string(&self) -> Result<OctetString> {
        OctetString::from_tlv(self)
    }

    pub fn as_null(&self) -> Result<Null> {
        Null::from_tlv(self)
    }

    pub fn as_oid(&self) -> Result<ObjectIdentifier> {
        ObjectIdentifier::from_tlv(self)
    }

    pub fn as_utf8_string(&self) -> Result<Utf8String> {
        Utf8String::from_tlv(self)
    }

    pub fn as_sequence(&self) -> Result<Sequence> {
        Sequence::from_tlv(self)
    }

    pub fn as_set(&self) -> Result<Set> {
        Set::from_tlv(self)
    }

    pub fn as_printable_string(&self) -> Result<PrintableString> {
        PrintableString::from_tlv(self)
    }

    pub fn as_teletex_string(&self) -> Result<TeletexString> {
        TeletexString::from_tlv(self)
    }

    pub fn as_ia5_string(&self) -> Result<Ia5String> {
        Ia5String::from_tlv(self)
    }

    pub fn as_utc_time(&self) -> Result<UtcTime> {
        UtcTime::from_tlv(self)
    }

    pub fn as_date(&self) -> Result<Date> {
        Date::from_tlv(self)
    }

    /// Dispatches to whichever universal overlay matches this node's tag
    /// and shape, or [`Overlay::Other`] otherwise.
    pub fn overlay(&self) -> Overlay {
        Overlay::from_tlv(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_integer_by_tag() {
        let tlv = Tlv::from_hex("020105").unwrap();
        assert!(matches!(Overlay::from_tlv(&tlv), Overlay::Integer(_)));
    }

    #[test]
    fn falls_back_to_other_for_context_specific_tag() {
        let tlv = Tlv::from_hex("8103010203").unwrap();
        assert!(matches!(Overlay::from_tlv(&tlv), Overlay::Other(_)));
    }

    #[test]
    fn as_integer_accessor_matches_dispatch() {
        let tlv = Tlv::from_hex("020107").unwrap();
        assert_eq!(tlv.as_integer().unwrap().value, num_bigint::BigInt::from(7));
    }
}
