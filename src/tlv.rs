//! The TLV model: a tagged union of {Primitive, Constructed} nodes, their
//! identity/equality contract, navigation, and deterministic re-encoding.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::length::encoded_length;
use crate::tag::{decode_tag, encode_tag, Tag};

/// A parsed or hand-built TLV node. Immutable: every "mutation" (e.g.
/// [`Tlv::append`]) returns a new value rather than editing in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tlv {
    Primitive { tag: Tag, value: Bytes },
    Constructed { tag: Tag, children: Vec<Tlv> },
}

impl Tlv {
    /// Builds a primitive node directly from a [`Tag`] and value octets.
    /// Infallible: a bare `Tag` carries no constructed bit to conflict with.
    pub fn primitive(tag: Tag, value: impl Into<Bytes>) -> Self {
        Tlv::Primitive {
            tag,
            value: value.into(),
        }
    }

    /// Builds a constructed node directly from a [`Tag`] and child list.
    pub fn constructed(tag: Tag, children: Vec<Tlv>) -> Self {
        Tlv::Constructed { tag, children }
    }

    /// Builds a primitive node, validating that `tag_octets` do not carry
    /// the constructed bit.
    pub fn primitive_from_tag_octets(tag_octets: &[u8], value: impl Into<Bytes>) -> Result<Self> {
        let (class, constructed, number, _) = decode_tag(tag_octets, 0)?;
        if constructed {
            return Err(Error::TypedConstructionError {
                reason: "primitive constructor given a constructed-bit tag".into(),
            });
        }
        Ok(Tlv::primitive(Tag { class, number }, value))
    }

    /// Builds a constructed node, validating that `tag_octets` carry the
    /// constructed bit.
    pub fn constructed_from_tag_octets(tag_octets: &[u8], children: Vec<Tlv>) -> Result<Self> {
        let (class, constructed, number, _) = decode_tag(tag_octets, 0)?;
        if !constructed {
            return Err(Error::TypedConstructionError {
                reason: "constructed constructor given a primitive-bit tag".into(),
            });
        }
        Ok(Tlv::constructed(Tag { class, number }, children))
    }

    pub fn tag(&self) -> Tag {
        match self {
            Tlv::Primitive { tag, .. } | Tlv::Constructed { tag, .. } => *tag,
        }
    }

    pub fn is_constructed(&self) -> bool {
        matches!(self, Tlv::Constructed { .. })
    }

    /// The raw value octets of a primitive node, or `None` for constructed.
    pub fn value(&self) -> Option<&Bytes> {
        match self {
            Tlv::Primitive { value, .. } => Some(value),
            Tlv::Constructed { .. } => None,
        }
    }

    /// The children of a constructed node, in insertion order. Always empty
    /// for a primitive node.
    pub fn children(&self) -> &[Tlv] {
        match self {
            Tlv::Constructed { children, .. } => children,
            Tlv::Primitive { .. } => &[],
        }
    }

    /// Returns the `occurrence`-th direct child matching `tag` (zero-based;
    /// `occurrence <= 0` returns the first match). Depth-one only: callers
    /// needing a deeper search compose calls themselves.
    pub fn find(&self, tag: Tag, occurrence: i64) -> Option<&Tlv> {
        let skip = occurrence.max(0) as usize;
        self.children()
            .iter()
            .filter(|c| c.tag() == tag)
            .nth(skip)
    }

    /// Appends a child to a constructed node, returning a new node. The
    /// receiver is left unchanged (value semantics).
    pub fn append(&self, child: Tlv) -> Result<Self> {
        match self {
            Tlv::Constructed { tag, children } => {
                let mut children = children.clone();
                children.push(child);
                Ok(Tlv::Constructed { tag: *tag, children })
            }
            Tlv::Primitive { .. } => Err(Error::TypedConstructionError {
                reason: "cannot append a child to a primitive node".into(),
            }),
        }
    }

    /// Deterministic DER-canonical re-encoding: tag-field, minimum-octet
    /// length-field, then the value octets (primitive) or the concatenated
    /// encodings of the children (constructed).
    pub fn encoded(&self) -> Vec<u8> {
        match self {
            Tlv::Primitive { tag, value } => {
                let mut out = encode_tag(tag.class, false, tag.number);
                out.extend(encoded_length(value.len()));
                out.extend_from_slice(value);
                out
            }
            Tlv::Constructed { tag, children } => {
                let body: Vec<u8> = children.iter().flat_map(|c| c.encoded()).collect();
                let mut out = encode_tag(tag.class, true, tag.number);
                out.extend(encoded_length(body.len()));
                out.extend(body);
                out
            }
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.encoded())
    }

    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(self.encoded())
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let data = hex::decode(s.trim()).map_err(|_| Error::MalformedTag {
            offset: 0,
            excerpt: s.chars().take(32).collect(),
        })?;
        crate::reader::read(&mut crate::source::SliceSource::new(data))
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD
            .decode(s.trim())
            .map_err(|_| Error::MalformedTag {
                offset: 0,
                excerpt: s.chars().take(32).collect(),
            })?;
        crate::reader::read(&mut crate::source::SliceSource::new(data))
    }
}
