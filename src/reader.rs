//! Reader front-end: turns an octet source into a [`Tlv`] tree.
//!
//! The structural parse is tag-agnostic — it never looks past the
//! primitive/constructed bit. Dispatching a parsed node to a specific
//! universal-type overlay (§4.4) is a separate, lazy step a caller performs
//! afterwards via [`crate::overlay::Overlay::from_tlv`] or the `as_*`
//! helpers on [`Tlv`]; the TLV tree itself is always the source of truth.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::length::{decode_length, Length};
use crate::source::{Source, SliceSource};
use crate::tag::{decode_tag, Tag};
use crate::tlv::Tlv;

const END_OF_CONTENT_TAG: u64 = 0;

/// Reads one complete TLV node from `source`.
///
/// On a transient underflow (the source simply hasn't produced enough
/// octets yet) the source's read position is restored to where it stood
/// before this call, so a caller feeding a [`crate::source::CursorSource`]
/// incrementally can retry once more data arrives.
pub fn read<S: Source>(source: &mut S) -> Result<Tlv> {
    let mark = source.mark();
    log::trace!("read: entering at offset {}", mark);
    let result = read_inner(source);
    match &result {
        Ok(tlv) => log::trace!("read: produced {:?} ending at offset {}", tlv.tag(), source.offset()),
        Err(e) if e.is_truncated() => {
            log::trace!("read: truncated at offset {}, resetting to {}", source.offset(), mark);
            source.reset(mark);
        }
        Err(e) => log::debug!("read: failed at offset {}: {}", mark, e),
    }
    result
}

fn read_inner<S: Source>(source: &mut S) -> Result<Tlv> {
    let (tag, constructed, header_len) = read_identifier(source)?;
    let length = read_length(source)?;

    if constructed {
        let children = match length {
            Length::Indefinite => read_children_indefinite(source)?,
            Length::Short(_) | Length::Long(_) => {
                let n = length.value().unwrap();
                read_children_definite(source, n)?
            }
        };
        Ok(Tlv::Constructed { tag, children })
    } else {
        match length {
            Length::Indefinite => Err(Error::MalformedLength {
                offset: source.offset().saturating_sub(header_len),
                excerpt: String::new(),
            }),
            Length::Short(_) | Length::Long(_) => {
                let n = length.value().unwrap();
                let value = source.read_exact(n)?;
                Ok(Tlv::Primitive { tag, value })
            }
        }
    }
}

fn read_identifier<S: Source>(source: &mut S) -> Result<(Tag, bool, usize)> {
    let start = source.offset();
    let first = source.read_u8()?;

    if first & 0x1F != 0x1F {
        let (class, constructed, number, consumed) = decode_tag(&[first], start)?;
        return Ok((Tag { class, number }, constructed, consumed));
    }

    // Long form: pull continuation octets one at a time until one has the
    // high bit clear, capping at MAX_TAG_OCTETS total.
    let mut probe = vec![first];
    while probe.len() < crate::tag::MAX_TAG_OCTETS {
        let b = source.read_u8()?;
        let finished = b & 0x80 == 0;
        probe.push(b);
        if finished {
            break;
        }
    }

    let (class, constructed, number, consumed) = decode_tag(&probe, start)?;
    Ok((Tag { class, number }, constructed, consumed))
}

fn read_length<S: Source>(source: &mut S) -> Result<Length> {
    let start = source.offset();
    let first = source.read_u8()?;

    if first & 0x80 == 0 || first == 0x80 {
        let (length, _) = decode_length(&[first], start)?;
        return Ok(length);
    }

    let k = (first & 0x7F) as usize;
    if k == 127 {
        return Err(Error::MalformedLength {
            offset: start,
            excerpt: crate::error::hex_excerpt(&[first]),
        });
    }

    let mut probe = Vec::with_capacity(1 + k);
    probe.push(first);
    probe.extend_from_slice(&source.read_exact(k)?);

    let (length, _) = decode_length(&probe, start)?;
    Ok(length)
}

fn read_children_definite<S: Source>(source: &mut S, len: usize) -> Result<Vec<Tlv>> {
    let start = source.offset();
    let mut children = Vec::new();
    while source.offset() - start < len {
        let before = source.offset();
        let child = read(source)?;
        children.push(child);
        if source.offset() - start > len {
            return Err(Error::LengthOverflow {
                offset: before,
                excerpt: String::new(),
            });
        }
    }
    Ok(children)
}

fn read_children_indefinite<S: Source>(source: &mut S) -> Result<Vec<Tlv>> {
    let mut children = Vec::new();
    loop {
        let mark = source.mark();
        let (tag, constructed, _) = read_identifier(source)?;
        let length = read_length(source)?;

        if tag.number == END_OF_CONTENT_TAG
            && tag.class == crate::tag::TagClass::Universal
            && !constructed
            && length == Length::Short(0)
        {
            break;
        }

        source.reset(mark);
        children.push(read(source)?);
    }
    Ok(children)
}

/// Reads a TLV from an already-materialized byte slice.
pub fn parse_slice(data: impl Into<Bytes>) -> Result<Tlv> {
    read(&mut SliceSource::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagClass;

    #[test]
    fn s1_two_integers_in_sequence() {
        let data = hex::decode("3006020105020107").unwrap();
        let t = parse_slice(data).unwrap();
        assert_eq!(t.tag(), Tag::universal(0x10));
        assert!(t.is_constructed());
        assert_eq!(t.children().len(), 2);
        assert_eq!(t.children()[0].value().unwrap().as_ref(), b"\x05");
        assert_eq!(t.children()[1].value().unwrap().as_ref(), b"\x07");
    }

    #[test]
    fn s2_indefinite_length_sequence_becomes_definite_on_reencode() {
        let data = hex::decode("3080020101 0000".replace(' ', "").as_str()).unwrap();
        let t = parse_slice(data).unwrap();
        assert_eq!(t.children().len(), 1);
        assert_eq!(t.to_hex(), "3003020101");
    }

    #[test]
    fn s3_oid_roundtrips() {
        let data = hex::decode("06062a864886f70d").unwrap();
        let t = parse_slice(data.clone()).unwrap();
        assert_eq!(t.tag(), Tag::universal(6));
        assert_eq!(t.encoded(), data);
    }

    #[test]
    fn truncated_source_leaves_cursor_retryable() {
        use crate::source::CursorSource;
        let mut src = CursorSource::new();
        src.feed(&[0x30, 0x03, 0x02, 0x01]);
        let mark = src.mark();
        let err = read(&mut src).unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(src.mark(), mark);
        src.feed(&[0x05]);
        let t = read(&mut src).unwrap();
        assert_eq!(t.tag(), Tag::universal(0x10));
    }

    #[test]
    fn context_specific_tags_parse_too() {
        let data = hex::decode("8103010203").unwrap();
        let t = parse_slice(data).unwrap();
        assert_eq!(t.tag(), Tag { class: TagClass::ContextSpecific, number: 1 });
    }
}
