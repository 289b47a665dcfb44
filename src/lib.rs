//! BER/DER TLV codec for ASN.1-encoded binary objects (ISO/IEC 8825-1).
//!
//! Five cooperating pieces, leaves first: the tag codec ([`tag`]), the
//! length codec ([`length`]), the generic TLV model ([`tlv`]), the
//! universal-type overlays ([`types`], aggregated by [`overlay`]), and the
//! reader front-end ([`reader`]) that drives them all from an octet
//! [`source`].

pub mod error;
pub mod finding;
pub mod length;
pub mod overlay;
pub mod reader;
pub mod render;
pub mod source;
pub mod tag;
pub mod tlv;
pub mod types;

pub use error::{Error, Result};
pub use finding::Finding;
pub use overlay::Overlay;
pub use reader::parse_slice;
pub use source::{CursorSource, ReaderSource, Source, SliceSource};
pub use tag::{Tag, TagClass};
pub use tlv::Tlv;
