//! Text-render formats (§6): compact, indented tree, and commented tree.

use crate::tag::Tag;
use crate::tlv::Tlv;
use crate::types::oid::ObjectIdentifier;
use crate::overlay::Overlay;

fn tag_octets(tag: Tag, constructed: bool) -> Vec<u8> {
    crate::tag::encode_tag(tag.class, constructed, tag.number)
}

fn header_hex(tlv: &Tlv) -> String {
    let tag_hex = hex::encode(tag_octets(tlv.tag(), tlv.is_constructed()));
    match tlv {
        Tlv::Primitive { value, .. } => {
            let len_hex = hex::encode(crate::length::encoded_length(value.len()));
            format!("{} {} {}", tag_hex, len_hex, hex::encode(value))
        }
        Tlv::Constructed { children, .. } => {
            let body_len: usize = children.iter().map(|c| c.encoded().len()).sum();
            let len_hex = hex::encode(crate::length::encoded_length(body_len));
            format!("{} {}", tag_hex, len_hex)
        }
    }
}

/// A compact single-line rendering: tag-field, length-field and value
/// octets (or, for constructed nodes, each child's compact rendering) space
/// separated.
pub fn render_compact(tlv: &Tlv) -> String {
    match tlv {
        Tlv::Primitive { .. } => header_hex(tlv),
        Tlv::Constructed { .. } => {
            let mut parts = vec![header_hex(tlv)];
            parts.extend(tlv.children().iter().map(render_compact));
            parts.join(" ")
        }
    }
}

fn indent_marker(prefix: &str, depth: usize) -> String {
    if prefix == "\n" {
        format!("\n{}", depth)
    } else {
        prefix.repeat(depth)
    }
}

fn render_tree_at(tlv: &Tlv, prefix: &str, depth: usize) -> String {
    let mut out = header_hex(tlv);
    for child in tlv.children() {
        out.push_str(&indent_marker(prefix, depth + 1));
        out.push_str(&render_tree_at(child, prefix, depth + 1));
    }
    out
}

/// An indented tree rendering. `prefix` is inserted once per nesting level
/// before each child; the special case `prefix == "\n"` swaps the repeated
/// prefix for a numbered depth marker (`"\n1"`, `"\n2"`, ...) so
/// mechanically-generated output can be de-indented without counting
/// repeated newlines.
pub fn render_tree(tlv: &Tlv, prefix: &str) -> String {
    render_tree_at(tlv, prefix, 0)
}

fn render_commented_at(tlv: &Tlv, prefix: &str, depth: usize) -> String {
    let mut out = format!("{} # {}", header_hex(tlv), comment_for(tlv));

    if let Tlv::Primitive { tag, value } = tlv {
        if *tag == Tag::universal(crate::types::TAG_OCTET_STRING) {
            if let Ok(nested) = crate::reader::parse_slice(value.clone()) {
                out.push_str(&indent_marker(prefix, depth + 1));
                out.push_str("# nested TLV:");
                out.push_str(&indent_marker(prefix, depth + 1));
                out.push_str(&render_commented_at(&nested, prefix, depth + 1));
                return out;
            }
        }
    }

    for child in tlv.children() {
        out.push_str(&indent_marker(prefix, depth + 1));
        out.push_str(&render_commented_at(child, prefix, depth + 1));
    }
    out
}

/// Like [`render_tree`] but appends `" # <description>"` to every node;
/// OCTET STRING values whose bytes parse as a nested TLV are shown as a
/// commented sub-tree instead of a raw hex dump.
pub fn render_commented(tlv: &Tlv, prefix: &str) -> String {
    render_commented_at(tlv, prefix, 0)
}

fn comment_for(tlv: &Tlv) -> String {
    match Overlay::from_tlv(tlv) {
        Overlay::Other(_) => format!(
            "{:?} ({})",
            tlv.tag(),
            if tlv.is_constructed() { "constructed" } else { "primitive" }
        ),
        overlay => overlay.comment(),
    }
}

/// Well-known OID dotted strings seeded for the commented render, mirroring
/// the hard-coded CVC/PKI registries the broader repository carries for
/// human-readable certificate dumps. Presentation-only: never consulted by
/// parsing or encoding.
pub fn friendly_name(oid: &ObjectIdentifier) -> Option<&'static str> {
    match oid.to_dotted_string().as_str() {
        "1.2.840.113549.1.1.1" => Some("rsaEncryption"),
        "1.2.840.113549.1.1.5" => Some("sha1WithRSAEncryption"),
        "1.2.840.113549.1.1.11" => Some("sha256WithRSAEncryption"),
        "1.2.840.10045.2.1" => Some("ecPublicKey"),
        "1.2.840.10045.4.3.2" => Some("ecdsaWithSHA256"),
        "2.5.4.3" => Some("commonName"),
        "2.5.4.6" => Some("countryName"),
        "2.5.4.10" => Some("organizationName"),
        "2.5.29.15" => Some("keyUsage"),
        "2.5.29.19" => Some("basicConstraints"),
        _ => None,
    }
}
