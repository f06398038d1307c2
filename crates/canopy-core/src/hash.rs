//! Content, signature, and ruleset hashing (spec §3, §4.3 step 8, §6.3, §9).

use sha2::{Digest, Sha256};
use xxhash_rust::xxh64::xxh64;

/// Fast, non-cryptographic hash of file bytes used purely for change detection
/// (spec §4.3 step 1: skip extraction when unchanged).
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:016x}", xxh64(bytes, 0))
}

/// A symbol's identity for signature hashing, canonically serialized before
/// hashing so that renames of local variables or reordering of unordered
/// attributes do not change the hash (spec §8 property 6 / §9).
pub struct SymbolIdentity<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    pub visibility: &'a str,
    pub modifiers: &'a [String],
    /// `(name, kind)` pairs, member ordering is not significant.
    pub members: &'a [(String, String)],
    /// Parameter type expressions in ordinal order — ordering *is* significant.
    pub params: &'a [Option<String>],
    /// Type parameter names in ordinal order.
    pub type_params: &'a [String],
}

/// Deterministically canonicalize a symbol's identity and hash it with
/// SHA-256 (spec §4.3 step 8: "sort modifiers alphabetically, members by
/// (name, kind), params by ordinal").
pub fn signature_hash(identity: &SymbolIdentity<'_>) -> String {
    let mut modifiers: Vec<&str> = identity.modifiers.iter().map(String::as_str).collect();
    modifiers.sort_unstable();

    let mut members: Vec<&(String, String)> = identity.members.iter().collect();
    members.sort_unstable_by(|a, b| a.cmp(b));

    let mut canonical = String::new();
    canonical.push_str(identity.kind);
    canonical.push('\0');
    canonical.push_str(identity.name);
    canonical.push('\0');
    canonical.push_str(identity.visibility);
    canonical.push('\0');
    canonical.push_str(&modifiers.join(","));
    canonical.push('\0');
    for (name, kind) in &members {
        canonical.push_str(name);
        canonical.push(':');
        canonical.push_str(kind);
        canonical.push(';');
    }
    canonical.push('\0');
    for p in identity.params {
        canonical.push_str(p.as_deref().unwrap_or(""));
        canonical.push(';');
    }
    canonical.push('\0');
    canonical.push_str(&identity.type_params.join(","));

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// SHA-256 over the sorted concatenation of every bundled extraction/resolution
/// rule's identifier and content, used to force a full re-index when the
/// language programs themselves change (spec §6.3, §9).
pub fn ruleset_hash<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut pairs: Vec<(&str, &str)> = entries.into_iter().collect();
    pairs.sort_unstable_by_key(|(id, _)| *id);

    let mut hasher = Sha256::new();
    for (id, content) in pairs {
        hasher.update(id.as_bytes());
        hasher.update(b"\0");
        hasher.update(content.as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}

/// Minimal hex encoding so we don't pull in the `hex` crate for ~20 lines.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut out = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }
}
