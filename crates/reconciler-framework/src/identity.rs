//! # Identity Codec
//!
//! Every managed resource is addressed remotely by a composite key: an ordered tuple of
//! non-empty strings such as `(instance_id, bot_name, lex_region)`. The orchestrator stores
//! that key as one opaque string, so this module provides the serialize/deserialize pair
//! between [`ResourceIdentity`] and its string form.
//!
//! ## Wire Format
//!
//! Parts are joined with [`DELIMITER`] (`:`). A part that itself contains `:` or `\` is
//! escaped (`\:` and `\\`), so ARNs and other colon-bearing values survive a round trip.
//! Parts without those characters encode bit-exactly:
//!
//! ```rust
//! use reconciler_framework::identity::{decode, encode};
//!
//! let raw = encode(&["i-1", "bot-a", "us-east-1"]).unwrap();
//! assert_eq!(raw, "i-1:bot-a:us-east-1");
//!
//! let identity = decode(&raw, 3).unwrap();
//! assert_eq!(identity.parts(), ["i-1", "bot-a", "us-east-1"]);
//! ```
//!
//! ## Invariants
//!
//! - Every component is non-empty. [`ResourceIdentity::new`] rejects empty parts up front,
//!   so an identity that exists can always be encoded.
//! - Decoding checks the part count against the resource type's [`IdentityFormat`];
//!   extra delimiters are an error, not folded into the last part.
//! - `decode(encode(parts)) == parts` for every valid `parts`.

use std::fmt;

/// Separator between identity parts.
pub const DELIMITER: char = ':';

const ESCAPE: char = '\\';

/// Errors produced while building or decoding an identity.
///
/// All variants render with the `malformed identity` prefix; callers treat them as fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("malformed identity: no components")]
    NoComponents,
    #[error("malformed identity: component {position} is empty")]
    EmptyComponent { position: usize },
    #[error("malformed identity {raw:?}: expected {expected} parts ({format}), found {found}")]
    WrongPartCount {
        raw: String,
        expected: usize,
        found: usize,
        format: String,
    },
    #[error("malformed identity {raw:?}: invalid escape sequence")]
    InvalidEscape { raw: String },
}

/// Composite key addressing exactly one remote object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentity {
    parts: Vec<String>,
}

impl ResourceIdentity {
    /// Builds an identity from its ordered parts, rejecting empty components.
    pub fn new<I, S>(parts: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(IdentityError::NoComponents);
        }
        if let Some(position) = parts.iter().position(String::is_empty) {
            return Err(IdentityError::EmptyComponent { position });
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Returns the part at `index`, if present.
    pub fn part(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn into_parts(self) -> Vec<String> {
        self.parts
    }

    /// Serializes the identity into its single-string form.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            for c in part.chars() {
                if c == DELIMITER || c == ESCAPE {
                    out.push(ESCAPE);
                }
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Names and count of the parts that make up one resource type's identity.
///
/// ```rust
/// use reconciler_framework::identity::IdentityFormat;
///
/// const FORMAT: IdentityFormat = IdentityFormat::new(&["instance_id", "bot_name", "lex_region"]);
///
/// assert!(FORMAT.decode("onlyonepart").is_err());
/// let id = FORMAT.decode("i-1:bot-a:us-east-1").unwrap();
/// assert_eq!(FORMAT.get(&id, "bot_name"), Some("bot-a"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityFormat {
    names: &'static [&'static str],
}

impl IdentityFormat {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub const fn arity(&self) -> usize {
        self.names.len()
    }

    pub const fn part_names(&self) -> &'static [&'static str] {
        self.names
    }

    /// Builds an identity and checks it has exactly [`arity`](Self::arity) parts.
    pub fn identity<I, S>(&self, parts: I) -> Result<ResourceIdentity, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identity = ResourceIdentity::new(parts)?;
        if identity.len() != self.arity() {
            return Err(IdentityError::WrongPartCount {
                raw: identity.encode(),
                expected: self.arity(),
                found: identity.len(),
                format: self.to_string(),
            });
        }
        Ok(identity)
    }

    /// Parses the string form produced by [`ResourceIdentity::encode`].
    pub fn decode(&self, raw: &str) -> Result<ResourceIdentity, IdentityError> {
        let parts = split_escaped(raw)?;
        if parts.len() != self.arity() {
            return Err(IdentityError::WrongPartCount {
                raw: raw.to_string(),
                expected: self.arity(),
                found: parts.len(),
                format: self.to_string(),
            });
        }
        ResourceIdentity::new(parts)
    }

    /// Looks up a part of `identity` by its declared name.
    pub fn get<'a>(&self, identity: &'a ResourceIdentity, name: &str) -> Option<&'a str> {
        let index = self.names.iter().position(|n| *n == name)?;
        identity.part(index)
    }
}

impl fmt::Display for IdentityFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(":"))
    }
}

/// Joins `parts` into an identity string.
///
/// Fails if `parts` is empty or any component is empty.
pub fn encode<S: AsRef<str>>(parts: &[S]) -> Result<String, IdentityError> {
    ResourceIdentity::new(parts.iter().map(AsRef::as_ref)).map(|id| id.encode())
}

/// Splits `raw` into exactly `expected` non-empty parts.
pub fn decode(raw: &str, expected: usize) -> Result<ResourceIdentity, IdentityError> {
    let parts = split_escaped(raw)?;
    if parts.len() != expected {
        let format = (1..=expected)
            .map(|i| format!("<part{i}>"))
            .collect::<Vec<_>>()
            .join(":");
        return Err(IdentityError::WrongPartCount {
            raw: raw.to_string(),
            expected,
            found: parts.len(),
            format,
        });
    }
    ResourceIdentity::new(parts)
}

fn split_escaped(raw: &str) -> Result<Vec<String>, IdentityError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(next) if next == ESCAPE || next == DELIMITER => current.push(next),
                _ => {
                    return Err(IdentityError::InvalidEscape {
                        raw: raw.to_string(),
                    })
                }
            },
            DELIMITER => parts.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    parts.push(current);

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: IdentityFormat = IdentityFormat::new(&["instance_id", "bot_name", "lex_region"]);

    #[test]
    fn test_encode_three_parts() {
        let raw = encode(&["i-1", "bot-a", "us-east-1"]).unwrap();
        assert_eq!(raw, "i-1:bot-a:us-east-1");
    }

    #[test]
    fn test_decode_three_parts() {
        let id = BOT.decode("i-1:bot-a:us-east-1").unwrap();
        assert_eq!(id.parts(), ["i-1", "bot-a", "us-east-1"]);
        assert_eq!(BOT.get(&id, "lex_region"), Some("us-east-1"));
    }

    #[test]
    fn test_decode_single_part_is_malformed() {
        let err = BOT.decode("onlyonepart").unwrap_err();
        assert!(matches!(
            err,
            IdentityError::WrongPartCount {
                expected: 3,
                found: 1,
                ..
            }
        ));
        assert!(err.to_string().starts_with("malformed identity"));
    }

    #[test]
    fn test_decode_rejects_extra_parts() {
        assert!(BOT.decode("i-1:bot-a:us-east-1:extra").is_err());
    }

    #[test]
    fn test_decode_rejects_empty_component() {
        let err = BOT.decode("i-1::us-east-1").unwrap_err();
        assert_eq!(err, IdentityError::EmptyComponent { position: 1 });
    }

    #[test]
    fn test_encode_rejects_empty_component() {
        assert_eq!(
            encode(&["i-1", "", "us-east-1"]),
            Err(IdentityError::EmptyComponent { position: 1 })
        );
        assert_eq!(encode::<&str>(&[]), Err(IdentityError::NoComponents));
    }

    #[test]
    fn test_colon_inside_part_round_trips() {
        let arn = "arn:aws:appfabric:us-east-1:123456789012:appbundle/abc";
        let raw = encode(&[arn, "ingestion-1"]).unwrap();
        assert_eq!(
            raw,
            r"arn\:aws\:appfabric\:us-east-1\:123456789012\:appbundle/abc:ingestion-1"
        );
        let id = decode(&raw, 2).unwrap();
        assert_eq!(id.parts(), [arn, "ingestion-1"]);
    }

    #[test]
    fn test_dangling_escape_is_malformed() {
        assert!(matches!(
            decode(r"a:b\", 2),
            Err(IdentityError::InvalidEscape { .. })
        ));
        assert!(matches!(
            decode(r"a:\b", 2),
            Err(IdentityError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn test_format_identity_checks_arity() {
        assert!(BOT.identity(["i-1", "bot-a"]).is_err());
        let id = BOT.identity(["i-1", "bot-a", "us-east-1"]).unwrap();
        assert_eq!(id.to_string(), "i-1:bot-a:us-east-1");
        assert_eq!(BOT.to_string(), "instance_id:bot_name:lex_region");
    }
}
