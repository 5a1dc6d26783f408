//! Cache key derivation
//!
//! A cache entry lives at `<root>/<identity digest>/<content digest>.<ext>`.
//! The identity digest fingerprints the compiler configuration through a
//! canonical, key-order independent encoding; the content digest hashes the
//! exact source bytes.
//!
//! # Schemes
//!
//! | Scheme | Hash | Strings | Hex length |
//! |--------|------|---------|------------|
//! | `legacy` | SHA-1 | raw | 40 |
//! | `escaped` | SHA-256 | JSON-escaped | 64 |
//!
//! `legacy` is the default and must stay byte-compatible with caches that
//! already exist on disk.

pub mod canonical;
pub mod value;

use crate::error::KilnResult;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;

/// Address space version used to derive cache keys
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DigestScheme {
    /// SHA-1 over the unescaped canonical encoding
    #[default]
    Legacy,
    /// SHA-256 over the canonical encoding with JSON-escaped strings
    Escaped,
}

impl DigestScheme {
    /// Digest a compiler identity
    pub fn identity_digest(self, identity: &Value) -> IdentityDigest {
        let hex = match self {
            Self::Legacy => hash_canonical::<Sha1>(identity, false),
            Self::Escaped => hash_canonical::<Sha256>(identity, true),
        };
        IdentityDigest(hex)
    }

    /// Digest the exact UTF-8 bytes of a source text
    pub fn content_digest(self, source: &str) -> ContentDigest {
        let hex = match self {
            Self::Legacy => hex::encode(Sha1::digest(source.as_bytes())),
            Self::Escaped => hex::encode(Sha256::digest(source.as_bytes())),
        };
        ContentDigest(hex)
    }

    /// The byte stream the identity hash is computed over
    pub fn canonical_bytes(self, identity: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        canonical::encode(identity, self.escapes_strings(), &mut |bytes: &[u8]| {
            out.extend_from_slice(bytes)
        });
        out
    }

    /// Length of the hex digests this scheme produces
    pub fn hex_len(self) -> usize {
        match self {
            Self::Legacy => 40,
            Self::Escaped => 64,
        }
    }

    fn escapes_strings(self) -> bool {
        matches!(self, Self::Escaped)
    }
}

impl fmt::Display for DigestScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Legacy => "legacy",
            Self::Escaped => "escaped",
        };
        write!(f, "{}", name)
    }
}

fn hash_canonical<D: Digest>(value: &Value, escape_strings: bool) -> String {
    let mut hasher = D::new();
    canonical::encode(value, escape_strings, &mut |bytes: &[u8]| {
        hasher.update(bytes)
    });
    hex::encode(hasher.finalize())
}

/// Digest any serializable identity, rejecting values outside the JSON model
pub fn identity_digest_of<T: Serialize + ?Sized>(
    scheme: DigestScheme,
    identity: &T,
) -> KilnResult<IdentityDigest> {
    let value = value::from_serialize(identity)?;
    Ok(scheme.identity_digest(&value))
}

/// Lowercase hex fingerprint of a compiler identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityDigest(String);

impl IdentityDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase hex fingerprint of source text
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
