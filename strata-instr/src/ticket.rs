//! Repository tickets
//!
//! A [`Ticket`] records the content identity of one global object: the
//! 128-bit structural [`Digest`] computed for its definition, plus a flag
//! noting whether the definition has been pruned in favor of the canonical
//! copy held in an external content-addressed store.
//!
//! Tickets are produced once, attached to their global object out-of-band
//! (they live in a dedicated slot, not in the general metadata map, so
//! stripping metadata never discards them), and mutated exactly once: the
//! pruning pass flips `pruned` from `false` to `true` on a store hit.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 16-byte structural content digest.
///
/// Thin newtype over `[u8; 16]`. The inner bytes are public for zero-cost
/// access; the `Display` impl renders lowercase hex for logging and error
/// messages. The two 64-bit halves are exposed for stores keyed by a pair of
/// words.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Digest(pub [u8; 16]);

impl Digest {
    /// View the digest as a byte slice.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// The high 64-bit half (bytes 0..8, little-endian).
    pub fn high(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(bytes)
    }

    /// The low 64-bit half (bytes 8..16, little-endian).
    pub fn low(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[8..]);
        u64::from_le_bytes(bytes)
    }

    /// Rebuild a digest from its two 64-bit halves.
    pub fn from_halves(high: u64, low: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&high.to_le_bytes());
        bytes[8..].copy_from_slice(&low.to_le_bytes());
        Digest(bytes)
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A digest plus a pruned flag, attached to exactly one global object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ticket {
    pub digest: Digest,

    /// Set by the pruning pass when the definition has been reduced to an
    /// external reference against the canonical store entry.
    pub pruned: bool,
}

impl Ticket {
    /// Create a fresh, not-yet-pruned ticket for `digest`.
    pub fn new(digest: Digest) -> Self {
        Self {
            digest,
            pruned: false,
        }
    }
}
