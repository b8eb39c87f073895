//! Cryptographic primitives for conclave.
//!
//! Provides two things:
//!   1. BLAKE3 hashing — channel fingerprints and identifier digests
//!   2. Search nonces — random probe material for channel discovery
//!
//! There is no unsafe code in this module.

use rand::RngCore;

// ── BLAKE3 ────────────────────────────────────────────────────────────────────

/// Length in bytes of the library's canonical hash.
///
/// Search nonces are drawn at this length so a probe is exactly as wide
/// as a fingerprint digest.
pub const HASH_LEN: usize = 32;

/// Hash a byte slice, returning a 32-byte BLAKE3 digest.
///
/// Used for channel fingerprints and anywhere an opaque identifier
/// needs a fixed-width digest.
pub fn hash(data: &[u8]) -> [u8; HASH_LEN] {
    *blake3::hash(data).as_bytes()
}

/// The public fingerprint of a channel identifier.
///
/// Deterministic: `fingerprint(id)` is `hex_lower(BLAKE3(id))`, 64
/// lowercase hex characters. Collisions imply hash collisions, so the
/// fingerprint is treated as a collision-free public handle for the
/// identifier. Never stored — recomputed on demand.
///
/// # Example
/// ```
/// let fp = conclave_core::crypto::fingerprint(b"some-channel");
/// assert_eq!(fp.len(), 64);
/// assert_eq!(fp, conclave_core::crypto::fingerprint(b"some-channel"));
/// ```
pub fn fingerprint(identifier: &[u8]) -> String {
    hex::encode(hash(identifier))
}

// ── Search nonce ──────────────────────────────────────────────────────────────

/// Nonce carried in an outbound channel search probe.
///
/// The searcher recognizes its own probe echoed back through the room
/// by comparing this value; hash width keeps it unguessable.
pub type SearchNonce = [u8; HASH_LEN];

/// Draw a fresh random search nonce from the thread-local CSPRNG.
pub fn nonce() -> SearchNonce {
    let mut nonce = [0u8; HASH_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

// ── Tests ─────────────────────────────────────────────────────────────────────
