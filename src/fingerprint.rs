//! Deterministic request fingerprints for the response cache.
//!
//! The fingerprint is a SHA-256 digest over the provider hint, the model
//! hint, and a canonical rendering of the request payload, rendered as hex.
//! It is a pure function of the request — no I/O, no randomness — so it is
//! stable across processes and suitable as a key for shared cache backends.
//!
//! Each field is hashed with a length prefix. Raw concatenation would let a
//! payload that textually contains a hint collide with a request carrying
//! that hint; the prefix removes the ambiguity. The payload rendering uses
//! `serde_json` over `serde_json::Map`, whose BTreeMap backing sorts keys,
//! so two payloads with equal content produce equal bytes regardless of
//! insertion order.

use sha2::{Digest, Sha256};

use crate::types::InvocationRequest;

/// Compute the cache fingerprint for a request.
///
/// Requests with identical hints and payload content always produce
/// identical fingerprints; requests differing in either hint produce
/// distinct fingerprints even when the payload matches.
pub fn fingerprint(request: &InvocationRequest) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, request.provider_hint().unwrap_or("").as_bytes());
    update_field(&mut hasher, request.model_hint().unwrap_or("").as_bytes());
    // Map is backed by a BTreeMap, so this rendering is canonical.
    let payload = serde_json::to_string(request.payload()).unwrap_or_default();
    update_field(&mut hasher, payload.as_bytes());
    hex::encode(hasher.finalize())
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
