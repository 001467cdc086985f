//! External identifier to storage id mapping.
//!
//! The store only accepts UUIDs as keys, so external ids are hashed with
//! SHA-256 and the first 16 bytes are laid out as a version 4 UUID. The
//! mapping depends on nothing but the input bytes, which lets any process
//! re-derive the key for a lookup.

use sha2::{Digest, Sha256};
use uuid::{Builder, Uuid};

pub fn storage_id(external_id: &str) -> Uuid {
    let digest = Sha256::digest(external_id.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    // Forces version 4 and the RFC 4122 variant.
    Builder::from_random_bytes(bytes).into_uuid()
}
