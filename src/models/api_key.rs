//! API Key model for authentication.
//!
//! API keys are never kept in plaintext. The store holds SHA-256 hashes, and incoming keys are hashed before lookup.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

/// Represents a registered API key.
#[derive(Debug, Clone)]
pub struct ApiKey {
    /// SHA-256 hash of the actual API key (64 hex characters)
    ///
    /// When a request comes in with "X-Api-Key: abc123", we:
    /// 1. Hash "abc123" with SHA-256
    /// 2. Look up this hash in the store
    /// 3. If found and active, authorize the request
    pub key_hash: String,

    /// Human-readable name of the key owner
    pub owner: String,

    /// Whether this API key is currently active
    ///
    /// Inactive keys are denied. This provides a way to revoke access without forgetting the key.
    pub is_active: bool,
}

/// Hash a plaintext API key into its lowercase hex SHA-256 digest.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());

    hex::encode(hasher.finalize())
}

/// In-memory API key registry, indexed by key hash.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyStore {
    keys: HashMap<String, ApiKey>,
}

impl ApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plaintext key for `owner`. Only its hash is kept.
    pub fn insert(&mut self, key: &str, owner: impl Into<String>) -> &mut Self {
        let key_hash = hash_key(key);
        self.keys.insert(
            key_hash.clone(),
            ApiKey {
                key_hash,
                owner: owner.into(),
                is_active: true,
            },
        );
        self
    }

    /// Deactivate a key. Returns `false` if it was never registered.
    #[cfg(test)]
    pub(crate) fn revoke(&mut self, key: &str) -> bool {
        match self.keys.get_mut(&hash_key(key)) {
            Some(record) => {
                record.is_active = false;
                true
            }
            None => false,
        }
    }

    /// Active record matching the plaintext `key`.
    pub fn find_active(&self, key: &str) -> Option<&ApiKey> {
        self.keys
            .get(&hash_key(key))
            .filter(|record| record.is_active)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
