//! Password hashing
//!
//! bcrypt with a fixed cost. Hashing runs on tokio's blocking pool.

use crate::error::ServiceError;

/// Default bcrypt cost factor
pub const DEFAULT_COST: u32 = 12;

/// One-way salted password hasher
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash `plaintext` with a fresh salt
    pub async fn hash(&self, plaintext: &str) -> Result<String, ServiceError> {
        let cost = self.cost;
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| ServiceError::Hashing(e.to_string()))?
            .map_err(|e| ServiceError::Hashing(e.to_string()))
    }
}
