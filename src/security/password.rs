use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tokio::task;

use crate::config::SecurityConfig;

/// Adaptive one-way hash for stored credentials.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String>;

    /// Returns `Ok(false)` on mismatch; errors only on a malformed stored hash.
    fn verify(&self, plain: &str, hash: &str) -> Result<bool>;
}

pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(config: &SecurityConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        // Params are read from the PHC string, so older hashes keep verifying.
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Hashes on the blocking pool; Argon2 would otherwise stall a runtime worker.
pub async fn hash_blocking(hasher: Arc<dyn PasswordHasher>, plain: String) -> Result<String> {
    task::spawn_blocking(move || hasher.hash(&plain))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_blocking(
    hasher: Arc<dyn PasswordHasher>,
    plain: String,
    hash: String,
) -> Result<bool> {
    task::spawn_blocking(move || hasher.verify(&plain, &hash))
        .await
        .context("Password verification task panicked")?
}
