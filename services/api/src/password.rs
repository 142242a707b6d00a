//! Password hashing with argon2
//!
//! Hashing and verification are CPU-bound, so both run on tokio's blocking
//! pool instead of an async worker.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};
use tracing::error;

/// Errors raised while hashing a password
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid argon2 parameters: {0}")]
    Params(String),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] JoinError),
}

/// Hashes and verifies passwords
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    /// Hash checked when the account does not exist, so unknown emails cost
    /// the same as wrong passwords
    dummy_hash: String,
}

impl PasswordService {
    /// Create a password service with argon2's default cost parameters
    pub fn new() -> Result<Self, PasswordError> {
        Self::with_params(
            Params::DEFAULT_M_COST,
            Params::DEFAULT_T_COST,
            Params::DEFAULT_P_COST,
        )
    }

    /// Create an Argon2id password service with explicit cost parameters
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "not-a-real-password")?;

        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();

        spawn_blocking(move || hash_with(&argon2, &password)).await?
    }

    /// Verify a password against a stored hash.
    ///
    /// With no stored hash a dummy hash is verified instead and the result is
    /// always `false`.
    pub async fn verify(&self, password: &str, stored_hash: Option<&str>) -> bool {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let known = stored_hash.is_some();
        let candidate = stored_hash.unwrap_or(self.dummy_hash.as_str()).to_owned();

        let matches = spawn_blocking(move || verify_with(&argon2, &password, &candidate))
            .await
            .unwrap_or_else(|e| {
                error!("Password verification task failed: {}", e);
                false
            });

        matches && known
    }
}

fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

fn verify_with(argon2: &Argon2<'static>, password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| argon2.verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}
