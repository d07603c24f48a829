use anyhow::{Context, Result};

/// bcrypt work factor used unless configured otherwise
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// Hashes and verifies user passwords
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// bcrypt with a fixed cost; hashes are stored in modular crypt format (`$2b$...`)
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).context("Failed to hash password")
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        // A malformed stored hash never verifies
        bcrypt::verify(password, stored).unwrap_or(false)
    }
}
