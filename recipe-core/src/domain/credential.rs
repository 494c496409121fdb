//! Password hashing parameters

use serde::{Deserialize, Serialize};

/// Default Argon2id parameters
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_COST: u32 = 65536; // 64 MiB
pub const DEFAULT_PARALLELISM: u32 = 4;
pub const DEFAULT_HASH_LEN: u32 = 32;

/// Salt length in bytes for new password hashes
pub const SALT_LEN: usize = 16;

/// Argon2id parameters used when hashing new passwords.
///
/// Existing hashes carry their own parameters in the PHC string, so changing
/// these only affects passwords set afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    pub time_cost: u32,
    pub memory_cost: u32,
    pub parallelism: u32,
    pub hash_len: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}

/// Summary of a stored hash for display, e.g. in the admin user view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashSummary {
    pub algorithm: String,
    pub params: String,
}

impl HashSummary {
    /// Parse the algorithm and parameter segments out of a PHC string.
    ///
    /// Returns `None` for anything that does not look like `$alg$...`.
    pub fn from_phc(phc: &str) -> Option<Self> {
        let mut parts = phc.strip_prefix('$')?.split('$');
        let algorithm = parts.next().filter(|a| !a.is_empty())?;
        let params = parts.find(|p| p.starts_with("m=")).unwrap_or_default();
        Some(Self {
            algorithm: algorithm.to_string(),
            params: params.to_string(),
        })
    }
}
