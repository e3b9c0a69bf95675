//! Configuration types.

/// Structural limits applied when validating composite keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyLimits {
    /// Maximum nesting depth of a key, counting primitive keys as depth one.
    ///
    /// The network currently accepts keys such as a list of threshold keys each holding a list
    /// of primitive keys, i.e. three levels.
    pub max_depth: usize,
    /// Minimum threshold of a threshold key.
    pub min_threshold: u32,
}

impl KeyLimits {
    /// Construct the default key limits.
    pub const fn default() -> Self {
        Self {
            max_depth: 3,
            min_threshold: 1,
        }
    }
}

/// Parameters of the deterministic seed-to-private-key derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Derivation {
    /// Number of PBKDF2 rounds.
    pub rounds: u32,
    /// PBKDF2 salt.
    pub salt: &'static [u8],
    /// Key index mixed into the PBKDF2 password.
    pub index: i64,
    /// Length of the derived key in bytes.
    pub length: usize,
}

impl Derivation {
    /// Construct the derivation parameters used by seed-based key pairs.
    pub const fn default() -> Self {
        Self {
            rounds: 2048,
            salt: &[0xff],
            index: -1,
            length: 32,
        }
    }
}
