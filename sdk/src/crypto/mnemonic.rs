//! Seed derivation and recovery words.
use std::fmt;

use zeroize::Zeroize;

use crate::{config::Derivation, crypto::signature::Error};

/// Length of the seed a primitive key pair is derived from.
pub const SEED_LENGTH: usize = 32;

/// Derive key material from a seed.
///
/// PBKDF2-HMAC-SHA512 over `seed || index` (index as eight little-endian bytes), with the salt and
/// round count taken from `config`.
pub fn derive_key_with(config: &Derivation, seed: &[u8], index: i64, length: usize) -> Vec<u8> {
    let mut password = Vec::with_capacity(seed.len() + 8);
    password.extend_from_slice(seed);
    password.extend_from_slice(&index.to_le_bytes());

    let mut out = vec![0u8; length];
    pbkdf2::pbkdf2_hmac::<sha2::Sha512>(&password, config.salt, config.rounds, &mut out);
    password.zeroize();

    out
}

/// Derive key material from a seed using the default derivation parameters.
pub fn derive_key(seed: &[u8], index: i64, length: usize) -> Vec<u8> {
    derive_key_with(&Derivation::default(), seed, index, length)
}

/// Recovery words encoding a 32-byte seed.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic(bip39::Mnemonic);

impl Mnemonic {
    /// Encode a seed as recovery words.
    pub fn from_seed(seed: &[u8]) -> Result<Self, Error> {
        if seed.len() != SEED_LENGTH {
            return Err(Error::InvalidSeedLength(seed.len()));
        }
        bip39::Mnemonic::from_entropy(seed)
            .map(Mnemonic)
            .map_err(|err| Error::InvalidMnemonic(err.to_string()))
    }

    /// Parse recovery words.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self, Error> {
        let phrase = words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        let mnemonic = bip39::Mnemonic::parse_normalized(&phrase)
            .map_err(|err| Error::InvalidMnemonic(err.to_string()))?;

        let seed_len = mnemonic.to_entropy().len();
        if seed_len != SEED_LENGTH {
            return Err(Error::InvalidSeedLength(seed_len));
        }
        Ok(Mnemonic(mnemonic))
    }

    /// Return the seed encoded by the recovery words.
    pub fn seed(&self) -> Vec<u8> {
        self.0.to_entropy()
    }

    /// Return the recovery words.
    pub fn words(&self) -> Vec<String> {
        self.0
            .to_string()
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mnemonic(..)")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_derive_key() {
        let seed = [0x42u8; 32];
        let a = derive_key(&seed, -1, 32);
        let b = derive_key(&seed, -1, 32);
        assert_eq!(a.len(), 32);
        assert_eq!(a, b, "derivation should be deterministic");

        let other_index = derive_key(&seed, 0, 32);
        assert_ne!(a, other_index, "index should be part of the password");

        let longer = derive_key(&seed, -1, 64);
        assert_eq!(&longer[..32], &a[..], "PBKDF2 output should extend");

        let cheaper = derive_key_with(
            &Derivation {
                rounds: 1,
                ..Derivation::default()
            },
            &seed,
            -1,
            32,
        );
        assert_ne!(a, cheaper);
    }

    #[test]
    fn test_mnemonic_roundtrip() {
        let seed: Vec<u8> = (0u8..32).collect();
        let mnemonic = Mnemonic::from_seed(&seed).unwrap();
        let words = mnemonic.words();
        assert_eq!(words.len(), 24);

        let restored = Mnemonic::from_words(&words).unwrap();
        assert_eq!(restored.seed(), seed);
        assert_eq!(restored, mnemonic);

        let upper: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();
        assert_eq!(Mnemonic::from_words(&upper).unwrap().seed(), seed);
    }

    #[test]
    fn test_mnemonic_errors() {
        assert!(matches!(
            Mnemonic::from_seed(&[0u8; 16]),
            Err(Error::InvalidSeedLength(16))
        ));
        assert!(matches!(
            Mnemonic::from_words(&["not", "a", "mnemonic"]),
            Err(Error::InvalidMnemonic(_))
        ));

        // Valid 12-word phrase, but too little entropy for a key seed.
        let short = bip39::Mnemonic::from_entropy(&[0u8; 16]).unwrap().to_string();
        let words: Vec<&str> = short.split_whitespace().collect();
        assert!(matches!(
            Mnemonic::from_words(&words),
            Err(Error::InvalidSeedLength(16))
        ));
    }
}
