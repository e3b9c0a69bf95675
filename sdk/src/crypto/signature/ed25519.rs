//! Ed25519 signatures.
use std::{convert::TryInto, fmt};

use ed25519_dalek::{Signer as _, Verifier as _};
use zeroize::Zeroize;

use crate::crypto::signature::{Error, Signature};

/// Length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;
/// Length of an Ed25519 secret seed in bytes.
pub const SECRET_KEY_LENGTH: usize = ed25519_dalek::SECRET_KEY_LENGTH;
/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;

/// An Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

impl PublicKey {
    /// Return a byte representation of this public key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Construct a public key from a slice of bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let raw: &[u8; PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| Error::MalformedPublicKey)?;

        // Ensure that the public key is a valid compressed point.
        let pk = ed25519_dalek::VerifyingKey::from_bytes(raw)
            .map_err(|_| Error::MalformedPublicKey)?;

        Ok(PublicKey(pk))
    }

    /// Verify a signature.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), Error> {
        let sig = ed25519_dalek::Signature::from_slice(signature.as_ref())
            .map_err(|_| Error::MalformedSignature)?;

        self.0
            .verify(message, &sig)
            .map_err(|_| Error::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&hex::encode(self.as_bytes()))
            .finish()
    }
}

/// A memory-backed signer for Ed25519.
#[derive(Clone)]
pub struct MemorySigner {
    sk: ed25519_dalek::SigningKey,
}

impl MemorySigner {
    /// Return the concrete Ed25519 public key of this signer.
    pub fn ed25519_public_key(&self) -> PublicKey {
        PublicKey(self.sk.verifying_key())
    }
}

impl fmt::Debug for MemorySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySigner")
            .field("public_key", &self.ed25519_public_key())
            .finish_non_exhaustive()
    }
}

impl super::Signer for MemorySigner {
    fn new_from_seed(seed: &[u8]) -> Result<Self, Error> {
        let mut raw: [u8; SECRET_KEY_LENGTH] =
            seed.try_into().map_err(|_| Error::InvalidSeedLength(seed.len()))?;
        let sk = ed25519_dalek::SigningKey::from_bytes(&raw);
        raw.zeroize();
        Ok(Self { sk })
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut raw: [u8; SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| Error::MalformedPrivateKey)?;
        let sk = ed25519_dalek::SigningKey::from_bytes(&raw);
        raw.zeroize();
        Ok(Self { sk })
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.sk.to_bytes().to_vec()
    }

    fn public_key(&self) -> super::PublicKey {
        super::PublicKey::Ed25519(self.ed25519_public_key())
    }

    fn sign(&self, message: &[u8]) -> Result<Signature, Error> {
        Ok(self.sk.sign(message).to_bytes().to_vec().into())
    }
}
