//! Cryptographic signatures.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ed25519;

/// Signature scheme of a primitive key.
///
/// Only Ed25519 is functional. RSA-3072 and ECDSA-384 are reserved by the protocol and rejected
/// by every primitive operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    #[serde(rename = "ED25519")]
    Ed25519,

    #[serde(rename = "RSA3072")]
    Rsa3072,

    #[serde(rename = "ECDSA384")]
    Ecdsa384,
}

impl SignatureScheme {
    /// Whether primitive operations are implemented for the scheme.
    pub fn is_supported(&self) -> bool {
        matches!(self, SignatureScheme::Ed25519)
    }

    /// Return an error unless the scheme is supported.
    pub fn ensure_supported(&self) -> Result<(), Error> {
        if !self.is_supported() {
            return Err(Error::UnsupportedScheme(*self));
        }
        Ok(())
    }

    /// Name of the scheme as used by keyfiles.
    pub fn name(&self) -> &'static str {
        match self {
            SignatureScheme::Ed25519 => "ED25519",
            SignatureScheme::Rsa3072 => "RSA3072",
            SignatureScheme::Ecdsa384 => "ECDSA384",
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A public key used for signing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ed25519(ed25519::PublicKey),
}

/// Error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed public key")]
    MalformedPublicKey,
    #[error("malformed private key")]
    MalformedPrivateKey,
    #[error("malformed signature")]
    MalformedSignature,
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("private key does not match public key")]
    KeyMismatch,
    #[error("private key not available")]
    MissingPrivateKey,
    #[error("unsupported signature scheme: {0}")]
    UnsupportedScheme(SignatureScheme),
    #[error("invalid seed length {0}, expected 32")]
    InvalidSeedLength(usize),
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("malformed hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl PublicKey {
    /// Return the signature scheme of this public key.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            PublicKey::Ed25519(_) => SignatureScheme::Ed25519,
        }
    }

    /// Return a byte representation of this public key.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(pk) => pk.as_bytes(),
        }
    }

    /// Construct a public key of the given scheme from raw bytes.
    pub fn from_bytes(scheme: SignatureScheme, bytes: &[u8]) -> Result<Self, Error> {
        match scheme {
            SignatureScheme::Ed25519 => Ok(PublicKey::Ed25519(ed25519::PublicKey::from_bytes(
                bytes,
            )?)),
            other => Err(Error::UnsupportedScheme(other)),
        }
    }

    /// Verify a signature.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), Error> {
        match self {
            PublicKey::Ed25519(pk) => pk.verify(message, signature),
        }
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Variable-length opaque signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Whether the signature holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Signature {
    fn from(v: Vec<u8>) -> Signature {
        Signature(v)
    }
}

impl From<&[u8]> for Signature {
    fn from(v: &[u8]) -> Signature {
        Signature(v.to_vec())
    }
}

impl From<Signature> for Vec<u8> {
    fn from(s: Signature) -> Vec<u8> {
        s.0
    }
}

/// Common trait for memory signers.
pub trait Signer: Send + Sync {
    /// Create a new signer from the given seed.
    fn new_from_seed(seed: &[u8]) -> Result<Self, Error>
    where
        Self: Sized;

    /// Recreate signer from a byte serialization.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized;

    /// Serialize the signer into bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Return the public key counterpart to the signer's secret key.
    fn public_key(&self) -> PublicKey;

    /// Generate a signature over the message.
    fn sign(&self, message: &[u8]) -> Result<Signature, Error>;
}
