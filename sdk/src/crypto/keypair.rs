//! Primitive key pairs.
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

use crate::{
    config::Derivation,
    crypto::{
        mnemonic::{derive_key_with, Mnemonic, SEED_LENGTH},
        signature::{ed25519, Error, PublicKey, Signature, SignatureScheme, Signer},
    },
};

/// DER prefix of an Ed25519 `SubjectPublicKeyInfo`.
const ED25519_PUBLIC_KEY_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];
/// DER prefix of an Ed25519 PKCS#8 private key.
const ED25519_PRIVATE_KEY_DER_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// A single asymmetric key pair.
///
/// The private half is optional; a public-only key pair can verify but not sign.
#[derive(Clone)]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: Option<ed25519::MemorySigner>,
    mnemonic: Option<Mnemonic>,
}

impl KeyPair {
    /// Construct a key pair from raw (or DER-encoded) key bytes.
    ///
    /// Ed25519 private keys may be given as the 32-byte seed, as the 64-byte `seed || public key`
    /// concatenation or in PKCS#8 DER form.
    pub fn from_bytes(
        scheme: SignatureScheme,
        public_key: &[u8],
        private_key: Option<&[u8]>,
    ) -> Result<Self, Error> {
        scheme.ensure_supported()?;

        let public_key = PublicKey::from_bytes(scheme, strip_public_key_der(public_key))?;
        let mut pair = Self {
            public_key,
            private_key: None,
            mnemonic: None,
        };
        if let Some(private_key) = private_key {
            pair.set_private_key(private_key)?;
        }
        Ok(pair)
    }

    /// Construct a key pair from hex-encoded key bytes.
    ///
    /// An absent or empty private key yields a public-only key pair.
    pub fn from_hex(
        scheme: SignatureScheme,
        public_key: &str,
        private_key: Option<&str>,
    ) -> Result<Self, Error> {
        let public_key = hex::decode(public_key)?;
        let mut private_key = match private_key {
            Some(sk) if !sk.is_empty() => Some(hex::decode(sk)?),
            _ => None,
        };

        let result = Self::from_bytes(scheme, &public_key, private_key.as_deref());
        private_key.zeroize();
        result
    }

    /// Construct a key pair deterministically from a 32-byte seed.
    ///
    /// When no seed is given a random one is drawn from the operating system. The seed is retained
    /// as recovery words.
    pub fn from_seed(scheme: SignatureScheme, seed: Option<&[u8]>) -> Result<Self, Error> {
        Self::from_seed_with(&Derivation::default(), scheme, seed)
    }

    /// Construct a key pair from a seed using explicit derivation parameters.
    pub fn from_seed_with(
        config: &Derivation,
        scheme: SignatureScheme,
        seed: Option<&[u8]>,
    ) -> Result<Self, Error> {
        scheme.ensure_supported()?;

        let mut seed = match seed {
            Some(seed) if seed.len() != SEED_LENGTH => {
                return Err(Error::InvalidSeedLength(seed.len()))
            }
            Some(seed) => seed.to_vec(),
            None => {
                let mut seed = vec![0u8; SEED_LENGTH];
                OsRng.fill_bytes(&mut seed);
                seed
            }
        };

        let mnemonic = Mnemonic::from_seed(&seed)?;
        let mut private_key = derive_key_with(config, &seed, config.index, config.length);
        seed.zeroize();

        let signer = ed25519::MemorySigner::new_from_seed(&private_key);
        private_key.zeroize();
        let signer = signer?;

        Ok(Self {
            public_key: signer.public_key(),
            private_key: Some(signer),
            mnemonic: Some(mnemonic),
        })
    }

    /// Recover a key pair from its recovery words.
    pub fn from_recovery_words<S: AsRef<str>>(
        scheme: SignatureScheme,
        words: &[S],
    ) -> Result<Self, Error> {
        scheme.ensure_supported()?;

        let mut seed = Mnemonic::from_words(words)?.seed();
        let result = Self::from_seed(scheme, Some(&seed));
        seed.zeroize();
        result
    }

    /// Generate a fresh random key pair.
    pub fn generate(scheme: SignatureScheme) -> Result<Self, Error> {
        Self::from_seed(scheme, None)
    }

    /// Signature scheme of the key pair.
    pub fn scheme(&self) -> SignatureScheme {
        self.public_key.scheme()
    }

    /// Public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Raw public key bytes.
    pub fn public_key_bytes(&self) -> &[u8] {
        self.public_key.as_bytes()
    }

    /// Hex-encoded raw public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// DER-encoded public key.
    pub fn public_key_encoded(&self) -> Vec<u8> {
        let mut out = ED25519_PUBLIC_KEY_DER_PREFIX.to_vec();
        out.extend_from_slice(self.public_key_bytes());
        out
    }

    /// Hex-encoded DER public key.
    pub fn public_key_encoded_hex(&self) -> String {
        hex::encode(self.public_key_encoded())
    }

    /// Whether the key pair holds a private key.
    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Raw private key bytes, if available.
    pub fn private_key_bytes(&self) -> Option<Vec<u8>> {
        self.private_key.as_ref().map(|sk| sk.to_bytes())
    }

    /// Hex-encoded raw private key, if available.
    pub fn private_key_hex(&self) -> Option<String> {
        self.private_key_bytes().map(|mut sk| {
            let out = hex::encode(&sk);
            sk.zeroize();
            out
        })
    }

    /// Replace the private key.
    ///
    /// The private key must derive the public key already held by the key pair.
    pub fn set_private_key(&mut self, private_key: &[u8]) -> Result<(), Error> {
        let (seed, tail) = split_private_key(private_key)?;
        let signer = ed25519::MemorySigner::from_bytes(seed)?;
        if signer.public_key() != self.public_key {
            return Err(Error::KeyMismatch);
        }
        if let Some(tail) = tail {
            if tail != self.public_key_bytes() {
                return Err(Error::KeyMismatch);
            }
        }
        self.private_key = Some(signer);
        Ok(())
    }

    /// Recovery words of the seed this key pair was created from.
    ///
    /// Empty when the key pair was not created from a seed.
    pub fn recovery_words(&self) -> Vec<String> {
        self.mnemonic
            .as_ref()
            .map(Mnemonic::words)
            .unwrap_or_default()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, Error> {
        self.scheme().ensure_supported()?;
        self.private_key
            .as_ref()
            .ok_or(Error::MissingPrivateKey)?
            .sign(message)
    }

    /// Verify a signature over a message.
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not verify.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, Error> {
        match self.public_key.verify(message, &Signature::from(signature)) {
            Ok(()) => Ok(true),
            Err(Error::VerificationFailed) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for KeyPair {}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("scheme", &self.scheme())
            .field("public_key", &self.public_key_hex())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}

fn strip_public_key_der(public_key: &[u8]) -> &[u8] {
    public_key
        .strip_prefix(&ED25519_PUBLIC_KEY_DER_PREFIX[..])
        .unwrap_or(public_key)
}

fn split_private_key(private_key: &[u8]) -> Result<(&[u8], Option<&[u8]>), Error> {
    let private_key = private_key
        .strip_prefix(&ED25519_PRIVATE_KEY_DER_PREFIX[..])
        .unwrap_or(private_key);

    match private_key.len() {
        ed25519::SECRET_KEY_LENGTH => Ok((private_key, None)),
        len if len == ed25519::SECRET_KEY_LENGTH + ed25519::PUBLIC_KEY_LENGTH => {
            let (seed, tail) = private_key.split_at(ed25519::SECRET_KEY_LENGTH);
            Ok((seed, Some(tail)))
        }
        _ => Err(Error::MalformedPrivateKey),
    }
}
