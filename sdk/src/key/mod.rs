//! Composite keys.
//!
//! A composite key is either a single primitive key, a reference to a smart contract, or a list
//! or threshold of further composite keys. Composite keys are plain values and are not internally
//! synchronized.
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::KeyLimits,
    crypto::{
        keypair::KeyPair,
        signature::{self, SignatureScheme},
    },
    json::{self, KeyRecord, RecordBody},
    signature::CompositeSignature,
    types::ContractId,
    wire,
};


/// Error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("key not set")]
    KeyNotSet,
    #[error("unrecognized key variant: {0}")]
    UnrecognizedKeyVariant(&'static str),
    #[error("key nesting depth {depth} exceeds maximum of {max}")]
    ExcessiveNesting { depth: usize, max: usize },
    #[error("invalid threshold {threshold} for {keys} keys")]
    InvalidThreshold { threshold: u32, keys: usize },
    #[error("crypto: {0}")]
    Crypto(#[from] signature::Error),
    #[error("malformed key: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("keyfile: {0}")]
    Json(#[from] json::Error),
}

/// Shape of a composite key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// A single key pair.
    Primitive(KeyPair),
    /// A smart contract, satisfied by the contract's execution context.
    Contract(ContractId),
    /// All of the contained keys must sign.
    List(Vec<CompositeKey>),
    /// At least `threshold` of the contained keys must sign.
    Threshold {
        threshold: u32,
        keys: Vec<CompositeKey>,
    },
}

/// A possibly nested key.
///
/// The description and uuid are local metadata and never leave the process on the wire; equality
/// only considers the shape and key material.
#[derive(Clone, Debug)]
pub struct CompositeKey {
    pub description: String,
    pub uuid: Uuid,
    pub kind: KeyKind,
}

impl PartialEq for CompositeKey {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for CompositeKey {}

impl From<KeyPair> for CompositeKey {
    fn from(kp: KeyPair) -> Self {
        Self::primitive(kp)
    }
}

impl From<ContractId> for CompositeKey {
    fn from(id: ContractId) -> Self {
        Self::contract(id)
    }
}

impl CompositeKey {
    /// Construct a composite key with a fresh uuid and no description.
    pub fn new(kind: KeyKind) -> Self {
        Self {
            description: String::new(),
            uuid: Uuid::new_v4(),
            kind,
        }
    }

    /// Construct a primitive key.
    pub fn primitive(kp: KeyPair) -> Self {
        Self::new(KeyKind::Primitive(kp))
    }

    /// Construct a contract key.
    pub fn contract(id: ContractId) -> Self {
        Self::new(KeyKind::Contract(id))
    }

    /// Construct a key list.
    pub fn list(keys: Vec<CompositeKey>) -> Self {
        Self::new(KeyKind::List(keys))
    }

    /// Construct a threshold key.
    pub fn threshold(threshold: u32, keys: Vec<CompositeKey>) -> Self {
        Self::new(KeyKind::Threshold { threshold, keys })
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Child keys of a list or threshold key, empty for leaves.
    pub fn keys(&self) -> &[CompositeKey] {
        match &self.kind {
            KeyKind::List(keys) | KeyKind::Threshold { keys, .. } => keys,
            _ => &[],
        }
    }

    /// Append a key to a list or threshold key.
    ///
    /// Returns `false` and leaves the key unchanged when called on a leaf.
    pub fn add_key(&mut self, key: CompositeKey) -> bool {
        match &mut self.kind {
            KeyKind::List(keys) | KeyKind::Threshold { keys, .. } => {
                keys.push(key);
                true
            }
            _ => false,
        }
    }

    /// Remove the first child equal to `key` from a list or threshold key.
    ///
    /// Returns whether an element was removed.
    pub fn delete_key(&mut self, key: &CompositeKey) -> bool {
        match &mut self.kind {
            KeyKind::List(keys) | KeyKind::Threshold { keys, .. } => {
                match keys.iter().position(|k| k == key) {
                    Some(idx) => {
                        keys.remove(idx);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Nesting depth, counting leaves as depth one.
    pub fn depth(&self) -> usize {
        1 + self.keys().iter().map(CompositeKey::depth).max().unwrap_or(0)
    }

    /// Check structural limits.
    pub fn validate(&self, limits: &KeyLimits) -> Result<(), Error> {
        let depth = self.depth();
        if depth > limits.max_depth {
            return Err(Error::ExcessiveNesting {
                depth,
                max: limits.max_depth,
            });
        }
        self.validate_thresholds(limits)
    }

    fn validate_thresholds(&self, limits: &KeyLimits) -> Result<(), Error> {
        if let KeyKind::Threshold { threshold, keys } = &self.kind {
            if *threshold < limits.min_threshold || *threshold as usize > keys.len() {
                return Err(Error::InvalidThreshold {
                    threshold: *threshold,
                    keys: keys.len(),
                });
            }
        }
        self.keys()
            .iter()
            .try_for_each(|k| k.validate_thresholds(limits))
    }

    /// Produce a signature congruent with this key.
    ///
    /// Primitive keys without a private key contribute an empty signature of their scheme.
    pub fn sign(&self, message: &[u8]) -> Result<CompositeSignature, Error> {
        match &self.kind {
            KeyKind::Primitive(kp) => {
                let signature = if kp.has_private_key() {
                    kp.sign(message)?.into()
                } else {
                    Vec::new()
                };
                Ok(CompositeSignature::Primitive {
                    scheme: kp.scheme(),
                    signature,
                })
            }
            KeyKind::Contract(_) => Ok(CompositeSignature::Contract),
            KeyKind::List(keys) => Ok(CompositeSignature::List(sign_all(keys, message)?)),
            KeyKind::Threshold { keys, .. } => {
                Ok(CompositeSignature::Threshold(sign_all(keys, message)?))
            }
        }
    }

    /// Convert into the wire representation.
    pub fn to_wire(&self) -> wire::Key {
        let key = match &self.kind {
            KeyKind::Primitive(kp) => match kp.scheme() {
                SignatureScheme::Ed25519 => {
                    wire::KeyVariant::Ed25519(kp.public_key_bytes().to_vec())
                }
                SignatureScheme::Rsa3072 => {
                    wire::KeyVariant::Rsa3072(kp.public_key_bytes().to_vec())
                }
                SignatureScheme::Ecdsa384 => {
                    wire::KeyVariant::Ecdsa384(kp.public_key_bytes().to_vec())
                }
            },
            KeyKind::Contract(id) => wire::KeyVariant::ContractId(id.to_wire()),
            KeyKind::List(keys) => wire::KeyVariant::KeyList(wire_key_list(keys)),
            KeyKind::Threshold { threshold, keys } => {
                wire::KeyVariant::ThresholdKey(wire::ThresholdKey {
                    threshold: *threshold,
                    keys: Some(wire_key_list(keys)),
                })
            }
        };
        wire::Key { key: Some(key) }
    }

    /// Convert from the wire representation.
    pub fn from_wire(key: &wire::Key) -> Result<Self, Error> {
        let kind = match key.key.as_ref().ok_or(Error::KeyNotSet)? {
            wire::KeyVariant::Ed25519(pk) => {
                KeyKind::Primitive(KeyPair::from_bytes(SignatureScheme::Ed25519, pk, None)?)
            }
            wire::KeyVariant::ContractId(id) => KeyKind::Contract(ContractId::from_wire(id)),
            wire::KeyVariant::KeyList(list) => KeyKind::List(keys_from_wire(&list.keys)?),
            wire::KeyVariant::ThresholdKey(tk) => KeyKind::Threshold {
                threshold: tk.threshold,
                keys: match &tk.keys {
                    Some(list) => keys_from_wire(&list.keys)?,
                    None => Vec::new(),
                },
            },
            wire::KeyVariant::Rsa3072(_) => return Err(Error::UnrecognizedKeyVariant("RSA_3072")),
            wire::KeyVariant::Ecdsa384(_) => {
                return Err(Error::UnrecognizedKeyVariant("ECDSA_384"))
            }
        };
        Ok(Self::new(kind))
    }

    /// Serialize into protobuf bytes.
    pub fn encode(&self) -> Vec<u8> {
        self.to_wire().to_bytes()
    }

    /// Deserialize from protobuf bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let key: wire::Key = wire::decode(bytes)?;
        Self::from_wire(&key)
    }

    /// Convert into a keyfile record.
    pub fn to_record(&self) -> Result<KeyRecord, Error> {
        let body = match &self.kind {
            KeyKind::Primitive(kp) => match kp.scheme() {
                SignatureScheme::Ed25519 => RecordBody::Ed25519(kp.public_key_bytes().to_vec()),
                other => return Err(signature::Error::UnsupportedScheme(other).into()),
            },
            KeyKind::Contract(id) => RecordBody::Contract(*id),
            KeyKind::List(keys) => RecordBody::List(records(keys)?),
            KeyKind::Threshold { threshold, keys } => RecordBody::Threshold {
                threshold: *threshold,
                keys: records(keys)?,
            },
        };
        Ok(KeyRecord::new(&self.description, &self.uuid, body, None)?)
    }

    /// Convert from a keyfile record.
    pub fn from_record(record: &KeyRecord) -> Result<Self, Error> {
        let kind = match record.body()? {
            RecordBody::Ed25519(pk) => {
                KeyKind::Primitive(KeyPair::from_bytes(SignatureScheme::Ed25519, &pk, None)?)
            }
            RecordBody::Contract(id) => KeyKind::Contract(id),
            RecordBody::List(keys) => KeyKind::List(from_records(&keys)?),
            RecordBody::Threshold { threshold, keys } => KeyKind::Threshold {
                threshold,
                keys: from_records(&keys)?,
            },
            RecordBody::NotSet => return Err(Error::KeyNotSet),
        };
        Ok(Self {
            description: record.description.clone(),
            uuid: record.uuid()?,
            kind,
        })
    }

    /// Serialize into a JSON keyfile.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(self.to_record()?.to_json()?)
    }

    /// Parse a JSON keyfile.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Self::from_record(&KeyRecord::from_json(json)?)
    }
}

fn sign_all(keys: &[CompositeKey], message: &[u8]) -> Result<Vec<CompositeSignature>, Error> {
    keys.iter().map(|k| k.sign(message)).collect()
}

fn wire_key_list(keys: &[CompositeKey]) -> wire::KeyList {
    wire::KeyList {
        keys: keys.iter().map(CompositeKey::to_wire).collect(),
    }
}

fn keys_from_wire(keys: &[wire::Key]) -> Result<Vec<CompositeKey>, Error> {
    keys.iter().map(CompositeKey::from_wire).collect()
}

fn records(keys: &[CompositeKey]) -> Result<Vec<KeyRecord>, Error> {
    keys.iter().map(CompositeKey::to_record).collect()
}

fn from_records(records: &[KeyRecord]) -> Result<Vec<CompositeKey>, Error> {
    records.iter().map(CompositeKey::from_record).collect()
}
