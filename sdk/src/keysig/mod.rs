//! Keyed signature trees.
//!
//! A [`KeySignature`] mirrors the shape of a composite key and holds an optional signature at
//! every primitive leaf, so signatures from several parties can be collected incrementally. The
//! tree is owned by a single signing session and is not internally synchronized.
use std::ops::ControlFlow;

use slog::debug;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    crypto::signature::SignatureScheme,
    json::{self, KeyRecord, RecordBody},
    key::{CompositeKey, KeyKind},
    logger::get_logger,
    signature::CompositeSignature,
    types::ContractId,
    wire,
};

#[cfg(test)]
mod test;

/// Error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("key not set")]
    KeyNotSet,
    #[error("unrecognized key variant: {0}")]
    UnrecognizedKeyVariant(&'static str),
    #[error("signature does not match the shape of the key")]
    ShapeMismatch,
    #[error("keyfile: {0}")]
    Json(#[from] json::Error),
}

/// Shape of a keyed signature tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeySignatureKind {
    /// A primitive key and its signature, if collected.
    Primitive {
        scheme: SignatureScheme,
        public_key: Vec<u8>,
        signature: Option<Vec<u8>>,
    },
    /// A contract key, which never carries a signature.
    Contract(ContractId),
    List(Vec<KeySignature>),
    Threshold {
        threshold: u32,
        keys: Vec<KeySignature>,
    },
}

/// A composite key fused with the signatures collected for it.
#[derive(Clone, Debug)]
pub struct KeySignature {
    pub description: String,
    pub uuid: Uuid,
    pub kind: KeySignatureKind,
}

impl PartialEq for KeySignature {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for KeySignature {}

/// Structural position of a key inside a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyUuidDescription {
    pub uuid: Uuid,
    pub description: String,
}

impl From<&CompositeKey> for KeySignature {
    fn from(key: &CompositeKey) -> Self {
        let kind = match &key.kind {
            KeyKind::Primitive(kp) => KeySignatureKind::Primitive {
                scheme: kp.scheme(),
                public_key: kp.public_key_bytes().to_vec(),
                signature: None,
            },
            KeyKind::Contract(id) => KeySignatureKind::Contract(*id),
            KeyKind::List(keys) => KeySignatureKind::List(keys.iter().map(Into::into).collect()),
            KeyKind::Threshold { threshold, keys } => KeySignatureKind::Threshold {
                threshold: *threshold,
                keys: keys.iter().map(Into::into).collect(),
            },
        };
        Self {
            description: key.description.clone(),
            uuid: key.uuid,
            kind,
        }
    }
}

impl KeySignature {
    /// Construct a node with a fresh uuid and no description.
    pub fn new(kind: KeySignatureKind) -> Self {
        Self {
            description: String::new(),
            uuid: Uuid::new_v4(),
            kind,
        }
    }

    /// Construct an unsigned Ed25519 leaf.
    pub fn ed25519(public_key: &[u8]) -> Self {
        Self::new(KeySignatureKind::Primitive {
            scheme: SignatureScheme::Ed25519,
            public_key: public_key.to_vec(),
            signature: None,
        })
    }

    /// Construct a list node.
    pub fn list(keys: Vec<KeySignature>) -> Self {
        Self::new(KeySignatureKind::List(keys))
    }

    /// Construct a threshold node.
    pub fn threshold(threshold: u32, keys: Vec<KeySignature>) -> Self {
        Self::new(KeySignatureKind::Threshold { threshold, keys })
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Child nodes of a list or threshold node, empty for leaves.
    pub fn keys(&self) -> &[KeySignature] {
        match &self.kind {
            KeySignatureKind::List(keys) | KeySignatureKind::Threshold { keys, .. } => keys,
            _ => &[],
        }
    }

    fn keys_mut(&mut self) -> &mut [KeySignature] {
        match &mut self.kind {
            KeySignatureKind::List(keys) | KeySignatureKind::Threshold { keys, .. } => keys,
            _ => &mut [],
        }
    }

    /// Append a node to a list or threshold node.
    ///
    /// Returns `false` when called on a leaf.
    pub fn add_key(&mut self, key: KeySignature) -> bool {
        match &mut self.kind {
            KeySignatureKind::List(keys) | KeySignatureKind::Threshold { keys, .. } => {
                keys.push(key);
                true
            }
            _ => false,
        }
    }

    /// Remove the first child equal to `key` from a list or threshold node.
    pub fn delete_key(&mut self, key: &KeySignature) -> bool {
        match &mut self.kind {
            KeySignatureKind::List(keys) | KeySignatureKind::Threshold { keys, .. } => {
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

    /// Signature held by a primitive leaf.
    pub fn signature(&self) -> Option<&[u8]> {
        match &self.kind {
            KeySignatureKind::Primitive { signature, .. } => signature.as_deref(),
            _ => None,
        }
    }

    /// Attach a signature to every empty leaf holding `public_key`.
    ///
    /// Leaves that already carry a signature are left alone. With `stop_at_first` only the first
    /// empty matching leaf in pre-order across the whole tree is filled. Returns whether any leaf
    /// was filled.
    pub fn set_signature_for_key(
        &mut self,
        public_key: &[u8],
        signature: &[u8],
        stop_at_first: bool,
    ) -> bool {
        let mut filled = 0usize;
        let _ = self.fill_by_key(public_key, signature, stop_at_first, &mut filled);

        debug!(get_logger("keysig"), "set signature for key";
            "public_key" => hex::encode(public_key),
            "filled" => filled,
            "stop_at_first" => stop_at_first,
        );
        filled > 0
    }

    fn fill_by_key(
        &mut self,
        public_key: &[u8],
        sig: &[u8],
        stop_at_first: bool,
        filled: &mut usize,
    ) -> ControlFlow<()> {
        if let KeySignatureKind::Primitive {
            public_key: pk,
            signature: slot @ None,
            ..
        } = &mut self.kind
        {
            if pk.as_slice() == public_key {
                *slot = Some(sig.to_vec());
                *filled += 1;
                if stop_at_first {
                    return ControlFlow::Break(());
                }
            }
            return ControlFlow::Continue(());
        }

        self.keys_mut()
            .iter_mut()
            .try_for_each(|k| k.fill_by_key(public_key, sig, stop_at_first, &mut *filled))
    }

    /// Attach signatures pairwise, see [`KeySignature::set_signature_for_key`].
    ///
    /// Returns whether any pair filled a leaf.
    pub fn set_signature_for_keys<K, S>(
        &mut self,
        public_keys: &[K],
        signatures: &[S],
        stop_at_first: bool,
    ) -> bool
    where
        K: AsRef<[u8]>,
        S: AsRef<[u8]>,
    {
        warn_on_length_mismatch(public_keys.len(), signatures.len());
        public_keys
            .iter()
            .zip(signatures)
            .fold(false, |any, (pk, sig)| {
                self.set_signature_for_key(pk.as_ref(), sig.as_ref(), stop_at_first) || any
            })
    }

    /// Set the signature of the primitive leaf identified by `uuid`, overwriting any existing
    /// signature.
    ///
    /// Returns whether a leaf was found.
    pub fn set_signature_for_key_uuid(&mut self, uuid: &Uuid, signature: &[u8]) -> bool {
        let found = self.fill_by_uuid(uuid, signature).is_break();

        debug!(get_logger("keysig"), "set signature for uuid";
            "uuid" => %uuid,
            "found" => found,
        );
        found
    }

    fn fill_by_uuid(&mut self, uuid: &Uuid, sig: &[u8]) -> ControlFlow<()> {
        let is_match = self.uuid == *uuid;
        if let KeySignatureKind::Primitive { signature, .. } = &mut self.kind {
            if is_match {
                *signature = Some(sig.to_vec());
                return ControlFlow::Break(());
            }
            return ControlFlow::Continue(());
        }

        self.keys_mut()
            .iter_mut()
            .try_for_each(|k| k.fill_by_uuid(uuid, sig))
    }

    /// Set signatures pairwise by uuid, see [`KeySignature::set_signature_for_key_uuid`].
    pub fn set_signature_for_key_uuids<S: AsRef<[u8]>>(
        &mut self,
        uuids: &[Uuid],
        signatures: &[S],
    ) -> bool {
        warn_on_length_mismatch(uuids.len(), signatures.len());
        uuids.iter().zip(signatures).fold(false, |any, (uuid, sig)| {
            self.set_signature_for_key_uuid(uuid, sig.as_ref()) || any
        })
    }

    /// Replace the signature of every already signed leaf holding `public_key`.
    ///
    /// Unsigned leaves are left alone. Returns whether any leaf was updated.
    pub fn update_signature_for_key(&mut self, public_key: &[u8], signature: &[u8]) -> bool {
        let updated = self.update_by_key(public_key, signature);

        debug!(get_logger("keysig"), "update signature for key";
            "public_key" => hex::encode(public_key),
            "updated" => updated,
        );
        updated > 0
    }

    fn update_by_key(&mut self, public_key: &[u8], sig: &[u8]) -> usize {
        match &mut self.kind {
            KeySignatureKind::Primitive {
                public_key: pk,
                signature: Some(slot),
                ..
            } if pk.as_slice() == public_key => {
                *slot = sig.to_vec();
                1
            }
            KeySignatureKind::List(keys) | KeySignatureKind::Threshold { keys, .. } => keys
                .iter_mut()
                .map(|k| k.update_by_key(public_key, sig))
                .sum(),
            _ => 0,
        }
    }

    /// Replace signatures pairwise, see [`KeySignature::update_signature_for_key`].
    pub fn update_signature_for_keys<K, S>(&mut self, public_keys: &[K], signatures: &[S]) -> bool
    where
        K: AsRef<[u8]>,
        S: AsRef<[u8]>,
    {
        warn_on_length_mismatch(public_keys.len(), signatures.len());
        public_keys
            .iter()
            .zip(signatures)
            .fold(false, |any, (pk, sig)| {
                self.update_signature_for_key(pk.as_ref(), sig.as_ref()) || any
            })
    }

    /// Every position holding `public_key`, in pre-order.
    pub fn key_uuids(&self, public_key: &[u8]) -> Vec<KeyUuidDescription> {
        let mut out = Vec::new();
        self.visit_leaves(&mut |node| {
            if let KeySignatureKind::Primitive { public_key: pk, .. } = &node.kind {
                if pk.as_slice() == public_key {
                    out.push(KeyUuidDescription {
                        uuid: node.uuid,
                        description: node.description.clone(),
                    });
                }
            }
        });
        out
    }

    /// Public keys and signatures of all signed leaves, in pre-order.
    pub fn signature_pairs(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut out = Vec::new();
        self.visit_leaves(&mut |node| {
            if let KeySignatureKind::Primitive {
                public_key,
                signature: Some(sig),
                ..
            } = &node.kind
            {
                out.push((public_key.clone(), sig.clone()));
            }
        });
        out
    }

    /// Public keys of all leaves still waiting for a signature, in pre-order.
    pub fn unsigned_keys(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        self.visit_leaves(&mut |node| {
            if let KeySignatureKind::Primitive {
                public_key,
                signature: None,
                ..
            } = &node.kind
            {
                out.push(public_key.clone());
            }
        });
        out
    }

    fn visit_leaves<'a, F: FnMut(&'a KeySignature)>(&'a self, f: &mut F) {
        match &self.kind {
            KeySignatureKind::List(keys) | KeySignatureKind::Threshold { keys, .. } => {
                keys.iter().for_each(|k| k.visit_leaves(f))
            }
            _ => f(self),
        }
    }

    /// Composite signature mirroring the tree, with empty signatures for unsigned leaves.
    pub fn to_signature(&self) -> CompositeSignature {
        match &self.kind {
            KeySignatureKind::Primitive {
                scheme, signature, ..
            } => CompositeSignature::Primitive {
                scheme: *scheme,
                signature: signature.clone().unwrap_or_default(),
            },
            KeySignatureKind::Contract(_) => CompositeSignature::Contract,
            KeySignatureKind::List(keys) => {
                CompositeSignature::List(keys.iter().map(KeySignature::to_signature).collect())
            }
            KeySignatureKind::Threshold { keys, .. } => CompositeSignature::Threshold(
                keys.iter().map(KeySignature::to_signature).collect(),
            ),
        }
    }

    /// Wire form of the key side of the tree.
    pub fn to_wire_key(&self) -> wire::Key {
        let key = match &self.kind {
            KeySignatureKind::Primitive {
                scheme, public_key, ..
            } => match scheme {
                SignatureScheme::Ed25519 => wire::KeyVariant::Ed25519(public_key.clone()),
                SignatureScheme::Rsa3072 => wire::KeyVariant::Rsa3072(public_key.clone()),
                SignatureScheme::Ecdsa384 => wire::KeyVariant::Ecdsa384(public_key.clone()),
            },
            KeySignatureKind::Contract(id) => wire::KeyVariant::ContractId(id.to_wire()),
            KeySignatureKind::List(keys) => wire::KeyVariant::KeyList(wire::KeyList {
                keys: keys.iter().map(KeySignature::to_wire_key).collect(),
            }),
            KeySignatureKind::Threshold { threshold, keys } => {
                wire::KeyVariant::ThresholdKey(wire::ThresholdKey {
                    threshold: *threshold,
                    keys: Some(wire::KeyList {
                        keys: keys.iter().map(KeySignature::to_wire_key).collect(),
                    }),
                })
            }
        };
        wire::Key { key: Some(key) }
    }

    /// Wire form of the signature side of the tree.
    pub fn to_wire_signature(&self) -> wire::Signature {
        self.to_signature().to_wire()
    }

    /// Rebuild a tree from a key and a congruent signature.
    ///
    /// Empty primitive signatures are treated as not yet collected.
    pub fn from_wire(key: &wire::Key, sig: &wire::Signature) -> Result<Self, Error> {
        use crate::wire::{KeyVariant as K, SignatureVariant as S};

        let variant = key.key.as_ref().ok_or(Error::KeyNotSet)?;
        let kind = match (variant, sig.signature.as_ref()) {
            (K::Ed25519(pk), Some(S::Ed25519(sig))) => KeySignatureKind::Primitive {
                scheme: SignatureScheme::Ed25519,
                public_key: pk.clone(),
                signature: if sig.is_empty() {
                    None
                } else {
                    Some(sig.clone())
                },
            },
            (K::ContractId(id), Some(S::Contract(_))) => {
                KeySignatureKind::Contract(ContractId::from_wire(id))
            }
            (K::KeyList(list), Some(S::SignatureList(sigs))) => {
                KeySignatureKind::List(from_wire_all(&list.keys, &sigs.sigs)?)
            }
            (K::ThresholdKey(tk), Some(S::ThresholdSignature(ts))) => {
                let keys = tk.keys.as_ref().map(|l| &l.keys[..]).unwrap_or(&[]);
                let sigs = ts.sigs.as_ref().map(|l| &l.sigs[..]).unwrap_or(&[]);
                KeySignatureKind::Threshold {
                    threshold: tk.threshold,
                    keys: from_wire_all(keys, sigs)?,
                }
            }
            (K::Rsa3072(_), _) => return Err(Error::UnrecognizedKeyVariant("RSA_3072")),
            (K::Ecdsa384(_), _) => return Err(Error::UnrecognizedKeyVariant("ECDSA_384")),
            _ => return Err(Error::ShapeMismatch),
        };
        Ok(Self::new(kind))
    }

    /// Convert into a keyfile record.
    pub fn to_record(&self) -> Result<KeyRecord, Error> {
        let (body, signature) = match &self.kind {
            KeySignatureKind::Primitive {
                public_key,
                signature,
                ..
            } => (RecordBody::Ed25519(public_key.clone()), signature.as_deref()),
            KeySignatureKind::Contract(id) => (RecordBody::Contract(*id), None),
            KeySignatureKind::List(keys) => (RecordBody::List(records(keys)?), None),
            KeySignatureKind::Threshold { threshold, keys } => (
                RecordBody::Threshold {
                    threshold: *threshold,
                    keys: records(keys)?,
                },
                None,
            ),
        };
        Ok(KeyRecord::new(
            &self.description,
            &self.uuid,
            body,
            signature,
        )?)
    }

    /// Convert from a keyfile record.
    pub fn from_record(record: &KeyRecord) -> Result<Self, Error> {
        let kind = match record.body()? {
            RecordBody::Ed25519(public_key) => KeySignatureKind::Primitive {
                scheme: SignatureScheme::Ed25519,
                public_key,
                signature: record.signature()?,
            },
            RecordBody::Contract(id) => KeySignatureKind::Contract(id),
            RecordBody::List(keys) => KeySignatureKind::List(from_records(&keys)?),
            RecordBody::Threshold { threshold, keys } => KeySignatureKind::Threshold {
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

fn from_wire_all(keys: &[wire::Key], sigs: &[wire::Signature]) -> Result<Vec<KeySignature>, Error> {
    if keys.len() != sigs.len() {
        return Err(Error::ShapeMismatch);
    }
    keys.iter()
        .zip(sigs)
        .map(|(k, s)| KeySignature::from_wire(k, s))
        .collect()
}

fn records(keys: &[KeySignature]) -> Result<Vec<KeyRecord>, Error> {
    keys.iter().map(KeySignature::to_record).collect()
}

fn from_records(records: &[KeyRecord]) -> Result<Vec<KeySignature>, Error> {
    records.iter().map(KeySignature::from_record).collect()
}

fn warn_on_length_mismatch(keys: usize, signatures: usize) {
    if keys != signatures {
        slog::warn!(get_logger("keysig"), "ignoring unpaired entries";
            "keys" => keys,
            "signatures" => signatures,
        );
    }
}
