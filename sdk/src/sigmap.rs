//! Compact signature maps keyed by the shortest unambiguous public key prefix.
use std::collections::{BTreeMap, BTreeSet};

use crate::{keysig::KeySignature, wire};

/// Collects `(public key, signature)` pairs and renders them as a signature map.
///
/// Adding a second signature for the same public key replaces the first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureMapBuilder {
    pairs: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl SignatureMapBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature.
    pub fn add(&mut self, public_key: &[u8], signature: &[u8]) {
        self.pairs.insert(public_key.to_vec(), signature.to_vec());
    }

    /// Number of signers.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no signatures were added.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Shortest prefix length that keeps every public key distinct.
    ///
    /// A single signer needs no prefix at all.
    pub fn prefix_len(&self) -> usize {
        if self.pairs.len() <= 1 {
            return 0;
        }

        let max_len = self.pairs.keys().map(Vec::len).max().unwrap_or(0);
        let mut prefix_len = max_len;
        for len in (1..max_len).rev() {
            let mut seen = BTreeSet::new();
            let collides = self
                .pairs
                .keys()
                .any(|pk| !seen.insert(&pk[..len.min(pk.len())]));
            if collides {
                break;
            }
            prefix_len = len;
        }
        prefix_len
    }

    /// Render the signature map.
    ///
    /// Zero-length signatures are emitted as contract signatures, all others as Ed25519.
    pub fn to_wire(&self) -> wire::SignatureMap {
        let prefix_len = self.prefix_len();
        let sig_pair = self
            .pairs
            .iter()
            .map(|(pk, sig)| wire::SignaturePair {
                pub_key_prefix: pk[..prefix_len.min(pk.len())].to_vec(),
                signature: Some(if sig.is_empty() {
                    wire::SignaturePairVariant::Contract(Vec::new())
                } else {
                    wire::SignaturePairVariant::Ed25519(sig.clone())
                }),
            })
            .collect();
        wire::SignatureMap { sig_pair }
    }
}

impl<K: AsRef<[u8]>, S: AsRef<[u8]>> FromIterator<(K, S)> for SignatureMapBuilder {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut builder = Self::new();
        for (pk, sig) in iter {
            builder.add(pk.as_ref(), sig.as_ref());
        }
        builder
    }
}

impl From<&KeySignature> for SignatureMapBuilder {
    fn from(tree: &KeySignature) -> Self {
        tree.signature_pairs().into_iter().collect()
    }
}

/// Find the signature a map carries for the given public key.
pub fn find_signature<'a>(map: &'a wire::SignatureMap, public_key: &[u8]) -> Option<&'a [u8]> {
    map.sig_pair
        .iter()
        .find(|pair| public_key.starts_with(&pair.pub_key_prefix))
        .and_then(|pair| match pair.signature.as_ref()? {
            wire::SignaturePairVariant::Contract(sig)
            | wire::SignaturePairVariant::Ed25519(sig)
            | wire::SignaturePairVariant::Rsa3072(sig)
            | wire::SignaturePairVariant::Ecdsa384(sig) => Some(&sig[..]),
        })
}
