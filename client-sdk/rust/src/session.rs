//! Multi-party signature collection.
use futures_util::future::try_join_all;
use slog::{debug, Logger};

use hedera_sdk::{
    key::CompositeKey, keysig::KeySignature, logger::get_logger, sigmap::SignatureMapBuilder,
    wire,
};

use crate::wallet::Signer;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A signer error occurred.
    #[error(transparent)]
    Signer(#[from] anyhow::Error),
}

/// What happened to a signer during [`SigningSession::collect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The signature was attached to the tree.
    Attached,
    /// The key appears in the tree but has no empty slot left.
    AlreadySigned,
    /// The key does not appear in the tree.
    NotInKey,
}

/// Collects signatures over one message for one composite key.
///
/// A session is owned by a single coordinator; signers are asked concurrently but their
/// signatures are attached in order.
pub struct SigningSession {
    tree: KeySignature,
    message: Vec<u8>,
    logger: Logger,
}

impl SigningSession {
    pub fn new(key: &CompositeKey, message: &[u8]) -> Self {
        Self::from_tree(KeySignature::from(key), message)
    }

    /// Resume a session from a partially signed tree.
    pub fn from_tree(tree: KeySignature, message: &[u8]) -> Self {
        Self {
            tree,
            message: message.to_vec(),
            logger: get_logger("client/session"),
        }
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn tree(&self) -> &KeySignature {
        &self.tree
    }

    pub fn into_tree(self) -> KeySignature {
        self.tree
    }

    /// Whether every primitive key in the tree has signed.
    pub fn is_complete(&self) -> bool {
        self.tree.unsigned_keys().is_empty()
    }

    /// Attach a signature obtained out of band.
    pub fn attach(&mut self, public_key: &[u8], signature: &[u8], stop_at_first: bool) -> bool {
        self.tree
            .set_signature_for_key(public_key, signature, stop_at_first)
    }

    /// Ask every signer whose key is still unsigned for a signature and attach the results.
    ///
    /// Returns one outcome per signer, in order. Nothing is attached if any signer fails.
    pub async fn collect(
        &mut self,
        signers: &[&dyn Signer],
        stop_at_first: bool,
    ) -> Result<Vec<Outcome>, Error> {
        let unsigned = self.tree.unsigned_keys();
        let wanted: Vec<&dyn Signer> = signers
            .iter()
            .copied()
            .filter(|s| unsigned.iter().any(|pk| pk.as_slice() == s.public_key()))
            .collect();

        let message = &self.message;
        let signatures = try_join_all(wanted.iter().map(|s| s.sign(message))).await?;

        let mut signatures = signatures.into_iter();
        let mut outcomes = Vec::with_capacity(signers.len());
        for signer in signers {
            let pk = signer.public_key();
            let outcome = if !unsigned.iter().any(|u| u.as_slice() == pk) {
                if self.tree.key_uuids(pk).is_empty() {
                    Outcome::NotInKey
                } else {
                    Outcome::AlreadySigned
                }
            } else {
                let attached = match signatures.next() {
                    Some(sig) => self
                        .tree
                        .set_signature_for_key(pk, sig.as_ref(), stop_at_first),
                    None => false,
                };
                if attached {
                    Outcome::Attached
                } else {
                    Outcome::AlreadySigned
                }
            };
            outcomes.push(outcome);
        }

        debug!(self.logger, "collected signatures";
            "signers" => signers.len(),
            "attached" => outcomes.iter().filter(|o| **o == Outcome::Attached).count(),
            "complete" => self.is_complete(),
        );
        Ok(outcomes)
    }

    /// Wire signature mirroring the key.
    pub fn signature(&self) -> wire::Signature {
        self.tree.to_wire_signature()
    }

    /// Compact signature map of the collected signatures.
    pub fn signature_map(&self) -> wire::SignatureMap {
        SignatureMapBuilder::from(&self.tree).to_wire()
    }
}
