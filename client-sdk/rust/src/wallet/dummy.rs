//! Dummy implementations of [`Wallet`], [`Signer`], and [`TransactionIdProvider`] for testing.

use anyhow::Result;
use async_trait::async_trait;

use hedera_sdk::{
    crypto::signature::Signature,
    types::{AccountId, Timestamp, TransactionId},
};

use super::{Signer, TransactionIdProvider, Wallet};

/// A wallet that produces empty signatures for the all-zero key.
pub struct DummyWallet {
    account_id: AccountId,
    signer: DummySigner,
}

impl DummyWallet {
    pub fn new() -> Self {
        Self {
            account_id: AccountId::default(),
            signer: DummySigner::new(vec![0; 32]),
        }
    }
}

impl Default for DummyWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Wallet for DummyWallet {
    fn account_id(&self) -> &AccountId {
        &self.account_id
    }
}

#[async_trait]
impl Signer for DummyWallet {
    fn public_key(&self) -> &[u8] {
        self.signer.public_key()
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature> {
        self.signer.sign(message).await
    }
}

#[async_trait]
impl TransactionIdProvider for DummyWallet {
    async fn next_transaction_id(&self) -> Result<TransactionId> {
        DummyTransactionIdProvider.next_transaction_id().await
    }
}

/// A signer that claims a public key and always returns an empty signature.
pub struct DummySigner {
    public_key: Vec<u8>,
}

impl DummySigner {
    pub fn new(public_key: Vec<u8>) -> Self {
        Self { public_key }
    }
}

#[async_trait]
impl Signer for DummySigner {
    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    async fn sign(&self, _message: &[u8]) -> Result<Signature> {
        Ok(Signature::default())
    }
}

pub struct DummyTransactionIdProvider;

#[async_trait]
impl TransactionIdProvider for DummyTransactionIdProvider {
    async fn next_transaction_id(&self) -> Result<TransactionId> {
        Ok(TransactionId::new(AccountId::default(), Timestamp::default()))
    }
}
