use anyhow::{anyhow, Result};
use async_trait::async_trait;

use hedera_sdk::{
    crypto::{keypair::KeyPair, signature::Signature},
    types::{AccountId, TransactionId},
};

use super::{Signer, TransactionIdProvider, Wallet};

pub struct Ed25519Wallet<P> {
    account_id: AccountId,
    keypair: KeyPair,
    id_provider: P,
}

impl<P: TransactionIdProvider> Ed25519Wallet<P> {
    pub fn new(account_id: AccountId, keypair: KeyPair, id_provider: P) -> Result<Self> {
        if !keypair.has_private_key() {
            return Err(anyhow!("wallet key pair has no private key"));
        }
        Ok(Self {
            account_id,
            keypair,
            id_provider,
        })
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }
}

#[async_trait]
impl<P: TransactionIdProvider> Signer for Ed25519Wallet<P> {
    fn public_key(&self) -> &[u8] {
        self.keypair.public_key_bytes()
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature> {
        Ok(self.keypair.sign(message)?)
    }
}

#[async_trait]
impl<P: TransactionIdProvider> TransactionIdProvider for Ed25519Wallet<P> {
    async fn next_transaction_id(&self) -> Result<TransactionId> {
        self.id_provider.next_transaction_id().await
    }
}

#[async_trait]
impl<P: TransactionIdProvider> Wallet for Ed25519Wallet<P> {
    fn account_id(&self) -> &AccountId {
        &self.account_id
    }
}
