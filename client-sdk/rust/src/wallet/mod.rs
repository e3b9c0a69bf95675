pub mod dummy;
pub mod ed25519;
pub mod transaction_id;

use anyhow::Result;
use async_trait::async_trait;

use hedera_sdk::{crypto::signature::Signature, types::AccountId};

pub use transaction_id::{SimpleTransactionIdProvider, TransactionIdProvider};

#[async_trait]
pub trait Wallet: Signer + TransactionIdProvider {
    /// Account paying for transactions submitted through this wallet.
    fn account_id(&self) -> &AccountId;
}

#[async_trait]
pub trait Signer: Send + Sync {
    /// Raw public key of the key this signer signs with.
    fn public_key(&self) -> &[u8];

    async fn sign(&self, message: &[u8]) -> Result<Signature>;
}
