use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Result;
use async_trait::async_trait;

use hedera_sdk::types::{AccountId, Timestamp, TransactionId};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

#[async_trait]
pub trait TransactionIdProvider: Send + Sync {
    /// Fetches the next transaction id. May be called several times before any transaction is
    /// submitted.
    async fn next_transaction_id(&self) -> Result<TransactionId>;
}

/// A simple `TransactionIdProvider` that stamps ids with the current time, bumping the valid
/// start by a nanosecond whenever the clock has not advanced since the previous id.
pub struct SimpleTransactionIdProvider {
    account_id: AccountId,
    last_start: AtomicI64,
}

impl SimpleTransactionIdProvider {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            last_start: AtomicI64::new(i64::MIN),
        }
    }

    fn next_start(&self, now: Timestamp) -> Timestamp {
        let now = now
            .seconds
            .saturating_mul(NANOS_PER_SECOND)
            .saturating_add(now.nanos.into());
        let mut last = self.last_start.load(Ordering::SeqCst);
        loop {
            let next = now.max(last.saturating_add(1));
            match self
                .last_start
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return Timestamp::new(0, next),
                Err(current) => last = current,
            }
        }
    }
}

#[async_trait]
impl TransactionIdProvider for SimpleTransactionIdProvider {
    async fn next_transaction_id(&self) -> Result<TransactionId> {
        Ok(TransactionId::new(
            self.account_id,
            self.next_start(Timestamp::now()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_valid_start() {
        let provider = SimpleTransactionIdProvider::new(AccountId::new(0, 0, 2));
        let frozen = Timestamp::new(1_600_000_000, 999_999_999);

        let a = provider.next_start(frozen);
        let b = provider.next_start(frozen);
        assert_eq!(a, frozen);
        assert_eq!(b, Timestamp::new(1_600_000_001, 0));

        // A clock going backwards still yields increasing ids.
        let c = provider.next_start(Timestamp::new(1_500_000_000, 0));
        assert!(c > b);
    }

    #[tokio::test]
    async fn ids_are_distinct() {
        let provider = SimpleTransactionIdProvider::new(AccountId::new(0, 0, 2));
        let a = provider.next_transaction_id().await.unwrap();
        let b = provider.next_transaction_id().await.unwrap();
        assert_eq!(a.account_id, AccountId::new(0, 0, 2));
        assert!(b.valid_start > a.valid_start);
    }
}
