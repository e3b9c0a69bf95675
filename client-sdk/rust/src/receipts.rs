//! Tracking of submitted transactions until their receipts settle.
use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use slog::{debug, warn, Logger};
use tokio::sync::Mutex;

use hedera_sdk::{
    logger::get_logger,
    types::{AccountId, ContractId, FileId, TransactionId},
};

/// Network response code, as carried by prechecks and receipts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Ok,
    InvalidTransaction,
    PayerAccountNotFound,
    InvalidNodeAccount,
    TransactionExpired,
    InvalidTransactionStart,
    InvalidSignature,
    InsufficientTxFee,
    InsufficientPayerBalance,
    DuplicateTransaction,
    Busy,
    NotSupported,
    ReceiptNotFound,
    Unknown,
    Success,
    FailInvalid,
    FailFee,
    FailBalance,
    Other(i32),
}

impl ResponseCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ResponseCode::Ok,
            1 => ResponseCode::InvalidTransaction,
            2 => ResponseCode::PayerAccountNotFound,
            3 => ResponseCode::InvalidNodeAccount,
            4 => ResponseCode::TransactionExpired,
            5 => ResponseCode::InvalidTransactionStart,
            7 => ResponseCode::InvalidSignature,
            9 => ResponseCode::InsufficientTxFee,
            10 => ResponseCode::InsufficientPayerBalance,
            11 => ResponseCode::DuplicateTransaction,
            12 => ResponseCode::Busy,
            13 => ResponseCode::NotSupported,
            18 => ResponseCode::ReceiptNotFound,
            21 => ResponseCode::Unknown,
            22 => ResponseCode::Success,
            23 => ResponseCode::FailInvalid,
            24 => ResponseCode::FailFee,
            25 => ResponseCode::FailBalance,
            other => ResponseCode::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ResponseCode::Ok => 0,
            ResponseCode::InvalidTransaction => 1,
            ResponseCode::PayerAccountNotFound => 2,
            ResponseCode::InvalidNodeAccount => 3,
            ResponseCode::TransactionExpired => 4,
            ResponseCode::InvalidTransactionStart => 5,
            ResponseCode::InvalidSignature => 7,
            ResponseCode::InsufficientTxFee => 9,
            ResponseCode::InsufficientPayerBalance => 10,
            ResponseCode::DuplicateTransaction => 11,
            ResponseCode::Busy => 12,
            ResponseCode::NotSupported => 13,
            ResponseCode::ReceiptNotFound => 18,
            ResponseCode::Unknown => 21,
            ResponseCode::Success => 22,
            ResponseCode::FailInvalid => 23,
            ResponseCode::FailFee => 24,
            ResponseCode::FailBalance => 25,
            ResponseCode::Other(code) => *code,
        }
    }
}

/// Outcome of a submitted transaction as last observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Result of the node precheck.
    pub precheck: ResponseCode,
    /// Consensus status of the transaction.
    pub status: ResponseCode,
    pub account_id: Option<AccountId>,
    pub contract_id: Option<ContractId>,
    pub file_id: Option<FileId>,
}

impl Default for TransactionReceipt {
    fn default() -> Self {
        Self {
            precheck: ResponseCode::Unknown,
            status: ResponseCode::Unknown,
            account_id: None,
            contract_id: None,
            file_id: None,
        }
    }
}

impl TransactionReceipt {
    /// Whether polling this transaction again is pointless.
    ///
    /// Busy nodes and transactions the node has not yet accepted keep being polled, as do
    /// accepted transactions that have not yet succeeded.
    pub fn is_terminal(&self) -> bool {
        match self.precheck {
            ResponseCode::Busy | ResponseCode::InvalidTransaction => false,
            ResponseCode::Ok | ResponseCode::Success => self.status == ResponseCode::Success,
            _ => true,
        }
    }
}

/// Where receipts are fetched from, typically a network node.
#[async_trait]
pub trait ReceiptSource<N: Send + Sync>: Send + Sync {
    async fn get_receipt(&self, tx_id: &TransactionId, node: &N) -> Result<TransactionReceipt>;
}

struct PendingReceipt<N> {
    node: N,
    receipt: TransactionReceipt,
}

/// Caller-owned table of transactions awaiting a terminal receipt.
///
/// All operations serialize on a single lock, including the network round trips of
/// [`ReceiptRegistry::refresh`].
pub struct ReceiptRegistry<N> {
    pending: Mutex<BTreeMap<TransactionId, PendingReceipt<N>>>,
    logger: Logger,
}

impl<N: Send + Sync> Default for ReceiptRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Send + Sync> ReceiptRegistry<N> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(BTreeMap::new()),
            logger: get_logger("client/receipts"),
        }
    }

    /// Track a transaction submitted to `node`.
    pub async fn track(&self, tx_id: TransactionId, node: N) {
        self.track_with_receipt(tx_id, node, TransactionReceipt::default())
            .await
    }

    /// Track a transaction with an already known receipt, e.g. its precheck result.
    pub async fn track_with_receipt(
        &self,
        tx_id: TransactionId,
        node: N,
        receipt: TransactionReceipt,
    ) {
        self.pending
            .lock()
            .await
            .insert(tx_id, PendingReceipt { node, receipt });
    }

    /// Stop tracking a transaction. Returns whether it was tracked.
    pub async fn untrack(&self, tx_id: &TransactionId) -> bool {
        self.pending.lock().await.remove(tx_id).is_some()
    }

    /// Latest receipt of a tracked transaction.
    pub async fn receipt(&self, tx_id: &TransactionId) -> Option<TransactionReceipt> {
        self.pending
            .lock()
            .await
            .get(tx_id)
            .map(|p| p.receipt.clone())
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    /// Poll every tracked transaction once and evict those whose receipt is terminal.
    ///
    /// Returns the evicted transactions with their final receipts. Transactions whose poll
    /// fails stay tracked.
    pub async fn refresh<S: ReceiptSource<N>>(
        &self,
        source: &S,
    ) -> Vec<(TransactionId, TransactionReceipt)> {
        let mut pending = self.pending.lock().await;
        let mut evicted = Vec::new();

        for (tx_id, entry) in pending.iter_mut() {
            match source.get_receipt(tx_id, &entry.node).await {
                Ok(receipt) => entry.receipt = receipt,
                Err(err) => {
                    warn!(self.logger, "failed to fetch receipt";
                        "tx_id" => %tx_id,
                        "err" => %err,
                    );
                    continue;
                }
            }
            if entry.receipt.is_terminal() {
                evicted.push((*tx_id, entry.receipt.clone()));
            }
        }
        for (tx_id, _) in &evicted {
            pending.remove(tx_id);
        }

        debug!(self.logger, "refreshed receipts";
            "evicted" => evicted.len(),
            "pending" => pending.len(),
        );
        evicted
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::anyhow;
    use hedera_sdk::types::Timestamp;

    use super::*;

    fn tx(n: i64) -> TransactionId {
        TransactionId::new(AccountId::new(0, 0, 2), Timestamp::new(n, 0))
    }

    fn receipt(precheck: ResponseCode, status: ResponseCode) -> TransactionReceipt {
        TransactionReceipt {
            precheck,
            status,
            ..Default::default()
        }
    }

    /// Serves canned receipts; transactions without one fail to poll.
    struct Canned(HashMap<TransactionId, TransactionReceipt>);

    #[async_trait]
    impl ReceiptSource<AccountId> for Canned {
        async fn get_receipt(
            &self,
            tx_id: &TransactionId,
            _node: &AccountId,
        ) -> Result<TransactionReceipt> {
            self.0
                .get(tx_id)
                .cloned()
                .ok_or_else(|| anyhow!("node unreachable"))
        }
    }

    #[test]
    fn terminal_receipts() {
        use ResponseCode::*;

        assert!(!receipt(Busy, Unknown).is_terminal());
        assert!(!receipt(InvalidTransaction, Unknown).is_terminal());
        assert!(!receipt(Ok, Unknown).is_terminal());
        assert!(!receipt(Success, FailBalance).is_terminal());
        assert!(receipt(Ok, Success).is_terminal());
        assert!(receipt(Success, Success).is_terminal());
        assert!(receipt(DuplicateTransaction, Unknown).is_terminal());
        assert!(receipt(Other(99), Unknown).is_terminal());
    }

    #[test]
    fn response_codes() {
        for code in 0..30 {
            assert_eq!(ResponseCode::from_code(code).code(), code);
        }
        assert_eq!(ResponseCode::from_code(12), ResponseCode::Busy);
        assert_eq!(ResponseCode::from_code(22), ResponseCode::Success);
    }

    #[tokio::test]
    async fn refresh_evicts_terminal() {
        let node = AccountId::new(0, 0, 3);
        let registry = ReceiptRegistry::new();
        for n in 1..=4 {
            registry.track(tx(n), node).await;
        }
        assert_eq!(registry.len().await, 4);
        assert_eq!(
            registry.receipt(&tx(1)).await,
            Some(TransactionReceipt::default())
        );

        let source = Canned(
            vec![
                (tx(1), receipt(ResponseCode::Ok, ResponseCode::Success)),
                (tx(2), receipt(ResponseCode::Busy, ResponseCode::Unknown)),
                (tx(3), receipt(ResponseCode::InsufficientTxFee, ResponseCode::Unknown)),
            ]
            .into_iter()
            .collect(),
        );

        let evicted = registry.refresh(&source).await;
        assert_eq!(
            evicted,
            vec![
                (tx(1), receipt(ResponseCode::Ok, ResponseCode::Success)),
                (
                    tx(3),
                    receipt(ResponseCode::InsufficientTxFee, ResponseCode::Unknown)
                ),
            ]
        );

        // Busy and failed polls stay tracked, the former with its latest receipt.
        assert_eq!(registry.len().await, 2);
        assert_eq!(
            registry.receipt(&tx(2)).await,
            Some(receipt(ResponseCode::Busy, ResponseCode::Unknown))
        );
        assert_eq!(
            registry.receipt(&tx(4)).await,
            Some(TransactionReceipt::default())
        );
        assert_eq!(registry.receipt(&tx(1)).await, None);
    }

    #[tokio::test]
    async fn track_and_untrack() {
        let registry: ReceiptRegistry<AccountId> = ReceiptRegistry::default();
        assert!(registry.is_empty().await);

        let known = receipt(ResponseCode::Ok, ResponseCode::Unknown);
        registry
            .track_with_receipt(tx(7), AccountId::new(0, 0, 4), known.clone())
            .await;
        assert_eq!(registry.receipt(&tx(7)).await, Some(known));

        assert!(registry.untrack(&tx(7)).await);
        assert!(!registry.untrack(&tx(7)).await);
        assert!(registry.is_empty().await);
    }
}
