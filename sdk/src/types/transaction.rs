//! Transaction identifiers.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    types::{AccountId, Error, Timestamp},
    wire,
};

/// Client-side identifier of a transaction: the paying account and the start of the validity
/// window.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TransactionId {
    pub account_id: AccountId,
    pub valid_start: Timestamp,
}

impl TransactionId {
    /// Construct a transaction identifier.
    pub fn new(account_id: AccountId, valid_start: Timestamp) -> Self {
        Self {
            account_id,
            valid_start,
        }
    }

    /// Construct a transaction identifier starting now.
    pub fn generate(account_id: AccountId) -> Self {
        Self::new(account_id, Timestamp::now())
    }

    /// Convert into the wire representation.
    pub fn to_wire(&self) -> wire::TransactionId {
        wire::TransactionId {
            transaction_valid_start: Some(self.valid_start.to_wire()),
            account_id: Some(self.account_id.to_wire()),
        }
    }

    /// Convert from the wire representation.
    pub fn from_wire(id: &wire::TransactionId) -> Result<Self, Error> {
        let account_id = id
            .account_id
            .as_ref()
            .ok_or(Error::MissingField("accountID"))?;
        let valid_start = id
            .transaction_valid_start
            .as_ref()
            .ok_or(Error::MissingField("transactionValidStart"))?;
        Ok(Self::new(
            AccountId::from_wire(account_id),
            Timestamp::from_wire(valid_start),
        ))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}.{:09}",
            self.account_id, self.valid_start.seconds, self.valid_start.nanos
        )
    }
}

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::MalformedTransactionId(s.to_owned());

        let (account, start) = s.split_once('@').ok_or_else(malformed)?;
        let (seconds, nanos) = start.split_once('.').ok_or_else(malformed)?;
        let seconds = seconds.parse::<i64>().map_err(|_| malformed())?;
        let nanos = nanos.parse::<u32>().map_err(|_| malformed())?;
        if nanos >= 1_000_000_000 {
            return Err(malformed());
        }

        Ok(Self::new(
            account.parse()?,
            Timestamp::new(seconds, nanos.into()),
        ))
    }
}
