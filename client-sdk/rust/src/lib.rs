#![deny(rust_2018_idioms, unreachable_pub)]
#![forbid(unsafe_code)]

pub mod receipts;
pub mod session;
pub mod wallet;

pub use receipts::{ReceiptRegistry, ReceiptSource, ResponseCode, TransactionReceipt};
pub use session::{Error, SigningSession};
pub use wallet::{Signer, Wallet};
