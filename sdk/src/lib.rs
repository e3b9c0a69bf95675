//! Hedera SDK core: composite keys, threshold signatures and co-signing.
#![deny(rust_2018_idioms, unreachable_pub)]
#![forbid(unsafe_code)]

pub mod config;
pub mod crypto;
pub mod json;
pub mod key;
pub mod keysig;
pub mod logger;
pub mod signature;
pub mod sigmap;
pub mod testing;
pub mod types;
pub mod wire;

pub use crate::{
    crypto::{
        keypair::KeyPair,
        signature::{Signature, SignatureScheme},
    },
    key::{CompositeKey, KeyKind},
    keysig::{KeySignature, KeySignatureKind, KeyUuidDescription},
    signature::CompositeSignature,
    sigmap::SignatureMapBuilder,
};
