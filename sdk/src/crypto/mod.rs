//! Cryptography.
pub mod keypair;
pub mod mnemonic;
pub mod signature;
