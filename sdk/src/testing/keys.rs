//! Module that contains known test keys.

/// Define an Ed25519 test key derived from a fixed seed.
macro_rules! test_key_ed25519 {
    ($doc:expr, $name:ident, $seed:expr) => {
        #[doc = " Test key "]
        #[doc=$doc]
        #[doc = "."]
        pub mod $name {
            use crate::{
                crypto::{keypair::KeyPair, signature::SignatureScheme},
                key::CompositeKey,
            };

            #[doc = " Test seed "]
            #[doc=$doc]
            #[doc = "."]
            pub fn seed() -> [u8; 32] {
                [$seed; 32]
            }

            #[doc = " Test key pair "]
            #[doc=$doc]
            #[doc = "."]
            pub fn keypair() -> KeyPair {
                KeyPair::from_seed(SignatureScheme::Ed25519, Some(&seed()))
                    .expect("test seed should be valid")
            }

            #[doc = " Test public key "]
            #[doc=$doc]
            #[doc = "."]
            pub fn pk() -> Vec<u8> {
                keypair().public_key_bytes().to_vec()
            }

            #[doc = " Test composite key "]
            #[doc=$doc]
            #[doc = "."]
            pub fn key() -> CompositeKey {
                CompositeKey::primitive(keypair()).with_description($doc)
            }
        }
    };
}

test_key_ed25519!("A", alice, 0xa1);
test_key_ed25519!("B", bob, 0xb2);
test_key_ed25519!("C", charlie, 0xc3);
test_key_ed25519!("D", dave, 0xd4);
