//! Composite signatures.
use thiserror::Error;

use crate::{crypto::signature::SignatureScheme, wire};

/// Error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("signature not set")]
    SignatureNotSet,
    #[error("unrecognized signature variant: {0}")]
    UnrecognizedSignatureVariant(&'static str),
    #[error("malformed signature: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// A signature shaped like the composite key it was produced for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompositeSignature {
    /// Signature of a single key pair; empty when the key has not signed.
    Primitive {
        scheme: SignatureScheme,
        signature: Vec<u8>,
    },
    /// Contracts never sign, this always encodes as zero-length bytes.
    Contract,
    List(Vec<CompositeSignature>),
    Threshold(Vec<CompositeSignature>),
}

impl CompositeSignature {
    /// Construct an Ed25519 signature.
    pub fn ed25519(signature: Vec<u8>) -> Self {
        CompositeSignature::Primitive {
            scheme: SignatureScheme::Ed25519,
            signature,
        }
    }

    /// Convert into the wire representation.
    pub fn to_wire(&self) -> wire::Signature {
        let signature = match self {
            CompositeSignature::Primitive { scheme, signature } => {
                primitive_to_wire(*scheme, signature.clone())
            }
            CompositeSignature::Contract => wire::SignatureVariant::Contract(Vec::new()),
            CompositeSignature::List(sigs) => {
                wire::SignatureVariant::SignatureList(signature_list(sigs))
            }
            CompositeSignature::Threshold(sigs) => {
                wire::SignatureVariant::ThresholdSignature(wire::ThresholdSignature {
                    sigs: Some(signature_list(sigs)),
                })
            }
        };
        wire::Signature {
            signature: Some(signature),
        }
    }

    /// Convert from the wire representation.
    ///
    /// Any bytes carried by a contract signature are discarded.
    pub fn from_wire(sig: &wire::Signature) -> Result<Self, Error> {
        match sig.signature.as_ref().ok_or(Error::SignatureNotSet)? {
            wire::SignatureVariant::Ed25519(sig) => Ok(Self::ed25519(sig.clone())),
            wire::SignatureVariant::Contract(_) => Ok(CompositeSignature::Contract),
            wire::SignatureVariant::SignatureList(list) => {
                Ok(CompositeSignature::List(from_wire_all(&list.sigs)?))
            }
            wire::SignatureVariant::ThresholdSignature(ts) => {
                Ok(CompositeSignature::Threshold(match &ts.sigs {
                    Some(list) => from_wire_all(&list.sigs)?,
                    None => Vec::new(),
                }))
            }
            wire::SignatureVariant::Rsa3072(_) => {
                Err(Error::UnrecognizedSignatureVariant("RSA_3072"))
            }
            wire::SignatureVariant::Ecdsa384(_) => {
                Err(Error::UnrecognizedSignatureVariant("ECDSA_384"))
            }
        }
    }

    /// Serialize into protobuf bytes.
    pub fn encode(&self) -> Vec<u8> {
        self.to_wire().to_bytes()
    }

    /// Deserialize from protobuf bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let sig: wire::Signature = wire::decode(bytes)?;
        Self::from_wire(&sig)
    }

    /// Whether this signature is positionally congruent with the given key.
    pub fn same_shape(&self, key: &wire::Key) -> bool {
        match (self, key.key.as_ref()) {
            (CompositeSignature::Primitive { scheme, .. }, Some(variant)) => matches!(
                (scheme, variant),
                (SignatureScheme::Ed25519, wire::KeyVariant::Ed25519(_))
                    | (SignatureScheme::Rsa3072, wire::KeyVariant::Rsa3072(_))
                    | (SignatureScheme::Ecdsa384, wire::KeyVariant::Ecdsa384(_))
            ),
            (CompositeSignature::Contract, Some(wire::KeyVariant::ContractId(_))) => true,
            (CompositeSignature::List(sigs), Some(wire::KeyVariant::KeyList(list))) => {
                same_shape_all(sigs, &list.keys)
            }
            (CompositeSignature::Threshold(sigs), Some(wire::KeyVariant::ThresholdKey(tk))) => {
                let keys = tk.keys.as_ref().map(|l| &l.keys[..]).unwrap_or(&[]);
                same_shape_all(sigs, keys)
            }
            _ => false,
        }
    }
}

fn primitive_to_wire(scheme: SignatureScheme, sig: Vec<u8>) -> wire::SignatureVariant {
    match scheme {
        SignatureScheme::Ed25519 => wire::SignatureVariant::Ed25519(sig),
        SignatureScheme::Rsa3072 => wire::SignatureVariant::Rsa3072(sig),
        SignatureScheme::Ecdsa384 => wire::SignatureVariant::Ecdsa384(sig),
    }
}

fn signature_list(sigs: &[CompositeSignature]) -> wire::SignatureList {
    wire::SignatureList {
        sigs: sigs.iter().map(CompositeSignature::to_wire).collect(),
    }
}

fn from_wire_all(sigs: &[wire::Signature]) -> Result<Vec<CompositeSignature>, Error> {
    sigs.iter().map(CompositeSignature::from_wire).collect()
}

fn same_shape_all(sigs: &[CompositeSignature], keys: &[wire::Key]) -> bool {
    sigs.len() == keys.len() && sigs.iter().zip(keys).all(|(s, k)| s.same_shape(k))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_contract_always_empty() {
        let wire_sig = wire::Signature {
            signature: Some(wire::SignatureVariant::Contract(vec![1, 2, 3])),
        };
        let sig = CompositeSignature::from_wire(&wire_sig).unwrap();
        assert_eq!(sig, CompositeSignature::Contract);
        assert_eq!(
            sig.to_wire().signature,
            Some(wire::SignatureVariant::Contract(vec![]))
        );
    }

    #[test]
    fn test_roundtrip() {
        let sig = CompositeSignature::List(vec![
            CompositeSignature::ed25519(vec![7; 64]),
            CompositeSignature::Threshold(vec![
                CompositeSignature::Contract,
                CompositeSignature::ed25519(vec![]),
            ]),
        ]);
        assert_eq!(CompositeSignature::decode(&sig.encode()).unwrap(), sig);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            CompositeSignature::from_wire(&wire::Signature::default()),
            Err(Error::SignatureNotSet)
        ));
        let rsa = wire::Signature {
            signature: Some(wire::SignatureVariant::Rsa3072(vec![1])),
        };
        assert!(matches!(
            CompositeSignature::from_wire(&rsa),
            Err(Error::UnrecognizedSignatureVariant("RSA_3072"))
        ));
        // A nested unset signature fails the whole decode.
        let nested = wire::Signature {
            signature: Some(wire::SignatureVariant::SignatureList(wire::SignatureList {
                sigs: vec![wire::Signature::default()],
            })),
        };
        assert!(matches!(
            CompositeSignature::from_wire(&nested),
            Err(Error::SignatureNotSet)
        ));
        assert!(matches!(
            CompositeSignature::decode(&[0xff]),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_same_shape() {
        let key = wire::Key {
            key: Some(wire::KeyVariant::ThresholdKey(wire::ThresholdKey {
                threshold: 1,
                keys: Some(wire::KeyList {
                    keys: vec![wire::Key {
                        key: Some(wire::KeyVariant::Ed25519(vec![0; 32])),
                    }],
                }),
            })),
        };
        let sig = CompositeSignature::Threshold(vec![CompositeSignature::ed25519(vec![])]);
        assert!(sig.same_shape(&key));

        assert!(!CompositeSignature::List(vec![CompositeSignature::ed25519(vec![])])
            .same_shape(&key));
        assert!(!CompositeSignature::Threshold(vec![]).same_shape(&key));
        assert!(!CompositeSignature::Contract.same_shape(&wire::Key::default()));
    }
}
