//! Protocol buffer messages exchanged with the network.
//!
//! Field numbers follow the Hedera API definitions.

#[derive(Clone, PartialEq, prost::Message)]
pub struct ContractId {
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    #[prost(int64, tag = "3")]
    pub contract_num: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AccountId {
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    #[prost(int64, tag = "3")]
    pub account_num: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FileId {
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    #[prost(int64, tag = "3")]
    pub file_num: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Duration {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TransactionId {
    #[prost(message, optional, tag = "1")]
    pub transaction_valid_start: Option<Timestamp>,
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
}

/// A key of any shape.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Key {
    #[prost(oneof = "KeyVariant", tags = "1, 2, 3, 4, 5, 6")]
    pub key: Option<KeyVariant>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum KeyVariant {
    #[prost(message, tag = "1")]
    ContractId(ContractId),
    #[prost(bytes, tag = "2")]
    Ed25519(Vec<u8>),
    // Reserved by the protocol, never produced.
    #[prost(bytes, tag = "3")]
    Rsa3072(Vec<u8>),
    #[prost(bytes, tag = "4")]
    Ecdsa384(Vec<u8>),
    #[prost(message, tag = "5")]
    ThresholdKey(ThresholdKey),
    #[prost(message, tag = "6")]
    KeyList(KeyList),
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct KeyList {
    #[prost(message, repeated, tag = "1")]
    pub keys: Vec<Key>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ThresholdKey {
    #[prost(uint32, tag = "1")]
    pub threshold: u32,
    #[prost(message, optional, tag = "2")]
    pub keys: Option<KeyList>,
}

/// A signature of any shape, positionally congruent with a [`Key`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct Signature {
    #[prost(oneof = "SignatureVariant", tags = "1, 2, 3, 4, 5, 6")]
    pub signature: Option<SignatureVariant>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum SignatureVariant {
    #[prost(bytes, tag = "1")]
    Contract(Vec<u8>),
    #[prost(bytes, tag = "2")]
    Ed25519(Vec<u8>),
    #[prost(bytes, tag = "3")]
    Rsa3072(Vec<u8>),
    #[prost(bytes, tag = "4")]
    Ecdsa384(Vec<u8>),
    #[prost(message, tag = "5")]
    ThresholdSignature(ThresholdSignature),
    #[prost(message, tag = "6")]
    SignatureList(SignatureList),
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SignatureList {
    #[prost(message, repeated, tag = "2")]
    pub sigs: Vec<Signature>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ThresholdSignature {
    #[prost(message, optional, tag = "2")]
    pub sigs: Option<SignatureList>,
}

/// A signature together with the shortest unambiguous prefix of its public key.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SignaturePair {
    #[prost(bytes, tag = "1")]
    pub pub_key_prefix: Vec<u8>,
    #[prost(oneof = "SignaturePairVariant", tags = "2, 3, 4, 5")]
    pub signature: Option<SignaturePairVariant>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum SignaturePairVariant {
    #[prost(bytes, tag = "2")]
    Contract(Vec<u8>),
    #[prost(bytes, tag = "3")]
    Ed25519(Vec<u8>),
    #[prost(bytes, tag = "4")]
    Rsa3072(Vec<u8>),
    #[prost(bytes, tag = "5")]
    Ecdsa384(Vec<u8>),
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SignatureMap {
    #[prost(message, repeated, tag = "1")]
    pub sig_pair: Vec<SignaturePair>,
}

/// Serialize a message into protobuf bytes.
pub fn encode<M: prost::Message>(message: &M) -> Vec<u8> {
    let mut buf = Vec::with_capacity(message.encoded_len());
    // Encoding into a vector can only fail on insufficient capacity, and the vector grows.
    let _ = message.encode(&mut buf);
    buf
}

/// Deserialize a message from protobuf bytes.
pub fn decode<M: prost::Message + Default>(bytes: &[u8]) -> Result<M, prost::DecodeError> {
    M::decode(bytes)
}

impl Key {
    /// Serialize into protobuf bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }
}

impl Signature {
    /// Serialize into protobuf bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }
}

impl SignatureMap {
    /// Serialize into protobuf bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_field_numbers() {
        // ed25519 = 2, length-delimited.
        let key = Key {
            key: Some(KeyVariant::Ed25519(vec![0xaa; 2])),
        };
        assert_eq!(key.to_bytes(), vec![0x12, 0x02, 0xaa, 0xaa]);

        // keyList = 6 wrapping keys = 1.
        let list = Key {
            key: Some(KeyVariant::KeyList(KeyList { keys: vec![key] })),
        };
        assert_eq!(
            list.to_bytes(),
            vec![0x32, 0x06, 0x0a, 0x04, 0x12, 0x02, 0xaa, 0xaa]
        );

        // signatureList = 6 wrapping sigs = 2.
        let sig = Signature {
            signature: Some(SignatureVariant::SignatureList(SignatureList {
                sigs: vec![Signature {
                    signature: Some(SignatureVariant::Contract(vec![])),
                }],
            })),
        };
        assert_eq!(sig.to_bytes(), vec![0x32, 0x04, 0x12, 0x02, 0x0a, 0x00]);
    }

    #[test]
    fn test_decode() {
        let key: Key = decode(&[0x12, 0x02, 0xaa, 0xaa]).unwrap();
        assert_eq!(key.key, Some(KeyVariant::Ed25519(vec![0xaa; 2])));

        let empty: Key = decode(&[]).unwrap();
        assert_eq!(empty.key, None);

        assert!(decode::<Key>(&[0x12, 0x05, 0xaa]).is_err());
    }
}
