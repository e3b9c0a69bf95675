//! JSON keyfile format shared by composite keys and keyed signature trees.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::ContractId;

/// Error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("key type is not set")]
    MissingType,
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("unknown key type: {0}")]
    UnknownType(String),
    #[error("malformed base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("malformed uuid: {0}")]
    Uuid(#[from] uuid::Error),
    #[error("malformed json: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Type tag of a keyfile record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    Contract,
    Ed25519,
    KeyList,
    Threshold,
    NotSet,
}

impl RecordType {
    /// Tag as written to keyfiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Contract => "CONTRACT",
            RecordType::Ed25519 => "ED25519",
            RecordType::KeyList => "KEYLIST",
            RecordType::Threshold => "THRESHOLD",
            RecordType::NotSet => "NOTSET",
        }
    }

    fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "CONTRACT" => Ok(RecordType::Contract),
            "ED25519" => Ok(RecordType::Ed25519),
            "KEYLIST" => Ok(RecordType::KeyList),
            "THRESHOLD" => Ok(RecordType::Threshold),
            "NOTSET" => Ok(RecordType::NotSet),
            other => Err(Error::UnknownType(other.to_owned())),
        }
    }
}

/// A single keyfile record, possibly nesting further records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyRecord {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(
        rename = "signatureType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signature_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<KeyRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Body of a threshold record, stored under `key`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct ThresholdRecord {
    #[serde(default)]
    threshold: u32,
    #[serde(default)]
    keys: Vec<KeyRecord>,
}

/// Decoded shape of a keyfile record.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordBody {
    Ed25519(Vec<u8>),
    Contract(ContractId),
    List(Vec<KeyRecord>),
    Threshold { threshold: u32, keys: Vec<KeyRecord> },
    NotSet,
}

impl RecordBody {
    fn record_type(&self) -> RecordType {
        match self {
            RecordBody::Ed25519(_) => RecordType::Ed25519,
            RecordBody::Contract(_) => RecordType::Contract,
            RecordBody::List(_) => RecordType::KeyList,
            RecordBody::Threshold { .. } => RecordType::Threshold,
            RecordBody::NotSet => RecordType::NotSet,
        }
    }
}

impl KeyRecord {
    /// Build a record.
    pub fn new(
        description: &str,
        uuid: &Uuid,
        body: RecordBody,
        signature: Option<&[u8]>,
    ) -> Result<Self, Error> {
        let tag = body.record_type().as_str().to_owned();
        let mut record = KeyRecord {
            description: description.to_owned(),
            uuid: Some(uuid.to_string()),
            key_type: Some(tag.clone()),
            signature_type: Some(tag),
            signature: signature.map(|sig| STANDARD.encode(sig)),
            ..Default::default()
        };

        match body {
            RecordBody::Ed25519(pk) => {
                record.key = Some(serde_json::Value::String(STANDARD.encode(pk)));
            }
            RecordBody::Contract(id) => {
                record.key = Some(serde_json::to_value(id)?);
            }
            RecordBody::List(keys) => {
                record.keys = Some(keys);
            }
            RecordBody::Threshold { threshold, keys } => {
                record.key = Some(serde_json::to_value(ThresholdRecord { threshold, keys })?);
            }
            RecordBody::NotSet => {}
        }
        Ok(record)
    }

    /// Parse a record from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the record into a JSON string.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Record uuid, or a fresh one when absent.
    pub fn uuid(&self) -> Result<Uuid, Error> {
        match &self.uuid {
            Some(uuid) => Ok(Uuid::parse_str(uuid)?),
            None => Ok(Uuid::new_v4()),
        }
    }

    /// Decoded signature, if present.
    pub fn signature(&self) -> Result<Option<Vec<u8>>, Error> {
        match &self.signature {
            Some(sig) => Ok(Some(STANDARD.decode(sig)?)),
            None => Ok(None),
        }
    }

    /// Decode the shape of the record.
    pub fn body(&self) -> Result<RecordBody, Error> {
        let tag = self.key_type.as_deref().ok_or(Error::MissingType)?;
        let key = || self.key.clone().ok_or(Error::MissingField("key"));

        match RecordType::parse(tag)? {
            RecordType::Ed25519 => {
                let pk: String = serde_json::from_value(key()?)?;
                Ok(RecordBody::Ed25519(STANDARD.decode(pk)?))
            }
            RecordType::Contract => Ok(RecordBody::Contract(serde_json::from_value(key()?)?)),
            RecordType::KeyList => Ok(RecordBody::List(self.keys.clone().unwrap_or_default())),
            RecordType::Threshold => {
                let ThresholdRecord { threshold, keys } = serde_json::from_value(key()?)?;
                Ok(RecordBody::Threshold { threshold, keys })
            }
            RecordType::NotSet => Ok(RecordBody::NotSet),
        }
    }
}
