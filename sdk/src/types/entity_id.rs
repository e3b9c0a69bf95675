//! Shard/realm/number entity identifiers.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{types::Error, wire};

/// Define an entity identifier together with its wire and text forms.
macro_rules! entity_id {
    ($doc:expr, $name:ident, $wire:ident, $num:ident, $json_num:literal) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name {
            #[serde(rename = "shardNum", default)]
            pub shard: i64,
            #[serde(rename = "realmNum", default)]
            pub realm: i64,
            #[serde(rename = $json_num, default)]
            pub num: i64,
        }

        impl $name {
            /// Construct an identifier from its components.
            pub const fn new(shard: i64, realm: i64, num: i64) -> Self {
                Self { shard, realm, num }
            }

            /// Convert into the wire representation.
            pub fn to_wire(&self) -> wire::$wire {
                wire::$wire {
                    shard_num: self.shard,
                    realm_num: self.realm,
                    $num: self.num,
                }
            }

            /// Convert from the wire representation.
            pub fn from_wire(id: &wire::$wire) -> Self {
                Self::new(id.shard_num, id.realm_num, id.$num)
            }
        }

        impl From<$name> for wire::$wire {
            fn from(id: $name) -> wire::$wire {
                id.to_wire()
            }
        }

        impl From<&wire::$wire> for $name {
            fn from(id: &wire::$wire) -> $name {
                $name::from_wire(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let (shard, realm, num) = parse_triple(s)?;
                Ok(Self::new(shard, realm, num))
            }
        }
    };
}

entity_id!(
    "Identifier of an account.",
    AccountId,
    AccountId,
    account_num,
    "accountNum"
);
entity_id!(
    "Identifier of a smart contract.",
    ContractId,
    ContractId,
    contract_num,
    "contractNum"
);
entity_id!("Identifier of a file.", FileId, FileId, file_num, "fileNum");

fn parse_triple(s: &str) -> Result<(i64, i64, i64), Error> {
    let malformed = || Error::MalformedEntityId(s.to_owned());

    let mut parts = s.trim().split('.');
    let mut next = || -> Result<i64, Error> {
        parts
            .next()
            .ok_or_else(malformed)?
            .parse::<i64>()
            .map_err(|_| malformed())
    };
    let triple = (next()?, next()?, next()?);
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok(triple)
}
