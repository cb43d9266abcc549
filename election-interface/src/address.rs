use core::fmt;
use core::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};

/// Length of an [`Address`] in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// The identity of a caller: an account address as supplied by the wallet/session layer.
///
/// Addresses are rendered as `0x`-prefixed lowercase hex. Parsing accepts both
/// cases and an optional `0x` prefix, so the same account always maps to the
/// same [`Address`] regardless of how the wallet formats it.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, BorshDeserialize, BorshSerialize,
)]
pub struct Address {
    addr: [u8; ADDRESS_LENGTH],
}

impl Address {
    /// Creates a new address containing the given bytes
    pub const fn new(addr: [u8; ADDRESS_LENGTH]) -> Self {
        Self { addr }
    }

    /// Returns the raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.addr
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.addr
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(addr: [u8; ADDRESS_LENGTH]) -> Self {
        Self { addr }
    }
}

impl<'a> TryFrom<&'a [u8]> for Address {
    type Error = anyhow::Error;

    fn try_from(addr: &'a [u8]) -> Result<Self, Self::Error> {
        if addr.len() != ADDRESS_LENGTH {
            anyhow::bail!("Address must be {} bytes long", ADDRESS_LENGTH);
        }
        let mut addr_bytes = [0u8; ADDRESS_LENGTH];
        addr_bytes.copy_from_slice(addr);
        Ok(Self { addr: addr_bytes })
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits)
            .map_err(|e| anyhow::anyhow!("Invalid address {:?}: {}", s, e))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.addr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serde::Serialize::serialize(&self.addr, serializer)
        }
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = <String as serde::Deserialize>::deserialize(deserializer)?;
            Address::from_str(&s).map_err(serde::de::Error::custom)
        } else {
            let addr = <[u8; ADDRESS_LENGTH] as serde::Deserialize>::deserialize(deserializer)?;
            Ok(Address::new(addr))
        }
    }
}
