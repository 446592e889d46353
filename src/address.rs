use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const ADDRESS_BYTE_COUNT: usize = 32;

/// A recipient address: the raw bytes of an ed25519 public key.
/// The address does not validate that the bytes form a curve point; a signature
/// check against an address that is not a valid public key simply fails.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_BYTE_COUNT]);

impl Address {
    pub const fn from_raw(raw_bytes: [u8; ADDRESS_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0[..])
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        if bytes.len() != ADDRESS_BYTE_COUNT {
            return Err(format!(
                "Invalid address length. Expected: {} but got: {} in: {}",
                ADDRESS_BYTE_COUNT,
                bytes.len(),
                s
            ));
        }
        let mut address = [0; ADDRESS_BYTE_COUNT];
        address.copy_from_slice(&bytes);
        Ok(Address::from_raw(address))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let address = Address::from_raw([0xab; 32]);
        assert_eq!(Address::from_hex(&address.to_hex()), Ok(address));
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(Address::from_hex("abcd").is_err());
    }
}
