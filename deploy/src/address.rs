use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Zero address, the destination of every install transaction.
pub const SYSTEM_ADDRESS: &str = "cx0000000000000000000000000000000000000000";

#[derive(Debug, Error)]
#[error("invalid address: '{0}'")]
pub struct InvalidAddress(String);

/// A validated account ("hx") or contract ("cx") address.
///
/// The tail must be 40 characters of canonical lowercase hex; anything that
/// does not survive a decode/re-encode round trip byte-for-byte is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Externally owned account address from its 20-byte body.
    pub fn eoa(body: [u8; 20]) -> Self {
        Address(format!("hx{}", hex::encode(body)))
    }
}

impl FromStr for Address {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // the ascii prefix match also guarantees slicing at 2 is safe for
        // arbitrary (multi-byte) input
        if s.len() == 42 && (s.starts_with("hx") || s.starts_with("cx")) {
            let body = &s[2..];
            if let Ok(raw) = hex::decode(body) {
                if hex::encode(raw) == body {
                    return Ok(Address(s.to_string()));
                }
            }
        }
        Err(InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
