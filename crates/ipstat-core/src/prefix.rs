//! CIDR prefix length
//!
//! A validated count of leading one-bits in an IPv4 network mask.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{IpStatError, Result};

/// Prefix length (0-32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PrefixLength(u8);

impl PrefixLength {
    /// Largest valid prefix length
    pub const MAX: u8 = 32;

    /// Create a prefix length, rejecting values above 32
    ///
    /// # Examples
    ///
    /// ```
    /// use ipstat_core::PrefixLength;
    ///
    /// assert!(PrefixLength::new(24).is_ok());
    /// assert!(PrefixLength::new(33).is_err());
    /// ```
    pub fn new(len: u8) -> Result<Self> {
        if len > Self::MAX {
            return Err(IpStatError::InvalidPrefixLength(len.to_string()));
        }
        Ok(Self(len))
    }

    /// Get the prefix length
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Number of host bits (`32 - len`)
    pub const fn host_bits(&self) -> u32 {
        (Self::MAX - self.0) as u32
    }

    /// Network mask with the top `len` bits set
    ///
    /// ```
    /// use ipstat_core::PrefixLength;
    ///
    /// assert_eq!(PrefixLength::new(20).unwrap().mask(), 0xFFFFF000);
    /// assert_eq!(PrefixLength::new(0).unwrap().mask(), 0);
    /// ```
    pub fn mask(&self) -> u32 {
        // shifting a u32 by 32 overflows, /0 has no mask bits at all
        u32::MAX.checked_shl(self.host_bits()).unwrap_or(0)
    }

    /// Number of addresses covered (`2^(32 - len)`)
    pub const fn address_count(&self) -> u64 {
        1u64 << self.host_bits()
    }
}

impl fmt::Display for PrefixLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PrefixLength {
    type Err = IpStatError;

    fn from_str(s: &str) -> Result<Self> {
        let len: u8 = s
            .parse()
            .map_err(|_| IpStatError::InvalidPrefixLength(s.to_string()))?;
        Self::new(len)
    }
}

impl TryFrom<u8> for PrefixLength {
    type Error = IpStatError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PrefixLength> for u8 {
    fn from(value: PrefixLength) -> Self {
        value.0
    }
}
