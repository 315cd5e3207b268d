//! Core types for ipstat
//!
//! This crate provides the value types shared by the rest of the workspace:
//! - [`Ipv4Address`] - IPv4 address backed by a `u32`
//! - [`PrefixLength`] - CIDR prefix length in `0..=32`
//! - [`IpStatError`] - Validation errors
//!
//! ```
//! use ipstat_core::{Ipv4Address, PrefixLength};
//!
//! let addr: Ipv4Address = "192.168.22.5".parse().unwrap();
//! let prefix = PrefixLength::new(20).unwrap();
//! assert_eq!(addr.bits() & prefix.mask(), 0xC0A81000);
//! ```

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

pub mod prefix;

pub use prefix::PrefixLength;

/// IPv4 address
///
/// Stored as a `u32` with the most-significant octet first, so
/// `192.168.1.0` is `0xC0A80100`.
///
/// # Examples
///
/// ```
/// use ipstat_core::Ipv4Address;
///
/// let addr = Ipv4Address::from_octets([10, 0, 0, 1]);
/// assert_eq!(addr.bits(), 0x0A000001);
/// assert_eq!(addr.to_string(), "10.0.0.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4Address(u32);

impl Ipv4Address {
    /// Create an address from its 32-bit value
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Create an address from four octets, most-significant first
    pub const fn from_octets(octets: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(octets))
    }

    /// Get the 32-bit value
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Get the four octets, most-significant first
    pub const fn octets(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Render as four dot-separated groups of eight binary digits
    ///
    /// ```
    /// use ipstat_core::Ipv4Address;
    ///
    /// let mask = Ipv4Address::new(0xFFFFF000);
    /// assert_eq!(mask.to_binary_string(), "11111111.11111111.11110000.00000000");
    /// ```
    pub fn to_binary_string(&self) -> String {
        let [a, b, c, d] = self.octets();
        format!("{:08b}.{:08b}.{:08b}.{:08b}", a, b, c, d)
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

impl FromStr for Ipv4Address {
    type Err = IpStatError;

    /// Parse dotted-decimal text
    ///
    /// Exactly four tokens are required and each must be a decimal integer
    /// no greater than 255.
    fn from_str(s: &str) -> Result<Self> {
        let octets: Vec<&str> = s.split('.').collect();
        if octets.len() != 4 {
            return Err(IpStatError::InvalidOctet(format!(
                "expected 4 octets, found {} in '{}'",
                octets.len(),
                s
            )));
        }

        let mut bits = 0u32;
        for octet_str in octets {
            let octet: u8 = octet_str
                .parse()
                .map_err(|_| IpStatError::InvalidOctet(format!("'{}' in '{}'", octet_str, s)))?;
            bits = (bits << 8) | octet as u32;
        }

        Ok(Self(bits))
    }
}

impl From<u32> for Ipv4Address {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Ipv4Address> for u32 {
    fn from(value: Ipv4Address) -> Self {
        value.0
    }
}

impl From<Ipv4Addr> for Ipv4Address {
    fn from(value: Ipv4Addr) -> Self {
        Self(value.into())
    }
}

impl From<Ipv4Address> for Ipv4Addr {
    fn from(value: Ipv4Address) -> Self {
        Ipv4Addr::from(value.0)
    }
}

impl Serialize for Ipv4Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Validation errors for ipstat operations
///
/// Every variant is terminal: the first one detected aborts processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IpStatError {
    /// No CIDR argument was supplied
    #[error("Enter a valid CIDR block value")]
    MissingArgument,

    /// Input is not of the form `IP/Mask`
    #[error("Invalid CIDR notation: '{0}' (expected IP/Mask)")]
    MalformedInput(String),

    /// An octet is non-numeric, above 255, or the octet count is not 4
    #[error("Invalid IP address: {0}")]
    InvalidOctet(String),

    /// Prefix length is non-numeric or outside 0-32
    #[error("Invalid prefix length: '{0}' (must be 0-32)")]
    InvalidPrefixLength(String),
}

impl IpStatError {
    /// Process exit code for this error
    ///
    /// A missing argument is a usage error (2); everything else is a
    /// validation failure (1).
    pub fn exit_code(&self) -> u8 {
        match self {
            IpStatError::MissingArgument => 2,
            _ => 1,
        }
    }
}

/// Result type alias for ipstat operations
pub type Result<T> = std::result::Result<T, IpStatError>;
