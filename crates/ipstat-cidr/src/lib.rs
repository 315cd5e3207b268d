//! CIDR block parsing and derived address statistics
//!
//! Given `A.B.C.D/M` this crate derives:
//! - Network mask
//! - Network and broadcast addresses
//! - First and last usable addresses
//! - Number of addresses in the block
//!
//! # Examples
//!
//! ```
//! use ipstat_cidr::CidrBlock;
//!
//! let stats = CidrBlock::parse("192.168.22.5/20").unwrap().compute();
//! assert_eq!(stats.network_address.to_string(), "192.168.16.0");
//! assert_eq!(stats.network_mask.to_string(), "255.255.240.0");
//! assert_eq!(stats.broadcast_address.to_string(), "192.168.31.255");
//! assert_eq!(stats.address_count, 4096);
//! ```

use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

pub use ipstat_core::{IpStatError, Ipv4Address, PrefixLength, Result};

pub mod report;

pub use report::{Field, FieldValue, Report};

/// CIDR block: an address together with a prefix length
///
/// The address is kept exactly as given; host bits are not cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrBlock {
    address: Ipv4Address,
    prefix_len: PrefixLength,
}

impl CidrBlock {
    /// Create a block from an already validated address and prefix
    pub fn new(address: Ipv4Address, prefix_len: PrefixLength) -> Self {
        Self {
            address,
            prefix_len,
        }
    }

    /// Parse CIDR notation
    ///
    /// Surrounding ASCII whitespace is ignored. The shape is checked first, then
    /// the octets, then the prefix length.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipstat_cidr::{CidrBlock, IpStatError};
    ///
    /// assert!(CidrBlock::parse("10.0.0.1/8").is_ok());
    /// assert!(matches!(CidrBlock::parse("10.0.0.1"), Err(IpStatError::MalformedInput(_))));
    /// assert!(matches!(CidrBlock::parse("10.0.0.256/24"), Err(IpStatError::InvalidOctet(_))));
    /// assert!(matches!(CidrBlock::parse("10.0.0.1/33"), Err(IpStatError::InvalidPrefixLength(_))));
    /// ```
    pub fn parse(cidr: &str) -> Result<Self> {
        let cidr = trim_ascii(cidr);
        let parts: Vec<&str> = cidr.split('/').collect();
        if parts.len() != 2 {
            return Err(IpStatError::MalformedInput(cidr.to_string()));
        }

        let address: Ipv4Address = parts[0].parse()?;
        let prefix_len: PrefixLength = parts[1].parse()?;

        trace!(%address, %prefix_len, "parsed CIDR block");
        Ok(Self::new(address, prefix_len))
    }

    /// Get the address as given
    pub fn address(&self) -> Ipv4Address {
        self.address
    }

    /// Get the prefix length
    pub fn prefix_len(&self) -> PrefixLength {
        self.prefix_len
    }

    /// Network mask: top `M` bits set
    pub fn mask(&self) -> u32 {
        self.prefix_len.mask()
    }

    /// Network address: host bits of the address cleared
    pub fn network(&self) -> u32 {
        self.address.bits() & self.mask()
    }

    /// Broadcast address: host bits of the network address set
    pub fn broadcast(&self) -> u32 {
        self.network() | !self.mask()
    }

    /// Network address with its lowest bit forced to 1
    ///
    /// This is `network + 1` for any block with host bits. A /32 is not
    /// special-cased, so the result may differ from the network address.
    pub fn first_usable(&self) -> u32 {
        self.network() | 1
    }

    /// Broadcast address with its lowest bit forced to 0
    ///
    /// This is `broadcast - 1` for any block with host bits. A /32 is not
    /// special-cased.
    pub fn last_usable(&self) -> u32 {
        self.broadcast() & !1
    }

    /// Number of addresses in the block (`2^(32 - M)`)
    pub fn size(&self) -> u64 {
        self.prefix_len.address_count()
    }

    /// Derive every statistic for this block
    ///
    /// The echoed input is the canonical `A.B.C.D/M` text of the block.
    pub fn compute(&self) -> CidrStats {
        self.compute_with_input(self.to_string())
    }

    /// Derive every statistic, echoing `input` as the original text
    pub fn compute_with_input(&self, input: impl Into<String>) -> CidrStats {
        let stats = CidrStats {
            input: input.into(),
            network_mask: Ipv4Address::new(self.mask()),
            network_address: Ipv4Address::new(self.network()),
            first_usable_address: Ipv4Address::new(self.first_usable()),
            last_usable_address: Ipv4Address::new(self.last_usable()),
            broadcast_address: Ipv4Address::new(self.broadcast()),
            address_count: self.size(),
        };
        debug!(
            input = %stats.input,
            network = %stats.network_address,
            broadcast = %stats.broadcast_address,
            count = stats.address_count,
            "computed CIDR stats"
        );
        stats
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

/// Statistics derived from a CIDR block
///
/// Computed once and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CidrStats {
    /// Original input text
    #[serde(rename = "cidr")]
    pub input: String,
    pub network_mask: Ipv4Address,
    pub network_address: Ipv4Address,
    #[serde(rename = "first_ip")]
    pub first_usable_address: Ipv4Address,
    #[serde(rename = "last_ip")]
    pub last_usable_address: Ipv4Address,
    pub broadcast_address: Ipv4Address,
    pub address_count: u64,
}

/// Parse `text` and derive its statistics in one step
///
/// The echoed input is `text` with surrounding ASCII whitespace removed.
///
/// ```
/// let stats = ipstat_cidr::resolve("0.0.0.0/0").unwrap();
/// assert_eq!(stats.broadcast_address.to_string(), "255.255.255.255");
/// assert_eq!(stats.address_count, 4_294_967_296);
/// ```
pub fn resolve(text: &str) -> Result<CidrStats> {
    let block = CidrBlock::parse(text)?;
    Ok(block.compute_with_input(trim_ascii(text)))
}

/// Strip leading and trailing ASCII whitespace only
pub fn trim_ascii(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> u32 {
        s.parse::<Ipv4Address>().unwrap().bits()
    }

    #[test]
    fn test_parse_cidr() {
        let cidr = CidrBlock::parse("192.168.1.0/24").unwrap();
        assert_eq!(cidr.address().bits(), 0xC0A80100);
        assert_eq!(cidr.prefix_len().get(), 24);
    }

    #[test]
    fn test_parse_keeps_host_bits() {
        let cidr = CidrBlock::parse("192.168.22.5/20").unwrap();
        assert_eq!(cidr.address().bits(), addr("192.168.22.5"));
        assert_eq!(cidr.network(), addr("192.168.16.0"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let cidr = CidrBlock::parse("  10.0.0.0/8\n").unwrap();
        assert_eq!(cidr.to_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_parse_rejects_unicode_whitespace() {
        assert!(matches!(
            CidrBlock::parse("\u{00A0}10.0.0.1/8"),
            Err(IpStatError::InvalidOctet(_))
        ));
        assert!(matches!(
            CidrBlock::parse("10.0.0.1/8\u{3000}"),
            Err(IpStatError::InvalidPrefixLength(_))
        ));
        assert!(resolve("\u{00A0}10.0.0.1/8\u{3000}").is_err());
        assert_eq!(trim_ascii("\t10.0.0.1/8\r\n"), "10.0.0.1/8");
    }

    #[test]
    fn test_parse_malformed() {
        for bad in ["10.0.0.1", "10.0.0.1/24/8", "", "   "] {
            let err = CidrBlock::parse(bad).unwrap_err();
            assert!(matches!(err, IpStatError::MalformedInput(_)), "{}", bad);
        }

        // a lone slash has the right shape but an empty address
        assert!(matches!(
            CidrBlock::parse("/"),
            Err(IpStatError::InvalidOctet(_))
        ));
    }

    #[test]
    fn test_parse_invalid_octet() {
        assert!(matches!(
            CidrBlock::parse("10.0.0.256/24"),
            Err(IpStatError::InvalidOctet(_))
        ));
        assert!(matches!(
            CidrBlock::parse("10.0.0/24"),
            Err(IpStatError::InvalidOctet(_))
        ));
        assert!(matches!(
            CidrBlock::parse("ten.0.0.1/24"),
            Err(IpStatError::InvalidOctet(_))
        ));
    }

    #[test]
    fn test_parse_invalid_prefix() {
        assert!(matches!(
            CidrBlock::parse("10.0.0.1/33"),
            Err(IpStatError::InvalidPrefixLength(_))
        ));
        assert!(matches!(
            CidrBlock::parse("10.0.0.1/x"),
            Err(IpStatError::InvalidPrefixLength(_))
        ));
        assert!(matches!(
            CidrBlock::parse("10.0.0.1/"),
            Err(IpStatError::InvalidPrefixLength(_))
        ));
    }

    #[test]
    fn test_octets_checked_before_prefix() {
        assert!(matches!(
            CidrBlock::parse("10.0.0.999/99"),
            Err(IpStatError::InvalidOctet(_))
        ));
    }

    #[test]
    fn test_compute_slash_20() {
        let stats = resolve("192.168.22.5/20").unwrap();
        assert_eq!(stats.input, "192.168.22.5/20");
        assert_eq!(stats.network_mask.to_string(), "255.255.240.0");
        assert_eq!(stats.network_address.to_string(), "192.168.16.0");
        assert_eq!(stats.first_usable_address.to_string(), "192.168.16.1");
        assert_eq!(stats.last_usable_address.to_string(), "192.168.31.254");
        assert_eq!(stats.broadcast_address.to_string(), "192.168.31.255");
        assert_eq!(stats.address_count, 4096);
    }

    #[test]
    fn test_compute_slash_24() {
        let cidr = CidrBlock::parse("192.168.1.77/24").unwrap();
        assert_eq!(cidr.broadcast(), 0xC0A801FF);
        assert_eq!(cidr.first_usable(), 0xC0A80101);
        assert_eq!(cidr.last_usable(), 0xC0A801FE);
        assert_eq!(cidr.size(), 256);
    }

    #[test]
    fn test_compute_slash_32_forces_last_bit() {
        let stats = resolve("192.168.1.5/32").unwrap();
        assert_eq!(stats.network_mask.to_string(), "255.255.255.255");
        assert_eq!(stats.network_address.to_string(), "192.168.1.5");
        assert_eq!(stats.broadcast_address.to_string(), "192.168.1.5");
        assert_eq!(stats.first_usable_address.to_string(), "192.168.1.5");
        assert_eq!(stats.last_usable_address.to_string(), "192.168.1.4");
        assert_eq!(stats.address_count, 1);

        let stats = resolve("192.168.1.4/32").unwrap();
        assert_eq!(stats.first_usable_address.to_string(), "192.168.1.5");
        assert_eq!(stats.last_usable_address.to_string(), "192.168.1.4");
    }

    #[test]
    fn test_compute_slash_31() {
        let stats = resolve("10.0.0.7/31").unwrap();
        assert_eq!(stats.network_address.to_string(), "10.0.0.6");
        assert_eq!(stats.broadcast_address.to_string(), "10.0.0.7");
        assert_eq!(stats.first_usable_address.to_string(), "10.0.0.7");
        assert_eq!(stats.last_usable_address.to_string(), "10.0.0.6");
        assert_eq!(stats.address_count, 2);
    }

    #[test]
    fn test_compute_slash_0() {
        let stats = resolve("172.16.5.4/0").unwrap();
        assert_eq!(stats.network_mask.to_string(), "0.0.0.0");
        assert_eq!(stats.network_address.to_string(), "0.0.0.0");
        assert_eq!(stats.first_usable_address.to_string(), "0.0.0.1");
        assert_eq!(stats.last_usable_address.to_string(), "255.255.255.254");
        assert_eq!(stats.broadcast_address.to_string(), "255.255.255.255");
        assert_eq!(stats.address_count, 4_294_967_296);
    }

    #[test]
    fn test_compute_echoes_canonical_text() {
        let stats = CidrBlock::new(Ipv4Address::new(0x0A000001), PrefixLength::new(8).unwrap())
            .compute();
        assert_eq!(stats.input, "10.0.0.1/8");
    }

    #[test]
    fn test_resolve_echoes_trimmed_input() {
        let stats = resolve(" 10.0.0.1/8 ").unwrap();
        assert_eq!(stats.input, "10.0.0.1/8");
    }

    #[test]
    fn test_cidr_display() {
        let cidr = CidrBlock::parse("192.168.1.9/24").unwrap();
        assert_eq!(cidr.to_string(), "192.168.1.9/24");
    }

    #[test]
    fn test_stats_serialization() {
        let stats = resolve("10.0.0.0/30").unwrap();
        let json = serde_json::to_value(&stats).expect("serialization failed");
        assert_eq!(json["cidr"], "10.0.0.0/30");
        assert_eq!(json["network_mask"], "255.255.255.252");
        assert_eq!(json["first_ip"], "10.0.0.1");
        assert_eq!(json["last_ip"], "10.0.0.2");
        assert_eq!(json["broadcast_address"], "10.0.0.3");
        assert_eq!(json["address_count"], 4);
    }
}
