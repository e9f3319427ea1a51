//! Hex endpoint decoding
//!
//! Kernel connection tables print each endpoint as `HEXADDR:HEXPORT`. IPv4
//! addresses are the raw 32-bit value in host order (`0100007F` is
//! `127.0.0.1` on little-endian hosts). IPv6 addresses are four 32-bit words,
//! each printed in host order, so on little-endian hosts every 4-byte group
//! comes out reversed:
//!
//! ```text
//! address:          fe80::215:5dff:fe00:402
//! direct bytes:     FE80 0000  0000 0000  0215 5DFF  FE00 0402
//! /proc/net/tcp6:   0000 80FE  0000 0000  FF5D 1502  0204 00FE
//! ```

use crate::error::{Error, Result};
use crate::parser::parse_hex_u32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Hex digits in an IPv6 address field
const IPV6_HEX_LEN: usize = 32;

/// Upper bound on hex digits in an IPv4 address field
const IPV4_MAX_HEX_LEN: usize = 8;

/// Byte layout of a 32-digit IPv6 address field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ipv6ByteOrder {
    /// Byte `i` is the hex pair at offset `2 * i`
    Direct,
    /// Four 4-byte words, each with its bytes reversed
    WordReversed,
}

impl Ipv6ByteOrder {
    /// Layout the local kernel uses: word-reversed on little-endian hosts
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Ipv6ByteOrder::WordReversed
        } else {
            Ipv6ByteOrder::Direct
        }
    }

    /// Index into the hex field for address byte `target`
    fn source_index(self, target: usize) -> usize {
        match self {
            Ipv6ByteOrder::Direct => target,
            Ipv6ByteOrder::WordReversed => (target / 4) * 4 + 3 - target % 4,
        }
    }
}

impl Default for Ipv6ByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

/// One side of a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// IP address
    pub address: IpAddr,
    /// Port number
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self { address, port }
    }

    /// Decode a `HEXADDR:HEXPORT` field
    pub fn from_hex(field: &str, order: Ipv6ByteOrder) -> Result<Self> {
        let (address, port) = field
            .split_once(':')
            .ok_or_else(|| Error::parse(format!("missing ':' in endpoint {:?}", field)))?;

        let address = parse_hex_ip_address(address, order)?;
        let port = parse_hex_port(port)?;

        Ok(Self { address, port })
    }

    /// Encode back to the `HEXADDR:HEXPORT` form
    pub fn to_hex(&self, order: Ipv6ByteOrder) -> String {
        format!("{}:{:04X}", encode_hex_address(self.address, order), self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            IpAddr::V4(ip) => write!(f, "{}:{}", ip, self.port),
            IpAddr::V6(ip) => write!(f, "[{}]:{}", ip, self.port),
        }
    }
}

/// Decode a hex address, dispatching on its digit count
pub fn parse_hex_ip_address(hex: &str, order: Ipv6ByteOrder) -> Result<IpAddr> {
    match hex.len() {
        len if len <= IPV4_MAX_HEX_LEN => parse_ipv4_hex(hex).map(IpAddr::V4),
        IPV6_HEX_LEN => parse_ipv6_hex(hex, order).map(IpAddr::V6),
        len => Err(Error::parse(format!(
            "hex address has {} digits, expected at most {} or exactly {}",
            len, IPV4_MAX_HEX_LEN, IPV6_HEX_LEN
        ))),
    }
}

/// The parsed value's bytes, least significant first, are the octets
fn parse_ipv4_hex(hex: &str) -> Result<Ipv4Addr> {
    let value = parse_hex_u32(hex)?;
    Ok(Ipv4Addr::from(value.to_le_bytes()))
}

fn parse_ipv6_hex(hex: &str, order: Ipv6ByteOrder) -> Result<Ipv6Addr> {
    let digits = hex.as_bytes();
    let mut raw = [0u8; 16];
    for (i, byte) in raw.iter_mut().enumerate() {
        *byte = (hex_digit(digits[i * 2])? << 4) | hex_digit(digits[i * 2 + 1])?;
    }

    let mut octets = [0u8; 16];
    for (target, octet) in octets.iter_mut().enumerate() {
        *octet = raw[order.source_index(target)];
    }

    Ok(Ipv6Addr::from(octets))
}

fn hex_digit(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::parse(format!("invalid hex digit {:?}", c as char))),
    }
}

fn parse_hex_port(hex: &str) -> Result<u16> {
    let value = parse_hex_u32(hex)?;
    u16::try_from(value).map_err(|_| Error::parse(format!("port out of range: {:?}", hex)))
}

/// Inverse of [`parse_hex_ip_address`]: 8 digits for IPv4, 32 for IPv6
pub fn encode_hex_address(address: IpAddr, order: Ipv6ByteOrder) -> String {
    match address {
        IpAddr::V4(ip) => format!("{:08X}", u32::from_le_bytes(ip.octets())),
        IpAddr::V6(ip) => {
            let octets = ip.octets();
            let mut raw = [0u8; 16];
            for (target, octet) in octets.iter().enumerate() {
                raw[order.source_index(target)] = *octet;
            }
            raw.iter().map(|b| format!("{:02X}", b)).collect()
        }
    }
}
