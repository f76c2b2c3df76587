//! IPv4 地址与掩码
//!
//! 地址和掩码都是 32 位无符号数；所有比较都按无符号语义进行。

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddrError {
    #[error("invalid IPv4 address: {0}")]
    Invalid(String),
    #[error("mask is not contiguous: {0}")]
    NonContiguousMask(String),
    #[error("prefix length out of range: {0}")]
    PrefixLen(u8),
}

/// IPv4 地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Addr(pub u32);

impl Addr {
    pub const UNSPECIFIED: Addr = Addr(0);

    /// 按掩码截取网络部分
    pub fn network(self, mask: Mask) -> Addr {
        Addr(self.0 & mask.0)
    }
}

impl From<Ipv4Addr> for Addr {
    fn from(ip: Ipv4Addr) -> Self {
        Addr(u32::from(ip))
    }
}

impl From<Addr> for Ipv4Addr {
    fn from(addr: Addr) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

impl FromStr for Addr {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Ipv4Addr>()
            .map(Addr::from)
            .map_err(|_| AddrError::Invalid(s.to_string()))
    }
}

impl TryFrom<String> for Addr {
    type Error = AddrError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Addr> for String {
    fn from(addr: Addr) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ipv4Addr::from(*self).fmt(f)
    }
}

/// 子网掩码（必须是连续的前缀掩码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mask(u32);

impl Mask {
    /// /32，只匹配单个地址
    pub const HOST: Mask = Mask(u32::MAX);
    /// /0，匹配所有地址
    pub const ANY: Mask = Mask(0);

    pub fn new(bits: u32) -> Result<Self, AddrError> {
        if bits.leading_ones() + bits.trailing_zeros() != 32 {
            return Err(AddrError::NonContiguousMask(Addr(bits).to_string()));
        }
        Ok(Mask(bits))
    }

    pub fn from_prefix_len(len: u8) -> Result<Self, AddrError> {
        match len {
            0 => Ok(Mask::ANY),
            1..=32 => Ok(Mask(u32::MAX << (32 - u32::from(len)))),
            _ => Err(AddrError::PrefixLen(len)),
        }
    }

    pub fn prefix_len(self) -> u8 {
        self.0.leading_ones() as u8
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl FromStr for Mask {
    type Err = AddrError;

    /// 支持点分形式（`255.255.0.0`）和前缀长度形式（`/16` 或 `16`）。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let len = s.strip_prefix('/').unwrap_or(s);
        if !len.is_empty() && len.len() <= 2 && len.bytes().all(|b| b.is_ascii_digit()) {
            let len: u8 = len.parse().map_err(|_| AddrError::Invalid(s.to_string()))?;
            return Mask::from_prefix_len(len);
        }
        let bits = s.parse::<Addr>()?.0;
        Mask::new(bits)
    }
}

impl TryFrom<String> for Mask {
    type Error = AddrError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Mask> for String {
    fn from(mask: Mask) -> Self {
        mask.to_string()
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Addr(self.0).fmt(f)
    }
}

/// 判断 `addr` 是否落在 `network`/`mask` 描述的子网内。
pub fn is_in_subnet(addr: Addr, network: Addr, mask: Mask) -> bool {
    (addr.0 & mask.0) == (network.0 & mask.0)
}
