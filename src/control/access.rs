// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Source-address checks for control writes

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::ControlError;

/// CIDR block, IPv4 or IPv6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    network: IpAddr,
    prefix: u8,
}

impl Subnet {
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self.network, canonical(*addr)) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = mask_u32(self.prefix);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = mask_u128(self.prefix);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

impl FromStr for Subnet {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ControlError::InvalidConfig(format!("invalid subnet '{}'", s));

        let (addr, prefix) = match s.trim().split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s.trim(), None),
        };
        let network: IpAddr = addr.parse().map_err(|_| invalid())?;
        let max = if network.is_ipv4() { 32 } else { 128 };
        let prefix = match prefix {
            Some(p) => p.parse::<u8>().map_err(|_| invalid())?,
            None => max,
        };
        if prefix > max {
            return Err(invalid());
        }

        Ok(Self { network, prefix })
    }
}

/// Decides whether a write comes from an authorized operator
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    trusted: Vec<Subnet>,
}

impl AccessPolicy {
    pub fn new(trusted_subnets: &[String]) -> Result<Self, ControlError> {
        let trusted = trusted_subnets
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Subnet>, _>>()?;
        Ok(Self { trusted })
    }

    /// Authorized when the address is on the allow-list or inside a
    /// trusted internal subnet
    pub fn is_authorized(&self, addr: &IpAddr, valid_ips: &BTreeSet<String>) -> bool {
        let addr = canonical(*addr);
        valid_ips.contains(&addr.to_string()) || self.trusted.iter().any(|net| net.contains(&addr))
    }
}

fn canonical(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(addr),
        v4 => v4,
    }
}

fn mask_u32(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn mask_u128(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    }
}
