//! Format primitives shared by the field validator and the rule pipeline
//!
//! Everything here is a pure function over strings: name and label shapes,
//! resource identifiers, password complexity and IP/CIDR arithmetic.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{Result, ValidationError};

/// Longest allowed label key prefix
pub const LABEL_KEY_PREFIX_MAX_LENGTH: usize = 253;

/// Accepted etcd versions
pub const ETCD_VALID_VERSIONS: &[&str] = &[
    "2.2.5", "2.3.0", "2.3.1", "2.3.2", "2.3.3", "2.3.4", "2.3.5", "2.3.6", "2.3.7", "2.3.8", "3.0.0", "3.0.1",
    "3.0.2", "3.0.3", "3.0.4", "3.0.5", "3.0.6", "3.0.7", "3.0.8", "3.0.9", "3.0.10", "3.0.11", "3.0.12", "3.0.13",
    "3.0.14", "3.0.15", "3.0.16", "3.0.17", "3.1.0", "3.1.1", "3.1.2", "3.1.3", "3.1.4", "3.1.5", "3.1.6", "3.1.7",
    "3.1.8", "3.1.9", "3.1.10", "3.2.0", "3.2.1", "3.2.2", "3.2.3", "3.2.4", "3.2.5", "3.2.6", "3.2.7", "3.2.8",
    "3.2.9", "3.2.11", "3.2.12", "3.2.13", "3.2.14", "3.2.15", "3.2.16", "3.2.23", "3.2.24", "3.2.25", "3.2.26",
    "3.3.0", "3.3.1", "3.3.8", "3.3.9", "3.3.10", "3.3.13", "3.3.15", "3.3.18",
];

/// Accepted containerd versions
pub const CONTAINERD_VALID_VERSIONS: &[&str] = &["1.1.5", "1.1.6", "1.2.4"];

static DNS_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9-]{1,43}[A-Za-z0-9])$").unwrap());
static POOL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z][a-z0-9]{0,11})$").unwrap());
static LABEL_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]{0,61})?[A-Za-z0-9]$").unwrap());
static LABEL_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(([a-zA-Z0-9-]+[.])*[a-zA-Z0-9-]+[/])?([A-Za-z0-9][-A-Za-z0-9_.]{0,61})?[A-Za-z0-9]$").unwrap()
});

static KEYVAULT_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/subscriptions/\S+/resourceGroups/\S+/providers/Microsoft.KeyVault/vaults/[^/\s]+$").unwrap()
});
static DISK_ENCRYPTION_SET_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/subscriptions/\S+/resourceGroups/\S+/providers/Microsoft.Compute/diskEncryptionSets/[^/\s]+$")
        .unwrap()
});
static PROXIMITY_PLACEMENT_GROUP_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/subscriptions/\S+/resourceGroups/\S+/providers/Microsoft.Compute/proximityPlacementGroups/[^/\s]+$")
        .unwrap()
});
static SUBNET_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^/subscriptions/([^/]*)/resourceGroups/([^/]*)/providers/Microsoft.Network/virtualNetworks/([^/]*)/subnets/([^/]*)$",
    )
    .unwrap()
});

static PASSWORD_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static PASSWORD_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]+").unwrap());
static PASSWORD_LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").unwrap());
static PASSWORD_SPECIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[~!@#\$%\^&\*_\-\+=\x60\|\(\)\{\}\[\]:;"'<>,\.\?/]+"#).unwrap());

/// Render a list the way the error messages show it: `[a b c]`
pub fn format_list<T: Display>(items: &[T]) -> String {
    let joined = items.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
    format!("[{}]", joined)
}

pub fn validate_dns_prefix(dns_prefix: &str) -> Result<()> {
    if !DNS_PREFIX.is_match(dns_prefix) {
        return Err(ValidationError::structural(format!(
            "DNSPrefix '{}' is invalid. The DNSPrefix must contain between 3 and 45 characters and can contain only letters, numbers, and hyphens.  It must start with a letter and must end with a letter or a number. (length was {})",
            dns_prefix,
            dns_prefix.len()
        )));
    }
    Ok(())
}

pub fn validate_pool_name(name: &str) -> Result<()> {
    if !POOL_NAME.is_match(name) {
        return Err(ValidationError::structural(format!(
            "pool name '{}' is invalid. A pool name must start with a lowercase letter, have max length of 12, and only have characters a-z0-9",
            name
        )));
    }
    Ok(())
}

/// Empty values are allowed
pub fn validate_label_value(value: &str) -> Result<()> {
    if !value.is_empty() && !LABEL_VALUE.is_match(value) {
        return Err(ValidationError::structural(format!(
            "Label value '{}' is invalid. Valid label values must be 63 characters or less and must be empty or begin and end with an alphanumeric character ([a-z0-9A-Z]) with dashes (-), underscores (_), dots (.), and alphanumerics between",
            value
        )));
    }
    Ok(())
}

pub fn validate_label_key(key: &str) -> Result<()> {
    if !LABEL_KEY.is_match(key) {
        return Err(ValidationError::structural(format!(
            "Label key '{}' is invalid. Valid label keys have two segments: an optional prefix and name, separated by a slash (/). The name segment is required and must be 63 characters or less, beginning and ending with an alphanumeric character ([a-z0-9A-Z]) with dashes (-), underscores (_), dots (.), and alphanumerics between. The prefix is optional. If specified, the prefix must be a DNS subdomain: a series of DNS labels separated by dots (.), not longer than 253 characters in total, followed by a slash (/)",
            key
        )));
    }
    if let Some((prefix, _)) = key.split_once('/') {
        if prefix.len() > LABEL_KEY_PREFIX_MAX_LENGTH {
            return Err(ValidationError::structural(format!(
                "Label key prefix '{}' is invalid. If specified, the prefix must be no longer than 253 characters in total",
                key
            )));
        }
    }
    Ok(())
}

/// At least three of the four character classes, and not the user name
pub fn password_complexity(username: &str, password: &str) -> bool {
    if password.is_empty() || username.to_lowercase() == password.to_lowercase() {
        return false;
    }

    let hits = [&PASSWORD_DIGIT, &PASSWORD_UPPER, &PASSWORD_LOWER, &PASSWORD_SPECIAL]
        .iter()
        .filter(|class| class.is_match(password))
        .count();
    hits > 2
}

pub fn is_keyvault_id(id: &str) -> bool {
    KEYVAULT_ID.is_match(id)
}

pub fn validate_disk_encryption_set_id(id: &str) -> Result<()> {
    if !DISK_ENCRYPTION_SET_ID.is_match(id) {
        return Err(ValidationError::structural(format!(
            "DiskEncryptionSetID({}) is of incorrect format, correct format: {}",
            id,
            DISK_ENCRYPTION_SET_ID.as_str()
        )));
    }
    Ok(())
}

pub fn validate_proximity_placement_group_id(id: &str) -> Result<()> {
    if !PROXIMITY_PLACEMENT_GROUP_ID.is_match(id) {
        return Err(ValidationError::structural(format!(
            "ProximityPlacementGroupID({}) is of incorrect format, correct format: {}",
            id,
            PROXIMITY_PLACEMENT_GROUP_ID.as_str()
        )));
    }
    Ok(())
}

/// Components of a VNET subnet resource ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetId {
    pub subscription: String,
    pub resource_group: String,
    pub vnet: String,
    pub subnet: String,
}

pub fn parse_subnet_id(id: &str) -> Result<SubnetId> {
    let captures = SUBNET_ID.captures(id).ok_or_else(|| {
        ValidationError::structural(
            "Unable to parse vnetSubnetID. Please use a vnetSubnetID with format /subscriptions/SUB_ID/resourceGroups/RG_NAME/providers/Microsoft.Network/virtualNetworks/VNET_NAME/subnets/SUBNET_NAME",
        )
    })?;
    let part = |i: usize| captures.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
    Ok(SubnetId {
        subscription: part(1),
        resource_group: part(2),
        vnet: part(3),
        subnet: part(4),
    })
}

pub fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.parse().ok()
}

/// A parsed CIDR block; `network` has its host bits cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    pub network: IpAddr,
    pub prefix: u8,
}

impl Cidr {
    fn max_prefix(&self) -> u8 {
        match self.network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }

    /// Number of bits left for host addresses
    pub fn host_bits(&self) -> u8 {
        self.max_prefix() - self.prefix
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => mask_v4(ip, self.prefix) == net,
            (IpAddr::V6(net), IpAddr::V6(ip)) => mask_v6(ip, self.prefix) == net,
            _ => false,
        }
    }

    /// Last address of an IPv4 block; IPv6 has no broadcast address
    pub fn broadcast(&self) -> Option<IpAddr> {
        match self.network {
            IpAddr::V4(net) => {
                let host_mask = u32::MAX.checked_shr(u32::from(self.prefix)).unwrap_or(0);
                Some(IpAddr::V4(Ipv4Addr::from(u32::from(net) | host_mask)))
            }
            IpAddr::V6(_) => None,
        }
    }

    /// The network address plus one
    pub fn first_ip(&self) -> IpAddr {
        match self.network {
            IpAddr::V4(net) => IpAddr::V4(Ipv4Addr::from(u32::from(net).wrapping_add(1))),
            IpAddr::V6(net) => IpAddr::V6(Ipv6Addr::from(u128::from(net).wrapping_add(1))),
        }
    }
}

fn mask_v4(ip: Ipv4Addr, prefix: u8) -> Ipv4Addr {
    let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
    Ipv4Addr::from(u32::from(ip) & mask)
}

fn mask_v6(ip: Ipv6Addr, prefix: u8) -> Ipv6Addr {
    let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
    Ipv6Addr::from(u128::from(ip) & mask)
}

/// Parse `address/prefix`; the address may carry host bits
pub fn parse_cidr(raw: &str) -> Option<Cidr> {
    let (address, prefix) = raw.split_once('/')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let prefix: u8 = prefix.parse().ok()?;
    let network = match address.parse::<IpAddr>().ok()? {
        IpAddr::V4(ip) if prefix <= 32 => IpAddr::V4(mask_v4(ip, prefix)),
        IpAddr::V6(ip) if prefix <= 128 => IpAddr::V6(mask_v6(ip, prefix)),
        _ => return None,
    };
    Some(Cidr { network, prefix })
}
