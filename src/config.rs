use crate::error::AssignError;
use crate::ip::SubnetPrefix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Node type selector, each mapped to its own address range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Store back-office server
    Server,
    /// Point-of-sale terminal
    Pos,
    /// Kitchen display system
    Kds,
    /// Standby server taking over when the primary fails
    Failover,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Server, Role::Pos, Role::Kds, Role::Failover];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Server => "server",
            Role::Pos => "pos",
            Role::Kds => "kds",
            Role::Failover => "failover",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AssignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AssignError::UnknownRole(s.to_string()))
    }
}

/// Inclusive range of last-octet values reserved for a role
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub from: u8,
    pub to: u8,
}

impl Range {
    pub fn candidates(&self) -> std::ops::RangeInclusive<u8> {
        self.from..=self.to
    }

    pub fn len(&self) -> usize {
        if self.from > self.to {
            0
        } else {
            usize::from(self.to - self.from) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Representative subnet address and its CIDR prefix length
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub ip: String,
    pub mask: u8,
}

impl Subnet {
    /// The first three octets of `ip`, used to build candidate addresses
    pub fn prefix(&self) -> Result<SubnetPrefix, ValidationError> {
        self.ip.parse()
    }
}

/// Network document published by the configuration service for one store
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub server: Range,
    pub pos: Range,
    pub kds: Range,
    pub failover: Range,
    pub nameservers: Vec<String>,
    pub subnet: Subnet,
    pub gateway: String,
    pub dhcp: bool,
}

impl NetworkInfo {
    /// Address range reserved for `role`
    pub fn range_for(&self, role: Role) -> Range {
        match role {
            Role::Server => self.server,
            Role::Pos => self.pos,
            Role::Kds => self.kds,
            Role::Failover => self.failover,
        }
    }

    /// Validate the document structure.
    ///
    /// Role ranges are not checked for overlap, nor against the subnet mask.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for role in Role::ALL {
            let range = self.range_for(role);
            if range.from > range.to {
                return Err(ValidationError::InvalidRange {
                    role: role.as_str(),
                    from: range.from,
                    to: range.to,
                });
            }
        }

        if self.subnet.mask > 32 {
            return Err(ValidationError::InvalidMask(self.subnet.mask));
        }
        self.subnet.prefix()?;

        if self.nameservers.is_empty() {
            return Err(ValidationError::NoNameservers);
        }
        if let Some(bad) = self.nameservers.iter().find(|ns| ns.parse::<Ipv4Addr>().is_err()) {
            return Err(ValidationError::InvalidNameserver(bad.clone()));
        }

        if self.gateway.parse::<Ipv4Addr>().is_err() {
            return Err(ValidationError::InvalidGateway(self.gateway.clone()));
        }

        Ok(())
    }
}

/// One element of the array returned by the configuration service
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub network: NetworkInfo,
}

/// Structural problems in a fetched network document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("range for {role} is inverted: from {from} > to {to}")]
    InvalidRange { role: &'static str, from: u8, to: u8 },
    #[error("subnet mask /{0} is not a valid IPv4 prefix length")]
    InvalidMask(u8),
    #[error("subnet ip {0:?} does not start with three numeric octets")]
    InvalidSubnetIp(String),
    #[error("nameserver list is empty")]
    NoNameservers,
    #[error("nameserver {0:?} is not an IPv4 address")]
    InvalidNameserver(String),
    #[error("gateway {0:?} is not an IPv4 address")]
    InvalidGateway(String),
}

impl From<ValidationError> for AssignError {
    fn from(err: ValidationError) -> Self {
        AssignError::ConfigFetch(format!("malformed network document: {}", err))
    }
}
