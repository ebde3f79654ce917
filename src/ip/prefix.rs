//! Network prefix derivation.
//!
//! Candidate addresses are the first three octets of the published subnet
//! address followed by a last-octet value from a role's range.

use crate::config::ValidationError;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// The first three octets of an IPv4 network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubnetPrefix([u8; 3]);

impl SubnetPrefix {
    pub fn new(a: u8, b: u8, c: u8) -> Self {
        SubnetPrefix([a, b, c])
    }

    pub fn octets(&self) -> [u8; 3] {
        self.0
    }

    /// Full address for last-octet value `host`
    pub fn candidate(&self, host: u8) -> Ipv4Addr {
        let [a, b, c] = self.0;
        Ipv4Addr::new(a, b, c, host)
    }
}

impl FromStr for SubnetPrefix {
    type Err = ValidationError;

    /// Parse the leading three octets of a dotted address such as
    /// `192.168.10.0`; anything after the third octet is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidSubnetIp(s.to_string());

        let mut parts = s.trim().split('.');
        let mut octets = [0u8; 3];
        for octet in octets.iter_mut() {
            *octet = parts
                .next()
                .ok_or_else(invalid)?
                .parse::<u8>()
                .map_err(|_| invalid())?;
        }

        Ok(SubnetPrefix(octets))
    }
}

/// Displays with the trailing dot, e.g. `192.168.10.`
impl fmt::Display for SubnetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{}.{}.{}.", a, b, c)
    }
}
