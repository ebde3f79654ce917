//! Address allocation.
//!
//! Scans a role's range in ascending order and hands out the lowest
//! candidate that does not answer the liveness probe. Probes are issued one
//! at a time and the scan stops at the first free address.

use super::prefix::SubnetPrefix;
use super::probe::LivenessProbe;
use crate::config::Range;
use crate::error::AssignError;
use std::net::Ipv4Addr;

/// Picks the first unoccupied address of a range
pub struct AddressAllocator<P> {
    probe: P,
}

impl<P: LivenessProbe> AddressAllocator<P> {
    pub fn new(probe: P) -> Self {
        AddressAllocator { probe }
    }

    /// Lowest address `prefix.n` with `n` in `range` that is not alive.
    ///
    /// Fails with [`AssignError::NoAvailableAddress`] when every candidate
    /// answered, and propagates probe errors unchanged.
    pub fn allocate(&self, range: Range, prefix: SubnetPrefix) -> Result<Ipv4Addr, AssignError> {
        log::info!(
            "Scanning {}{}..={} for a free address ({} candidates)",
            prefix,
            range.from,
            range.to,
            range.len()
        );

        for host in range.candidates() {
            let candidate = prefix.candidate(host);
            if !self.probe.is_alive(candidate)? {
                log::info!("Selected free address {}", candidate);
                return Ok(candidate);
            }
            log::debug!("{} is in use, trying next candidate", candidate);
        }

        Err(AssignError::NoAvailableAddress {
            prefix: prefix.to_string(),
            from: range.from,
            to: range.to,
        })
    }
}
