//! IP address allocation module.
//!
//! This module derives candidate addresses from the published subnet, probes
//! them for liveness, and selects the first free one in a role's range.

pub mod allocator;
pub mod prefix;
pub mod probe;

// Re-export commonly used types
pub use allocator::AddressAllocator;
pub use prefix::SubnetPrefix;
pub use probe::{probe_for, LivenessProbe, PingProbe, UnsupportedProbe};
