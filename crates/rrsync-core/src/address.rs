// # Address Set
//
// The current address(es) of the synchronized host, at most one per family.
//
// An `AddressSet` is built fresh by an `AddressSource` on every cycle and is
// never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// At most one IPv4 and one IPv6 address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressSet {
    /// The IPv4 address, if one was observed
    pub ipv4: Option<Ipv4Addr>,
    /// The IPv6 address, if one was observed
    pub ipv6: Option<Ipv6Addr>,
}

impl AddressSet {
    /// Create an empty address set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an address set from a sequence of observed addresses.
    ///
    /// Only the last address of each family is kept. IPv4-mapped IPv6
    /// addresses (`::ffff:a.b.c.d`) are classified as IPv4.
    pub fn from_addrs<I>(addrs: I) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        let mut set = Self::default();
        for addr in addrs {
            set.observe(addr);
        }
        set
    }

    /// Set with only an IPv4 address
    pub fn with_ipv4(ipv4: Ipv4Addr) -> Self {
        Self {
            ipv4: Some(ipv4),
            ipv6: None,
        }
    }

    /// Set with only an IPv6 address
    pub fn with_ipv6(ipv6: Ipv6Addr) -> Self {
        Self {
            ipv4: None,
            ipv6: Some(ipv6),
        }
    }

    fn observe(&mut self, addr: IpAddr) {
        match addr.to_canonical() {
            IpAddr::V4(v4) => {
                if let Some(previous) = self.ipv4.replace(v4)
                    && previous != v4
                {
                    debug!("Discarding IPv4 address {} in favour of {}", previous, v4);
                }
            }
            IpAddr::V6(v6) => {
                if let Some(previous) = self.ipv6.replace(v6)
                    && previous != v6
                {
                    debug!("Discarding IPv6 address {} in favour of {}", previous, v6);
                }
            }
        }
    }

    /// True when neither family is populated
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }

    /// Present addresses, IPv4 first
    pub fn addrs(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.ipv4
            .map(IpAddr::V4)
            .into_iter()
            .chain(self.ipv6.map(IpAddr::V6))
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ipv4, self.ipv6) {
            (Some(v4), Some(v6)) => write!(f, "{}, {}", v4, v6),
            (Some(v4), None) => write!(f, "{}", v4),
            (None, Some(v6)) => write!(f, "{}", v6),
            (None, None) => f.write_str("<none>"),
        }
    }
}
