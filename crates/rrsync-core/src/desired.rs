//! Desired-state builder
//!
//! Turns the resolved [`AddressSet`] and the configured record names into the
//! set of records that should exist. Pure computation, no I/O.

use crate::address::AddressSet;
use crate::record::{DesiredRecord, DesiredSet};
use std::net::IpAddr;

/// Split a comma-separated record list into names.
///
/// Entries are neither trimmed nor filtered: `"@,,www"` yields three names,
/// one of them empty.
pub fn parse_record_names(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}

/// Build the desired record set.
///
/// One record per name for every address family present in `addresses`.
/// An empty address set yields an empty desired set; callers must treat that
/// as "nothing known this cycle", never as "delete everything".
pub fn build<S: AsRef<str>>(addresses: &AddressSet, names: &[S]) -> DesiredSet {
    addresses
        .addrs()
        .flat_map(|addr: IpAddr| {
            names
                .iter()
                .map(move |name| DesiredRecord::new(name.as_ref(), addr))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_record_names_keeps_empty_entries() {
        assert_eq!(parse_record_names("@,www"), vec!["@", "www"]);
        assert_eq!(parse_record_names("@,,www"), vec!["@", "", "www"]);
        assert_eq!(parse_record_names(""), vec![""]);
        assert_eq!(parse_record_names(" www"), vec![" www"]);
    }

    #[test]
    fn test_build_empty_addresses() {
        let desired = build(&AddressSet::new(), &["@", "www"]);
        assert!(desired.is_empty());
    }

    #[test]
    fn test_build_ipv4_only() {
        let addresses = AddressSet::with_ipv4(Ipv4Addr::new(1, 2, 3, 4));
        let desired = build(&addresses, &["@", "www"]);

        assert_eq!(desired.len(), 2);
        assert!(desired.iter().all(|r| r.record_type == RecordType::A));
        assert!(desired.contains(&DesiredRecord::new("@", "1.2.3.4".parse().unwrap())));
        assert!(desired.contains(&DesiredRecord::new("www", "1.2.3.4".parse().unwrap())));
    }

    #[test]
    fn test_build_dual_stack() {
        let addresses = AddressSet {
            ipv4: Some(Ipv4Addr::new(192, 0, 2, 1)),
            ipv6: Some("2001:db8::1".parse::<Ipv6Addr>().unwrap()),
        };
        let desired = build(&addresses, &["@", "www"]);

        assert_eq!(desired.len(), 4);
        let aaaa = desired
            .iter()
            .filter(|r| r.record_type == RecordType::Aaaa)
            .count();
        assert_eq!(aaaa, 2);
    }

    #[test]
    fn test_build_collapses_duplicate_names() {
        let addresses = AddressSet::with_ipv4(Ipv4Addr::new(1, 2, 3, 4));
        let names = parse_record_names("www,www,@");

        assert_eq!(build(&addresses, &names).len(), 2);
    }

    #[test]
    fn test_build_keeps_empty_name() {
        let addresses = AddressSet::with_ipv4(Ipv4Addr::new(1, 2, 3, 4));
        let desired = build(&addresses, &parse_record_names("@,"));

        assert!(desired.iter().any(|r| r.name.is_empty()));
    }
}
