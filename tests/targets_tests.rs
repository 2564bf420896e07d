use portprobe::targets::{expand_targets, ipv4_to_default_cidr};
use portprobe::ScanError;
use std::net::Ipv4Addr;

#[test]
fn default_cidr_is_24() {
    let cidr = ipv4_to_default_cidr(Ipv4Addr::new(192, 168, 42, 99));
    assert_eq!(cidr.to_string(), "192.168.42.0/24");
}

#[test]
fn expand_excludes_network_and_broadcast() {
    let hosts = expand_targets("10.0.0.0/30").unwrap();
    assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.2"]);
}

#[test]
fn host_count_matches_prefix() {
    for prefix in 20u32..=32 {
        let hosts = expand_targets(&format!("172.16.0.0/{prefix}")).unwrap();
        let expected = match prefix {
            31 => 2,
            32 => 1,
            p => (1usize << (32 - p)) - 2,
        };
        assert_eq!(hosts.len(), expected, "/{prefix}");
    }
}

#[test]
fn slash_24_spans_one_to_254() {
    let hosts = expand_targets("192.168.7.0/24").unwrap();
    assert_eq!(hosts.first().map(String::as_str), Some("192.168.7.1"));
    assert_eq!(hosts.last().map(String::as_str), Some("192.168.7.254"));
}

#[test]
fn plain_hostname_is_single_target() {
    assert_eq!(expand_targets("example.org").unwrap(), vec!["example.org"]);
}

#[test]
fn bad_cidr_is_invalid_target() {
    assert!(matches!(
        expand_targets("300.1.1.1/24"),
        Err(ScanError::InvalidTarget(_))
    ));
}
