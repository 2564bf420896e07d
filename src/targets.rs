use anyhow::Context;
use if_addrs::{get_if_addrs, IfAddr};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{Result, ScanError};

/// Largest block (in host bits) we are willing to enumerate into memory.
pub const MAX_HOST_BITS: u8 = 24;

/// Expand a host specifier into the list of hosts to scan.
///
/// A specifier containing `/` is treated as a CIDR block and enumerated from the
/// network address to the broadcast address. Blocks with more than two
/// addresses drop the network and broadcast entries; /31 and /32 (and their
/// IPv6 equivalents) are returned untrimmed. Anything else is a single host and
/// is returned as given.
///
/// Blocks with more than [`MAX_HOST_BITS`] host bits (wider than /8 for IPv4,
/// /104 for IPv6) are well-formed but are still rejected with `InvalidTarget`,
/// because their address lists are too large to hold in memory.
pub fn expand_targets(spec: &str) -> Result<Vec<String>> {
    let spec = spec.trim();
    if !spec.contains('/') {
        return Ok(vec![spec.to_string()]);
    }

    let net: IpNet = spec
        .parse()
        .map_err(|e| ScanError::InvalidTarget(format!("{spec}: {e}")))?;
    let host_bits = net.max_prefix_len() - net.prefix_len();
    if host_bits > MAX_HOST_BITS {
        return Err(ScanError::InvalidTarget(format!(
            "{spec}: block too large to enumerate (/{} minimum)",
            net.max_prefix_len() - MAX_HOST_BITS
        )));
    }

    let mut hosts: Vec<String> = match net {
        IpNet::V4(n4) => expand_ipv4net(n4).map(|ip| ip.to_string()).collect(),
        IpNet::V6(n6) => expand_ipv6net(n6).map(|ip| ip.to_string()).collect(),
    };

    // Drop network and broadcast for blocks that have a distinct pair.
    if hosts.len() > 2 {
        hosts.pop();
        hosts.remove(0);
    }
    Ok(hosts)
}

fn expand_ipv4net(net: Ipv4Net) -> impl Iterator<Item = Ipv4Addr> {
    let start = u32::from(net.network());
    let end = u32::from(net.broadcast());
    (start..=end).map(Ipv4Addr::from)
}

fn expand_ipv6net(net: Ipv6Net) -> impl Iterator<Item = Ipv6Addr> {
    let start = u128::from(net.network());
    let end = u128::from(net.broadcast());
    (start..=end).map(Ipv6Addr::from)
}

/// Detect local non-loopback IPv4 addresses and convert each to a /24 network.
///
/// For example, an interface IP `192.168.1.42` becomes `192.168.1.0/24`.
/// Duplicates are removed and the output is sorted.
pub fn detect_local_networks() -> anyhow::Result<Vec<Ipv4Net>> {
    let mut set = HashSet::<Ipv4Net>::new();
    for iface in get_if_addrs().context("failed to list network interfaces")? {
        if let IfAddr::V4(v4) = iface.addr {
            if v4.ip.is_loopback() {
                continue;
            }
            set.insert(ipv4_to_default_cidr(v4.ip));
        }
    }
    let mut nets: Vec<Ipv4Net> = set.into_iter().collect();
    nets.sort_by_key(|n| (u32::from(n.network()), n.prefix_len()));
    Ok(nets)
}

/// Convert an IPv4 address into its enclosing /24 network.
pub fn ipv4_to_default_cidr(ip: Ipv4Addr) -> Ipv4Net {
    let o = ip.octets();
    Ipv4Net::new(Ipv4Addr::new(o[0], o[1], o[2], 0), 24).expect("/24 is always valid")
}
