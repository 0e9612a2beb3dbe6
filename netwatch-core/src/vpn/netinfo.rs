//! Local interface address enumeration and prefix matching
//!
//! Tunnel presence and exclude rules are decided by matching textual IP
//! prefixes (e.g. "172.16.") against the current local address set.

use std::collections::HashSet;

use local_ip_address::list_afinet_netifas;

/// All non-loopback local addresses in textual form
pub fn ip_addresses() -> Result<HashSet<String>, local_ip_address::Error> {
    let interfaces = list_afinet_netifas()?;
    Ok(interfaces
        .into_iter()
        .filter(|(_, ip)| !ip.is_loopback())
        .map(|(_, ip)| ip.to_string())
        .collect())
}

/// True iff any address starts with `prefix`
pub fn matches_prefix(ips: &HashSet<String>, prefix: &str) -> bool {
    ips.iter().any(|ip| ip.starts_with(prefix))
}

/// True iff any address matches any of the exclude prefixes
pub fn has_excluded_ip(ips: &HashSet<String>, exclude_prefixes: &[String]) -> bool {
    exclude_prefixes
        .iter()
        .any(|prefix| matches_prefix(ips, prefix))
}
