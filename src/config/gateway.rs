use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;

use crate::error::ConfigError;

/// Returns the gateway for the branch subnet.
///
/// An explicit, non-empty gateway is parsed and returned as is. Otherwise the
/// gateway is the first host address of the subnet, i.e. its network address
/// plus one.
pub fn gateway_ip_address(subnet: &IpNetwork, gateway: Option<&str>) -> Result<IpAddr, ConfigError> {
    match gateway.filter(|gw| !gw.is_empty()) {
        Some(gw) => gw.parse::<IpAddr>().map_err(|e| ConfigError::InvalidGateway {
            value: gw.to_string(),
            reason: e.to_string(),
        }),
        None => first_host_address(subnet),
    }
}

/// Network address plus one, as a whole integer: for a /32 (or /128) subnet
/// whose address ends in 255 the increment carries into the next octet.
fn first_host_address(subnet: &IpNetwork) -> Result<IpAddr, ConfigError> {
    let gateway = match subnet.network() {
        IpAddr::V4(network) => u32::from(network)
            .checked_add(1)
            .map(|addr| IpAddr::V4(Ipv4Addr::from(addr))),
        IpAddr::V6(network) => u128::from(network)
            .checked_add(1)
            .map(|addr| IpAddr::V6(Ipv6Addr::from(addr))),
    };

    gateway.ok_or_else(|| ConfigError::InvalidGateway {
        value: subnet.to_string(),
        reason: "no address follows the subnet's network address".to_string(),
    })
}
