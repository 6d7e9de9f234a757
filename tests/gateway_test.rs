use std::net::IpAddr;

use assert_matches::assert_matches;
use ipnetwork::IpNetwork;

use vpc_branch_eni::config::{gateway_ip_address, parse_cidr};
use vpc_branch_eni::ConfigError;

fn subnet(s: &str) -> IpNetwork {
    parse_cidr(s).unwrap()
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[test]
fn test_explicit_gateway_is_returned_unchanged() -> Result<(), Box<dyn std::error::Error>> {
    let gateway = gateway_ip_address(&subnet("172.31.16.3/20"), Some("172.31.16.2"))?;
    assert_eq!(gateway, ip("172.31.16.2"));
    Ok(())
}

#[test]
fn test_gateway_from_subnet() -> Result<(), Box<dyn std::error::Error>> {
    let gateway = gateway_ip_address(&subnet("172.31.16.3/20"), None)?;
    assert_eq!(gateway, ip("172.31.16.1"));

    let gateway = gateway_ip_address(&subnet("172.31.16.0/20"), Some(""))?;
    assert_eq!(gateway, ip("172.31.16.1"));
    Ok(())
}

// Whole-address increment, not a wrapping increment of the last octet.
#[test]
fn test_gateway_carries_into_next_octet() -> Result<(), Box<dyn std::error::Error>> {
    let gateway = gateway_ip_address(&subnet("10.0.0.255/32"), None)?;
    assert_eq!(gateway, ip("10.0.1.0"));
    Ok(())
}

#[test]
fn test_ipv6_gateway_from_subnet() -> Result<(), Box<dyn std::error::Error>> {
    let gateway = gateway_ip_address(&subnet("2001:db8::42/64"), None)?;
    assert_eq!(gateway, ip("2001:db8::1"));
    Ok(())
}

#[test]
fn test_invalid_explicit_gateway() {
    let result = gateway_ip_address(&subnet("172.31.16.3/20"), Some("172.31.16.256"));
    assert_matches!(result, Err(ConfigError::InvalidGateway { value, .. }) if value == "172.31.16.256");
}

#[test]
fn test_no_gateway_past_end_of_address_space() {
    let result = gateway_ip_address(&subnet("255.255.255.255/32"), None);
    assert_matches!(result, Err(ConfigError::InvalidGateway { .. }));
}
