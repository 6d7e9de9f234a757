use assert_matches::assert_matches;
use macaddr::MacAddr6;

use vpc_branch_eni::config::{decode_network_config, parse_per_container_args, BranchFields};
use vpc_branch_eni::ParseError;

fn mac(s: &str) -> MacAddr6 {
    s.parse().unwrap()
}

#[test]
fn test_empty_args_yield_no_overrides() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(parse_per_container_args("")?, BranchFields::default());
    Ok(())
}

#[test]
fn test_all_overridable_keys() -> Result<(), Box<dyn std::error::Error>> {
    let overrides = parse_per_container_args(
        "BranchVlanID=42;BranchMACAddress=44:44:44:55:55:55;BranchIPAddress=192.168.1.2/16;BranchGatewayIPAddress=192.168.0.1",
    )?;

    assert_eq!(overrides.vlan_id, Some(42));
    assert_eq!(overrides.mac_address, Some(mac("44:44:44:55:55:55")));
    assert_eq!(overrides.ip_address.map(|ip| ip.to_string()), Some("192.168.1.2/16".to_string()));
    assert_eq!(overrides.gateway_ip_address.as_deref(), Some("192.168.0.1"));

    Ok(())
}

#[test]
fn test_vlan_id_zero_is_set_not_absent() -> Result<(), Box<dyn std::error::Error>> {
    let overrides = parse_per_container_args("BranchVlanID=0")?;
    assert_eq!(overrides.vlan_id, Some(0));
    Ok(())
}

#[test]
fn test_empty_value_leaves_field_unset() -> Result<(), Box<dyn std::error::Error>> {
    let overrides = parse_per_container_args("BranchVlanID=;BranchGatewayIPAddress=")?;
    assert_eq!(overrides, BranchFields::default());
    Ok(())
}

#[test]
fn test_keys_are_case_sensitive() {
    let result = parse_per_container_args("branchVlanID=10");
    assert_matches!(result, Err(ParseError::UnknownKey { key }) if key == "branchVlanID");
}

#[test]
fn test_unknown_and_network_scoped_keys_are_rejected() {
    for args in [
        "BranchVlanId=10",
        "TrunkName=eth0",
        "InterfaceType=vlan",
        "Uid=42",
        "K8S_POD_NAME=web;BranchVlanID=10",
    ] {
        assert_matches!(
            parse_per_container_args(args),
            Err(ParseError::UnknownKey { .. }),
            "accepted {:?}",
            args
        );
    }
}

#[test]
fn test_ignore_unknown() -> Result<(), Box<dyn std::error::Error>> {
    let overrides = parse_per_container_args(
        "IgnoreUnknown=1;K8S_POD_NAMESPACE=default;K8S_POD_NAME=web;BranchVlanID=10",
    )?;
    assert_eq!(overrides.vlan_id, Some(10));

    // Order does not matter.
    let overrides = parse_per_container_args("K8S_POD_NAME=web;IgnoreUnknown=true")?;
    assert_eq!(overrides, BranchFields::default());

    let result = parse_per_container_args("IgnoreUnknown=0;K8S_POD_NAME=web");
    assert_matches!(result, Err(ParseError::UnknownKey { .. }));

    let result = parse_per_container_args("IgnoreUnknown=maybe");
    assert_matches!(result, Err(ParseError::InvalidValue { key: "IgnoreUnknown", .. }));

    Ok(())
}

#[test]
fn test_malformed_pairs() {
    for args in ["BranchVlanID", "BranchVlanID=10=11", "BranchVlanID=10;", ";", "=10"] {
        let result = parse_per_container_args(args);
        assert!(
            matches!(result, Err(ParseError::InvalidPair { .. }) | Err(ParseError::UnknownKey { .. })),
            "accepted {:?}",
            args
        );
    }

    assert_matches!(
        parse_per_container_args("BranchVlanID=10;BranchMACAddress"),
        Err(ParseError::InvalidPair { pair }) if pair == "BranchMACAddress"
    );
}

#[test]
fn test_invalid_values() {
    assert_matches!(
        parse_per_container_args("BranchVlanID=ten"),
        Err(ParseError::InvalidValue { key: "BranchVlanID", .. })
    );
    assert_matches!(
        parse_per_container_args("BranchMACAddress=10:20:30"),
        Err(ParseError::InvalidValue { key: "BranchMACAddress", .. })
    );
    assert_matches!(
        parse_per_container_args("BranchIPAddress=192.168.1/16"),
        Err(ParseError::InvalidValue { key: "BranchIPAddress", value, .. }) if value == "192.168.1/16"
    );
}

#[test]
fn test_numbers_must_be_plain_digits() {
    assert_matches!(
        parse_per_container_args("BranchVlanID=+10"),
        Err(ParseError::InvalidValue { key: "BranchVlanID", value, .. }) if value == "+10"
    );
    assert_matches!(
        parse_per_container_args("BranchIPAddress=10.0.0.5/+24"),
        Err(ParseError::InvalidValue { key: "BranchIPAddress", .. })
    );
}

#[test]
fn test_overlay_replaces_only_set_fields() -> Result<(), Box<dyn std::error::Error>> {
    let mut conf = decode_network_config(
        br#"{"trunkName":"eth0", "branchVlanID":"100", "branchMACAddress":"01:23:45:67:89:ab", "branchGatewayIPAddress":"10.0.0.1"}"#,
    )?;
    let overrides = parse_per_container_args("BranchVlanID=200;BranchIPAddress=10.0.0.5/24")?;

    conf.branch.overlay(overrides);

    assert_eq!(conf.branch.vlan_id, Some(200));
    assert_eq!(conf.branch.mac_address, Some(mac("01:23:45:67:89:ab")));
    assert_eq!(conf.branch.ip_address.map(|ip| ip.to_string()), Some("10.0.0.5/24".to_string()));
    assert_eq!(conf.branch.gateway_ip_address.as_deref(), Some("10.0.0.1"));

    Ok(())
}
