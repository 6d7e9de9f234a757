use macaddr::MacAddr6;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::value::{self, InterfaceType};
use super::BranchFields;
use crate::error::DecodeError;

const KEY_TRUNK_MAC_ADDRESS: &str = "trunkMACAddress";
const KEY_BRANCH_VLAN_ID: &str = "branchVlanID";
const KEY_BRANCH_MAC_ADDRESS: &str = "branchMACAddress";
const KEY_BRANCH_IP_ADDRESS: &str = "branchIPAddress";
const KEY_INTERFACE_TYPE: &str = "interfaceType";
const KEY_UID: &str = "uid";
const KEY_GID: &str = "gid";

/// Wire shape of the network configuration. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct NetConfigJson {
    #[serde(rename = "cniVersion")]
    cni_version: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    plugin_type: Option<String>,
    #[serde(rename = "trunkName")]
    trunk_name: Option<String>,
    #[serde(rename = "trunkMACAddress")]
    trunk_mac_address: Option<String>,
    #[serde(rename = "branchVlanID")]
    branch_vlan_id: Option<Value>,
    #[serde(rename = "branchMACAddress")]
    branch_mac_address: Option<String>,
    #[serde(rename = "branchIPAddress")]
    branch_ip_address: Option<String>,
    #[serde(rename = "branchGatewayIPAddress")]
    branch_gateway_ip_address: Option<String>,
    #[serde(rename = "interfaceType")]
    interface_type: Option<String>,
    uid: Option<Value>,
    gid: Option<Value>,
    #[serde(rename = "blockInstanceMetadata")]
    block_instance_metadata: Option<bool>,
}

/// Network-scoped configuration after decoding, before per-container
/// overrides and validation. Every field that may be missing is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialNetConfig {
    pub cni_version: Option<String>,
    pub name: Option<String>,
    pub plugin_type: Option<String>,
    pub trunk_name: Option<String>,
    pub trunk_mac_address: Option<MacAddr6>,
    pub branch: BranchFields,
    pub interface_type: Option<InterfaceType>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub block_instance_metadata: bool,
}

/// Decodes the network configuration document passed on stdin.
pub fn decode_network_config(bytes: &[u8]) -> Result<PartialNetConfig, DecodeError> {
    // Top level must be an object; a derived struct would also read an array
    // positionally.
    let object: Map<String, Value> = serde_json::from_slice(bytes)?;
    let conf: NetConfigJson = serde_json::from_value(Value::Object(object))?;

    Ok(PartialNetConfig {
        cni_version: conf.cni_version,
        name: conf.name,
        plugin_type: conf.plugin_type,
        trunk_name: conf.trunk_name.filter(|name| !name.is_empty()),
        trunk_mac_address: text_field(KEY_TRUNK_MAC_ADDRESS, conf.trunk_mac_address, value::parse_mac)?,
        branch: BranchFields {
            vlan_id: json_field(KEY_BRANCH_VLAN_ID, conf.branch_vlan_id, value::parse_vlan_id)?,
            mac_address: text_field(KEY_BRANCH_MAC_ADDRESS, conf.branch_mac_address, value::parse_mac)?,
            ip_address: text_field(KEY_BRANCH_IP_ADDRESS, conf.branch_ip_address, value::parse_cidr)?,
            // Checked during validation so that it fails as an invalid gateway.
            gateway_ip_address: conf.branch_gateway_ip_address.filter(|gw| !gw.is_empty()),
        },
        interface_type: text_field(KEY_INTERFACE_TYPE, conf.interface_type, |s| {
            s.parse::<InterfaceType>()
        })?,
        uid: json_field(KEY_UID, conf.uid, value::parse_id)?,
        gid: json_field(KEY_GID, conf.gid, value::parse_id)?,
        block_instance_metadata: conf.block_instance_metadata.unwrap_or(false),
    })
}

fn text_field<T>(
    field: &'static str,
    raw: Option<String>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<T>, DecodeError> {
    match raw.as_deref().and_then(value::non_empty) {
        Some(text) => parse(text).map(Some).map_err(|reason| DecodeError::Field {
            field,
            value: text.to_string(),
            reason,
        }),
        None => Ok(None),
    }
}

fn json_field<T>(
    field: &'static str,
    raw: Option<Value>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<T>, DecodeError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let literal = value::json_literal(&raw).map_err(|reason| DecodeError::Field {
        field,
        value: raw.to_string(),
        reason,
    })?;
    text_field(field, literal, parse)
}
