use serde::{Deserialize, Serialize};

use crate::config::InterfaceType;
use crate::error::ConfigError;

/// CNI command arguments
#[derive(Debug, Clone, Default)]
pub struct CmdArgs {
    /// Container ID
    pub container_id: String,
    /// Network namespace path
    pub netns: String,
    /// Interface name
    pub ifname: String,
    /// Per-container arguments (`Key1=Value1;Key2=Value2`)
    pub args: String,
    /// Path
    pub path: String,
    /// Standard input data
    pub stdin_data: Vec<u8>,
}

/// Network configuration document understood by this plugin.
///
/// Numeric fields are written as JSON numbers; the decoder also accepts
/// them as numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkConfigDocument {
    /// CNI specification version
    #[serde(rename = "cniVersion", skip_serializing_if = "Option::is_none")]
    pub cni_version: Option<String>,
    /// Name of the network
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type of CNI plugin
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<String>,
    #[serde(rename = "trunkName", skip_serializing_if = "Option::is_none")]
    pub trunk_name: Option<String>,
    #[serde(rename = "trunkMACAddress", skip_serializing_if = "Option::is_none")]
    pub trunk_mac_address: Option<String>,
    #[serde(rename = "branchVlanID", skip_serializing_if = "Option::is_none")]
    pub branch_vlan_id: Option<u16>,
    #[serde(rename = "branchMACAddress", skip_serializing_if = "Option::is_none")]
    pub branch_mac_address: Option<String>,
    #[serde(rename = "branchIPAddress", skip_serializing_if = "Option::is_none")]
    pub branch_ip_address: Option<String>,
    #[serde(rename = "branchGatewayIPAddress", skip_serializing_if = "Option::is_none")]
    pub branch_gateway_ip_address: Option<String>,
    #[serde(rename = "interfaceType", skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<InterfaceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gid: Option<u32>,
    #[serde(rename = "blockInstanceMetadata", skip_serializing_if = "Option::is_none")]
    pub block_instance_metadata: Option<bool>,
}

/// CNI error result, written in place of a result when the plugin fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    /// CNI specification version
    #[serde(rename = "cniVersion")]
    pub cni_version: String,
    /// Well-known or plugin-specific error code
    pub code: u32,
    /// Short error message
    pub msg: String,
    /// Underlying cause, if any
    #[serde(default)]
    pub details: String,
}

impl ErrorResult {
    /// Create an error result for a configuration failure
    pub fn from_config_error(cni_version: &str, err: &ConfigError) -> Self {
        let details = std::error::Error::source(err)
            .map(|source| source.to_string())
            .unwrap_or_default();

        Self {
            cni_version: cni_version.to_string(),
            code: err.cni_code(),
            msg: err.to_string(),
            details,
        }
    }
}
