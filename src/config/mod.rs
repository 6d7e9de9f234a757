use std::net::IpAddr;

use ipnetwork::IpNetwork;
use macaddr::MacAddr6;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::types::{CmdArgs, NetworkConfigDocument};

mod args;
mod decode;
mod gateway;
mod value;

pub use args::{
    parse_per_container_args, ARG_BRANCH_GATEWAY_IP_ADDRESS, ARG_BRANCH_IP_ADDRESS,
    ARG_BRANCH_MAC_ADDRESS, ARG_BRANCH_VLAN_ID, ARG_IGNORE_UNKNOWN,
};
pub use decode::{decode_network_config, PartialNetConfig};
pub use gateway::gateway_ip_address;
pub use value::{parse_cidr, InterfaceType};

/// Lowest usable 802.1Q VLAN ID.
pub const VLAN_ID_MIN: u16 = 1;
/// Highest usable 802.1Q VLAN ID.
pub const VLAN_ID_MAX: u16 = 4094;

/// Branch fields that may be set either network-wide or per container.
///
/// `None` means "not set", which is distinct from any parsed value
/// (including VLAN ID 0).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchFields {
    pub vlan_id: Option<u16>,
    pub mac_address: Option<MacAddr6>,
    pub ip_address: Option<IpNetwork>,
    /// Left as text until validation.
    pub gateway_ip_address: Option<String>,
}

impl BranchFields {
    /// Applies every field set in `overrides` on top of `self`.
    pub fn overlay(&mut self, overrides: BranchFields) {
        if let Some(vlan_id) = overrides.vlan_id {
            debug!("Per-container BranchVlanID {} overrides {:?}", vlan_id, self.vlan_id);
            self.vlan_id = Some(vlan_id);
        }
        if let Some(mac_address) = overrides.mac_address {
            self.mac_address = Some(mac_address);
        }
        if let Some(ip_address) = overrides.ip_address {
            self.ip_address = Some(ip_address);
        }
        if let Some(gateway) = overrides.gateway_ip_address {
            self.gateway_ip_address = Some(gateway);
        }
    }
}

/// The host-side interface the branch is carved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrunkIdentifier {
    Name(String),
    MacAddress(MacAddr6),
    /// Both forms were given; whichever the host can resolve is used.
    NameAndMacAddress { name: String, mac_address: MacAddr6 },
}

impl TrunkIdentifier {
    fn from_parts(name: Option<String>, mac_address: Option<MacAddr6>) -> Option<Self> {
        match (name, mac_address) {
            (Some(name), Some(mac_address)) => {
                Some(TrunkIdentifier::NameAndMacAddress { name, mac_address })
            }
            (Some(name), None) => Some(TrunkIdentifier::Name(name)),
            (None, Some(mac_address)) => Some(TrunkIdentifier::MacAddress(mac_address)),
            (None, None) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TrunkIdentifier::Name(name) | TrunkIdentifier::NameAndMacAddress { name, .. } => {
                Some(name.as_str())
            }
            TrunkIdentifier::MacAddress(_) => None,
        }
    }

    pub fn mac_address(&self) -> Option<MacAddr6> {
        match self {
            TrunkIdentifier::MacAddress(mac_address)
            | TrunkIdentifier::NameAndMacAddress { mac_address, .. } => Some(*mac_address),
            TrunkIdentifier::Name(_) => None,
        }
    }
}

/// Identity and addressing of the branch interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub vlan_id: u16,
    pub mac_address: MacAddr6,
    /// Host address of the branch together with its subnet prefix.
    pub ip_address: IpNetwork,
    pub gateway_ip_address: IpAddr,
}

/// Owner of the TAP device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapIdentity {
    pub uid: u32,
    pub gid: u32,
}

/// Validated configuration for one branch interface attachment.
///
/// Built once per plugin invocation by [`NetConfig::new`] and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NetConfig {
    cni_version: Option<String>,
    name: Option<String>,
    plugin_type: Option<String>,
    trunk: TrunkIdentifier,
    branch: Branch,
    interface_type: InterfaceType,
    tap_identity: Option<TapIdentity>,
    block_instance_metadata: bool,
}

impl NetConfig {
    /// Builds the configuration from the network configuration bytes and the
    /// per-container argument string. Per-container values win.
    pub fn new(stdin_data: &[u8], args: &str) -> Result<Self, ConfigError> {
        let mut conf = decode_network_config(stdin_data)?;
        let overrides = parse_per_container_args(args)?;
        conf.branch.overlay(overrides);

        let net_config = conf.validate()?;
        info!("Created NetConfig: {:?}", net_config);
        Ok(net_config)
    }

    /// Builds the configuration from plugin invocation arguments.
    pub fn from_cmd_args(args: &CmdArgs) -> Result<Self, ConfigError> {
        Self::new(&args.stdin_data, &args.args)
    }

    pub fn cni_version(&self) -> Option<&str> {
        self.cni_version.as_deref()
    }

    /// Network name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn plugin_type(&self) -> Option<&str> {
        self.plugin_type.as_deref()
    }

    pub fn trunk(&self) -> &TrunkIdentifier {
        &self.trunk
    }

    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    pub fn interface_type(&self) -> InterfaceType {
        self.interface_type
    }

    /// Set only for TAP interfaces.
    pub fn tap_identity(&self) -> Option<TapIdentity> {
        self.tap_identity
    }

    /// Whether instance metadata service traffic is blocked on the branch.
    pub fn block_instance_metadata(&self) -> bool {
        self.block_instance_metadata
    }
}

impl PartialNetConfig {
    /// Checks only the rules that per-container arguments cannot satisfy:
    /// the trunk identity and, for TAP interfaces, the uid/gid.
    pub fn check_network_scope(&self) -> Result<(), ConfigError> {
        if self.trunk_name.is_none() && self.trunk_mac_address.is_none() {
            return Err(ConfigError::MissingTrunkIdentity);
        }
        if self.interface_type.unwrap_or_default() == InterfaceType::Tap
            && (self.uid.is_none() || self.gid.is_none())
        {
            return Err(ConfigError::MissingTapIdentity {
                uid: self.uid,
                gid: self.gid,
            });
        }
        Ok(())
    }

    /// Checks the merged configuration. Rules are evaluated in a fixed order
    /// and the first violation is returned.
    pub fn validate(self) -> Result<NetConfig, ConfigError> {
        let trunk = TrunkIdentifier::from_parts(self.trunk_name, self.trunk_mac_address)
            .ok_or(ConfigError::MissingTrunkIdentity)?;

        let vlan_id = match self.branch.vlan_id {
            Some(vlan_id @ VLAN_ID_MIN..=VLAN_ID_MAX) => vlan_id,
            vlan_id => return Err(ConfigError::MissingVlanId { vlan_id }),
        };

        let mac_address = self.branch.mac_address.ok_or(ConfigError::MissingBranchMac)?;
        let ip_address = self.branch.ip_address.ok_or(ConfigError::MissingOrInvalidBranchIp)?;

        let interface_type = self.interface_type.unwrap_or_default();
        let tap_identity = match (interface_type, self.uid, self.gid) {
            (InterfaceType::Tap, Some(uid), Some(gid)) => Some(TapIdentity { uid, gid }),
            (InterfaceType::Tap, uid, gid) => {
                return Err(ConfigError::MissingTapIdentity { uid, gid });
            }
            (InterfaceType::Vlan, uid, gid) => {
                if uid.is_some() || gid.is_some() {
                    debug!("Ignoring uid/gid for interface type {}", interface_type);
                }
                None
            }
        };

        let gateway = gateway_ip_address(&ip_address, self.branch.gateway_ip_address.as_deref())?;
        if !ip_address.contains(gateway) {
            warn!("Gateway {} is outside of branch subnet {}", gateway, ip_address);
        }

        Ok(NetConfig {
            cni_version: self.cni_version,
            name: self.name,
            plugin_type: self.plugin_type,
            trunk,
            branch: Branch {
                vlan_id,
                mac_address,
                ip_address,
                gateway_ip_address: gateway,
            },
            interface_type,
            tap_identity,
            block_instance_metadata: self.block_instance_metadata,
        })
    }
}

impl From<&NetConfig> for NetworkConfigDocument {
    fn from(conf: &NetConfig) -> Self {
        NetworkConfigDocument {
            cni_version: conf.cni_version.clone(),
            name: conf.name.clone(),
            plugin_type: conf.plugin_type.clone(),
            trunk_name: conf.trunk.name().map(str::to_string),
            trunk_mac_address: conf.trunk.mac_address().map(|mac| mac.to_string()),
            branch_vlan_id: Some(conf.branch.vlan_id),
            branch_mac_address: Some(conf.branch.mac_address.to_string()),
            branch_ip_address: Some(conf.branch.ip_address.to_string()),
            branch_gateway_ip_address: Some(conf.branch.gateway_ip_address.to_string()),
            interface_type: Some(conf.interface_type),
            uid: conf.tap_identity.map(|tap| tap.uid),
            gid: conf.tap_identity.map(|tap| tap.gid),
            block_instance_metadata: Some(conf.block_instance_metadata),
        }
    }
}

/// Serializes with the same keys the decoder reads.
impl Serialize for NetConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NetworkConfigDocument::from(self).serialize(serializer)
    }
}
