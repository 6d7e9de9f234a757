use thiserror::Error;

/// CNI well-known error code for invalid environment variables (and CNI_ARGS).
pub const CNI_CODE_INVALID_ENV: u32 = 4;
/// CNI well-known error code for a configuration that failed to decode.
pub const CNI_CODE_DECODING_FAILURE: u32 = 6;
/// CNI well-known error code for an invalid network configuration.
pub const CNI_CODE_INVALID_NETWORK_CONFIG: u32 = 7;

/// Errors produced while building a [`NetConfig`](crate::NetConfig).
///
/// Every variant is fatal for the invocation: the plugin must abort before
/// touching any network state.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to decode network configuration: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to parse per-container arguments: {0}")]
    Parse(#[from] ParseError),

    #[error("missing required parameter trunkName or trunkMACAddress")]
    MissingTrunkIdentity,

    #[error("missing or invalid branch VLAN ID{}", fmt_value(.vlan_id))]
    MissingVlanId { vlan_id: Option<u16> },

    #[error("missing required parameter branchMACAddress")]
    MissingBranchMac,

    #[error("missing or invalid required parameter branchIPAddress")]
    MissingOrInvalidBranchIp,

    #[error("missing required parameters uid and gid for interface type tap (uid: {}, gid: {})", fmt_id(.uid), fmt_id(.gid))]
    MissingTapIdentity { uid: Option<u32>, gid: Option<u32> },

    #[error("invalid branch gateway IP address {value:?}: {reason}")]
    InvalidGateway { value: String, reason: String },
}

impl ConfigError {
    /// The CNI error code a dispatcher should report for this failure.
    pub fn cni_code(&self) -> u32 {
        match self {
            ConfigError::Decode(_) => CNI_CODE_DECODING_FAILURE,
            ConfigError::Parse(_) => CNI_CODE_INVALID_ENV,
            _ => CNI_CODE_INVALID_NETWORK_CONFIG,
        }
    }
}

/// The network configuration document could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value {value:?} for {field}: {reason}")]
    Field {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// The per-container argument string could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid argument pair {pair:?}, expected Key=Value")]
    InvalidPair { pair: String },

    #[error("unknown argument {key:?}")]
    UnknownKey { key: String },

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

fn fmt_value(vlan_id: &Option<u16>) -> String {
    match vlan_id {
        Some(id) => format!(" {}", id),
        None => String::new(),
    }
}

fn fmt_id(id: &Option<u32>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "unset".to_string(),
    }
}
