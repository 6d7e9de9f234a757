use itertools::Itertools;
use tracing::debug;

use super::value;
use super::BranchFields;
use crate::error::ParseError;

pub const ARG_BRANCH_VLAN_ID: &str = "BranchVlanID";
pub const ARG_BRANCH_MAC_ADDRESS: &str = "BranchMACAddress";
pub const ARG_BRANCH_IP_ADDRESS: &str = "BranchIPAddress";
pub const ARG_BRANCH_GATEWAY_IP_ADDRESS: &str = "BranchGatewayIPAddress";
/// CNI common argument that downgrades unknown keys from an error to a no-op.
pub const ARG_IGNORE_UNKNOWN: &str = "IgnoreUnknown";

/// Parses the per-container argument string (`Key1=Value1;Key2=Value2`) into
/// the sparse set of branch fields it overrides.
///
/// Keys are case sensitive. An empty string yields no overrides and an empty
/// value leaves its field unset. Unknown keys are rejected unless
/// `IgnoreUnknown` is true.
pub fn parse_per_container_args(args: &str) -> Result<BranchFields, ParseError> {
    let pairs = split_pairs(args)?;

    let ignore_unknown = match pairs.iter().rev().find(|(key, _)| *key == ARG_IGNORE_UNKNOWN) {
        Some((_, raw)) => parse_arg(ARG_IGNORE_UNKNOWN, raw, value::parse_bool)?.unwrap_or(false),
        None => false,
    };

    let mut overrides = BranchFields::default();
    for (key, raw) in pairs {
        match key {
            ARG_BRANCH_VLAN_ID => {
                overrides.vlan_id =
                    parse_arg(ARG_BRANCH_VLAN_ID, raw, value::parse_vlan_id)?.or(overrides.vlan_id);
            }
            ARG_BRANCH_MAC_ADDRESS => {
                overrides.mac_address = parse_arg(ARG_BRANCH_MAC_ADDRESS, raw, value::parse_mac)?
                    .or(overrides.mac_address);
            }
            ARG_BRANCH_IP_ADDRESS => {
                overrides.ip_address = parse_arg(ARG_BRANCH_IP_ADDRESS, raw, value::parse_cidr)?
                    .or(overrides.ip_address);
            }
            ARG_BRANCH_GATEWAY_IP_ADDRESS => {
                if let Some(gateway) = value::non_empty(raw) {
                    overrides.gateway_ip_address = Some(gateway.to_string());
                }
            }
            ARG_IGNORE_UNKNOWN => {}
            _ if ignore_unknown => debug!("Ignoring unknown per-container argument {}", key),
            _ => {
                return Err(ParseError::UnknownKey {
                    key: key.to_string(),
                })
            }
        }
    }

    Ok(overrides)
}

/// Splits on `;` and then on `=`; each segment must hold exactly one `=`.
fn split_pairs(args: &str) -> Result<Vec<(&str, &str)>, ParseError> {
    if args.is_empty() {
        return Ok(Vec::new());
    }

    args.split(';')
        .map(|pair| {
            pair.split('=')
                .collect_tuple::<(&str, &str)>()
                .ok_or_else(|| ParseError::InvalidPair {
                    pair: pair.to_string(),
                })
        })
        .collect()
}

fn parse_arg<T>(
    key: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<T>, ParseError> {
    match value::non_empty(raw) {
        Some(text) => parse(text).map(Some).map_err(|reason| ParseError::InvalidValue {
            key,
            value: text.to_string(),
            reason,
        }),
        None => Ok(None),
    }
}
