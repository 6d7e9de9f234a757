//! Literal-to-semantic coercion rules shared by the network config decoder
//! and the per-container argument parser.
//!
//! Both sources carry values as text (or, in JSON, sometimes as numbers), so
//! every field type is parsed through exactly one function here. The callers
//! wrap the returned reason into their own error type.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnetwork::IpNetwork;
use macaddr::MacAddr6;
use serde::Serialize;
use serde_json::Value;

/// Kind of branch interface created for the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    /// TAP device mapped to the branch VLAN; needs a uid/gid for the device node.
    #[default]
    Tap,
    /// VLAN sub-interface of the trunk.
    Vlan,
}

impl InterfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceType::Tap => "tap",
            InterfaceType::Vlan => "vlan",
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterfaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tap" => Ok(InterfaceType::Tap),
            "vlan" => Ok(InterfaceType::Vlan),
            other => Err(format!("unsupported interface type {:?}, expected tap or vlan", other)),
        }
    }
}

/// Empty text means "not set" for every field.
pub(crate) fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Reduce a JSON scalar to its literal text. Numbers are accepted wherever
/// numeric strings are.
pub(crate) fn json_literal(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(non_empty(s).map(str::to_string)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(format!("expected a string or number, found {}", json_kind(other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Unsigned decimal: ASCII digits only, no sign.
fn parse_decimal<T: FromStr>(s: &str) -> Result<T, String>
where
    T::Err: fmt::Display,
{
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("expected an unsigned decimal number, found {:?}", s));
    }
    s.parse::<T>().map_err(|e| e.to_string())
}

pub(crate) fn parse_vlan_id(s: &str) -> Result<u16, String> {
    parse_decimal(s)
}

/// Parses a uid or gid.
pub(crate) fn parse_id(s: &str) -> Result<u32, String> {
    parse_decimal(s)
}

pub(crate) fn parse_mac(s: &str) -> Result<MacAddr6, String> {
    s.parse::<MacAddr6>().map_err(|e| e.to_string())
}

/// Parses `address/prefix` notation, keeping the host bits of the address.
///
/// The address half must be a complete IPv4 dotted quad or IPv6 address;
/// `ipnetwork`'s own parser expands truncated forms such as `10.1/16`, which
/// would silently accept a mistyped branch address.
pub fn parse_cidr(s: &str) -> Result<IpNetwork, String> {
    let (addr, prefix) = s
        .split_once('/')
        .ok_or_else(|| "expected address/prefix notation".to_string())?;
    let addr = addr
        .parse::<IpAddr>()
        .map_err(|e| format!("invalid address {:?}: {}", addr, e))?;
    let prefix = parse_decimal::<u8>(prefix)
        .map_err(|e| format!("invalid prefix length {:?}: {}", prefix, e))?;
    IpNetwork::new(addr, prefix).map_err(|e| e.to_string())
}

/// CNI boolean argument: `1`/`true` or `0`/`false`, any case.
pub(crate) fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err("expected a boolean (1, 0, true or false)".to_string()),
    }
}
