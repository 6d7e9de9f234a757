//! Configuration for the VPC branch ENI CNI plugin
//!
//! The plugin attaches a branch interface (a VLAN sub-interface, or a TAP
//! device mapped to a VLAN) carved out of a trunk interface on the host. This
//! crate turns the two configuration inputs of an invocation into one
//! validated [`NetConfig`]:
//! - the network configuration JSON shared by every container on the network
//! - the per-container argument string, whose branch fields take precedence
//!
//! Malformed or incomplete input is rejected here, before any network state
//! is touched.

pub mod commands;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use config::{Branch, InterfaceType, NetConfig, TapIdentity, TrunkIdentifier};
pub use error::{ConfigError, DecodeError, ParseError};
pub use types::CmdArgs;
