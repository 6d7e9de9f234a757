use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{error, info};

use crate::config::{decode_network_config, InterfaceType, NetConfig};
use crate::types::{CmdArgs, ErrorResult, NetworkConfigDocument};

/// Plugin type written into generated network configurations.
pub const PLUGIN_TYPE: &str = "vpc-branch-eni";

/// Collect the CNI invocation variables from the environment.
///
/// Only `CNI_ARGS` matters for configuration; the others are carried along
/// for logging and may be absent.
pub fn parse_env() -> CmdArgs {
    CmdArgs {
        container_id: env::var("CNI_CONTAINERID").unwrap_or_default(),
        netns: env::var("CNI_NETNS").unwrap_or_default(),
        ifname: env::var("CNI_IFNAME").unwrap_or_default(),
        args: env::var("CNI_ARGS").unwrap_or_default(),
        path: env::var("CNI_PATH").unwrap_or_default(),
        stdin_data: Vec::new(),
    }
}

/// Parse command arguments from environment and stdin
pub fn parse_args() -> Result<CmdArgs> {
    let mut args = parse_env();

    io::stdin()
        .read_to_end(&mut args.stdin_data)
        .context("Failed to read from stdin")?;

    Ok(args)
}

/// Validate a configuration and write either the merged configuration or a
/// CNI error result to `out`. Returns whether the configuration is valid.
pub fn cmd_validate<W: Write>(args: &CmdArgs, cni_version: &str, out: &mut W) -> Result<bool> {
    if !args.container_id.is_empty() {
        info!("Validating configuration for container {}", args.container_id);
    }

    let valid = match NetConfig::from_cmd_args(args) {
        Ok(conf) => {
            serde_json::to_writer_pretty(&mut *out, &conf)?;
            true
        }
        Err(err) => {
            error!("Invalid configuration: {}", err);
            let result = ErrorResult::from_config_error(cni_version, &err);
            serde_json::to_writer_pretty(&mut *out, &result)?;
            false
        }
    };
    writeln!(out)?;

    Ok(valid)
}

/// Network-scoped settings for a generated configuration
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub cni_version: String,
    pub name: String,
    pub trunk_name: Option<String>,
    pub trunk_mac_address: Option<String>,
    pub interface_type: Option<InterfaceType>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub block_instance_metadata: bool,
}

/// Build a network configuration document. Branch fields are left to the
/// per-container arguments.
pub fn generate_network_config(opts: &GenerateOptions) -> NetworkConfigDocument {
    NetworkConfigDocument {
        cni_version: Some(opts.cni_version.clone()),
        name: Some(opts.name.clone()),
        plugin_type: Some(PLUGIN_TYPE.to_string()),
        trunk_name: opts.trunk_name.clone(),
        trunk_mac_address: opts.trunk_mac_address.clone(),
        interface_type: opts.interface_type,
        uid: opts.uid,
        gid: opts.gid,
        block_instance_metadata: opts.block_instance_metadata.then_some(true),
        ..Default::default()
    }
}

/// Generate a network configuration, check it, and write it to `output` or,
/// without one, to `out`.
pub fn cmd_generate<W: Write>(opts: &GenerateOptions, output: Option<&Path>, out: &mut W) -> Result<()> {
    let config = generate_network_config(opts);
    let config_json = serde_json::to_string_pretty(&config)?;

    decode_network_config(config_json.as_bytes())
        .context("Generated configuration does not decode")?
        .check_network_scope()
        .context("Generated configuration is incomplete")?;

    match output {
        Some(path) => {
            fs::write(path, &config_json)
                .with_context(|| format!("Failed to write network configuration to {}", path.display()))?;
            info!("Network configuration written to {}", path.display());
        }
        None => writeln!(out, "{}", config_json)?,
    }

    Ok(())
}
