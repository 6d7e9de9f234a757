use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vpc_branch_eni::commands::{self, GenerateOptions};
use vpc_branch_eni::InterfaceType;

/// A command line tool to check and generate branch ENI network configurations
#[derive(Parser)]
#[command(name = "branch-eni-ctl", author, version, about)]
struct Cli {
    /// CNI version used for generated documents and error results
    #[arg(long, default_value = "1.0.0")]
    cni_version: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge and validate a network configuration with per-container arguments
    Validate {
        /// Network configuration file (read from stdin when absent)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Per-container arguments (Key1=Value1;Key2=Value2)
        #[arg(long, env = "CNI_ARGS")]
        args: Option<String>,
    },

    /// Generate a network configuration
    Generate {
        /// Network name
        #[arg(long, default_value = "vpc-branch-eni")]
        name: String,

        /// Trunk interface name
        #[arg(long, required_unless_present = "trunk_mac")]
        trunk_name: Option<String>,

        /// Trunk interface MAC address
        #[arg(long)]
        trunk_mac: Option<String>,

        /// Branch interface type (tap or vlan)
        #[arg(long)]
        interface_type: Option<InterfaceType>,

        /// Owner uid of the TAP device
        #[arg(long)]
        uid: Option<u32>,

        /// Owner gid of the TAP device
        #[arg(long)]
        gid: Option<u32>,

        /// Block instance metadata service traffic on the branch
        #[arg(long)]
        block_imds: bool,

        /// Output file path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only JSON
    let log_level = if cli.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set default subscriber")?;

    match cli.command {
        Commands::Validate { config, args } => {
            let mut cmd_args = match config {
                Some(path) => {
                    let mut cmd_args = commands::parse_env();
                    cmd_args.stdin_data = fs::read(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    cmd_args
                }
                None => commands::parse_args()?,
            };
            if let Some(args) = args {
                cmd_args.args = args;
            }

            let valid = commands::cmd_validate(&cmd_args, &cli.cni_version, &mut io::stdout())?;
            if !valid {
                std::process::exit(1);
            }
        }

        Commands::Generate {
            name,
            trunk_name,
            trunk_mac,
            interface_type,
            uid,
            gid,
            block_imds,
            output,
        } => {
            let opts = GenerateOptions {
                cni_version: cli.cni_version,
                name,
                trunk_name,
                trunk_mac_address: trunk_mac,
                interface_type,
                uid,
                gid,
                block_instance_metadata: block_imds,
            };
            commands::cmd_generate(&opts, output.as_deref(), &mut io::stdout())?;
        }
    }

    Ok(())
}
