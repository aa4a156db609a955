//! Host configuration: command line with `FETHER_*` environment fallbacks

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;

use fether_api_rpc::server::DEFAULT_RPC_PORT;
use fether_core::domain::NodeOptions;

const FALLBACK_DATA_DIR: &str = "~/.fether";
const INSTALL_SUBDIR: &str = "bin";
const LOG_SUBDIR: &str = "logs";

#[derive(Parser, Debug)]
#[command(name = "fether")]
#[command(about = "Fether wallet host: runs and supervises a local parity node", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Do not start the node (use one that is already running)
    #[arg(long)]
    pub no_run_parity: bool,

    /// Path to a parity binary, checked before any other location
    #[arg(long, env = "FETHER_PARITY_PATH")]
    pub parity_path: Option<String>,

    /// Shell command that installs parity into $FETHER_INSTALL_DIR
    #[arg(long, env = "FETHER_FETCH_COMMAND")]
    pub fetch_command: Option<String>,

    /// Data directory (node log, installed binary, host logs)
    #[arg(long, env = "FETHER_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Port of the localhost status server
    #[arg(long, env = "FETHER_RPC_PORT", default_value_t = DEFAULT_RPC_PORT)]
    pub rpc_port: u16,

    /// Disable the status server
    #[arg(long)]
    pub no_rpc: bool,

    /// Host log format: pretty or json
    #[arg(long, env = "FETHER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Chain the node should sync (passed as --chain)
    #[arg(long)]
    pub chain: Option<String>,

    /// Run the node as a light client
    #[arg(long)]
    pub light: bool,

    /// Node data directory (passed as --base-path)
    #[arg(long)]
    pub base_path: Option<String>,

    #[arg(long)]
    pub jsonrpc_interface: Option<String>,

    #[arg(long)]
    pub jsonrpc_port: Option<u16>,

    #[arg(long)]
    pub ws_interface: Option<String>,

    #[arg(long)]
    pub ws_port: Option<u16>,

    /// Extra node arguments, after `--`
    #[arg(last = true)]
    pub passthrough: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Resolved host settings
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub data_dir: PathBuf,
    pub install_dir: PathBuf,
    pub log_dir: PathBuf,
    pub parity_path: Option<PathBuf>,
    pub fetch_command: Option<String>,
    pub run_node: bool,
    pub rpc_port: Option<u16>,
    pub log_format: LogFormat,
    pub node_options: NodeOptions,
}

impl LauncherConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let data_dir = match cli.data_dir.as_deref() {
            Some(dir) => expand(dir),
            None => default_data_dir(),
        };

        let log_format = match cli.log_format.as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => return Err(anyhow!("unknown log format '{}' (pretty|json)", other)),
        };

        let node_options = NodeOptions {
            chain: cli.chain,
            light: cli.light,
            base_path: cli.base_path.as_deref().map(|p| expand(p).display().to_string()),
            jsonrpc_interface: cli.jsonrpc_interface,
            jsonrpc_port: cli.jsonrpc_port,
            ws_interface: cli.ws_interface,
            ws_port: cli.ws_port,
            passthrough: cli.passthrough,
        };

        Ok(Self {
            install_dir: data_dir.join(INSTALL_SUBDIR),
            log_dir: data_dir.join(LOG_SUBDIR),
            data_dir,
            parity_path: cli.parity_path.as_deref().map(expand),
            fetch_command: cli.fetch_command.filter(|c| !c.trim().is_empty()),
            run_node: !cli.no_run_parity,
            rpc_port: (!cli.no_rpc).then_some(cli.rpc_port),
            log_format,
            node_options,
        })
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("io", "parity", "fether")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| expand(FALLBACK_DATA_DIR))
}
