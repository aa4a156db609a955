// Node options and argument derivation

use serde::{Deserialize, Serialize};

/// Node settings chosen on the host command line
///
/// Every field is optional; unset fields leave the node on its own
/// defaults and contribute no arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOptions {
    pub chain: Option<String>,
    pub light: bool,
    pub base_path: Option<String>,
    pub jsonrpc_interface: Option<String>,
    pub jsonrpc_port: Option<u16>,
    pub ws_interface: Option<String>,
    pub ws_port: Option<u16>,
    /// Forwarded verbatim after the derived flags
    pub passthrough: Vec<String>,
}

/// Map host options to the node's argument vector.
///
/// Deterministic: identical options always produce the identical vector,
/// in a fixed flag order. Default options produce an empty vector, which
/// is what marks a launch as "not caller-supplied".
pub fn derive_args(options: &NodeOptions) -> Vec<String> {
    let mut args = Vec::new();

    push_value(&mut args, "--chain", options.chain.as_deref());
    if options.light {
        args.push("--light".to_string());
    }
    push_value(&mut args, "--base-path", options.base_path.as_deref());
    push_value(
        &mut args,
        "--jsonrpc-interface",
        options.jsonrpc_interface.as_deref(),
    );
    push_value(
        &mut args,
        "--jsonrpc-port",
        options.jsonrpc_port.map(|p| p.to_string()).as_deref(),
    );
    push_value(&mut args, "--ws-interface", options.ws_interface.as_deref());
    push_value(
        &mut args,
        "--ws-port",
        options.ws_port.map(|p| p.to_string()).as_deref(),
    );

    args.extend(options.passthrough.iter().cloned());
    args
}

fn push_value(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}
