//! Bootstrap configuration (A2/A9). A flat `pub const` module for
//! protocol-wide constants (the consensus-critical ones — `MAX_TX_SIZE`,
//! the gas schedule — live in `bridge_common::config` since they're part
//! of the shared admission/delivery contract) plus a `clap::Parser`-
//! derived struct for everything that varies per deployment.

use std::path::PathBuf;

use clap::Parser;

/// Default gas ceiling enforced per block. Not consensus-critical in
/// the sense of being baked into the wire format — it's a per-deployment
/// operator choice, so it lives here rather than in
/// `bridge_common::config`.
pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 30_000_000;

/// Default bind address for the consensus-engine-facing protocol server.
/// The server itself (the transport that accepts connections on this
/// address) is out of scope — this is plumbing for whatever binary
/// wires one up.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:26658";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "bridge-node",
    about = "ABCI-style consensus-execution bridge application"
)]
pub struct BridgeConfig {
    /// Root directory for this node's private data (app metadata store).
    /// The execution backend persists under its own path, not this one.
    #[arg(long, default_value = "./bridge-data")]
    pub data_dir: PathBuf,

    /// Address the consensus-engine-facing protocol server binds to.
    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind_address: String,

    /// Gas ceiling enforced against `DeliverTx`/`CheckTx`.
    #[arg(long, default_value_t = DEFAULT_BLOCK_GAS_LIMIT)]
    pub block_gas_limit: u64,

    /// `log` crate level filter: one of error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl BridgeConfig {
    /// Path to the app-private key-value store (`<dataDir>/appdata`).
    pub fn appdata_path(&self) -> PathBuf {
        self.data_dir.join("appdata")
    }
}
