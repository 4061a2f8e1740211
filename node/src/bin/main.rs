//! CLI bootstrap (A3). Parses configuration, sets up logging (`fern` +
//! `log-panics`), and wires an `Application` around the in-memory
//! reference backend. The actual consensus-engine-facing transport (the
//! server that accepts connections and frames requests/responses) is out
//! of scope — this binary's job ends at constructing a ready
//! `Application` and holding the process open until shutdown.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use serde_json::Value;

use bridge_node::appdata::AppDataStore;
use bridge_node::backend::memory::InMemoryBackend;
use bridge_node::config::BridgeConfig;
use bridge_node::facade::Application;
use bridge_node::query::{RpcClient, RpcClientError};
use bridge_node::validators::{FixedRewardStrategy, StaticValidatorElector};

/// Placeholder `RpcClient` for standalone runs with no read-RPC backend
/// wired up yet. A real deployment injects a client that actually dials
/// the external JSON-RPC server; the facade itself never needs to know
/// about HTTP/IPC specifics.
struct UnavailableRpcClient;

#[async_trait::async_trait]
impl RpcClient for UnavailableRpcClient {
    async fn call(&self, method: &str, _params: &[Value]) -> Result<Value, RpcClientError> {
        Err(RpcClientError(format!(
            "no RPC backend configured for method `{method}`"
        )))
    }
}

fn init_logger(level: log::LevelFilter, data_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)?;

    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .chain(fern::log_file(data_dir.join("bridge-node.log"))?)
        .apply()?;

    log_panics::init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::parse();
    let level = config
        .log_level
        .parse()
        .unwrap_or(log::LevelFilter::Info);
    init_logger(level, &config.data_dir)?;

    log::info!(
        "starting consensus-execution bridge: data_dir={}, bind_address={}, block_gas_limit={}",
        config.data_dir.display(),
        config.bind_address,
        config.block_gas_limit
    );

    let backend = InMemoryBackend::new(config.block_gas_limit);
    let appdata = AppDataStore::open(config.appdata_path())?;

    let app = Arc::new(Application::new(
        backend,
        Arc::new(StaticValidatorElector),
        Arc::new(FixedRewardStrategy(alloy_primitives::U256::ZERO)),
        Arc::new(UnavailableRpcClient),
        appdata,
    ));

    let info = app.info().await;
    log::info!(
        "bridge application ready at height {} (app_hash={})",
        info.last_block_height,
        hex::encode(&info.last_block_app_hash)
    );
    log::info!(
        "ABCI transport is external to this crate; awaiting shutdown signal on {}",
        config.bind_address
    );

    tokio::signal::ctrl_c().await?;
    log::info!("shutdown signal received, exiting");

    Ok(())
}
