//! tracing subscriber setup for the CLI: a filtered console layer, plus
//! rotated JSON file layers under the node's log directory when file
//! logging is enabled in the `[logging]` config section.
//!
//! `events.jsonl` carries driver and transport activity; `protocol.jsonl`
//! carries every state transition and datagram at trace level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::util::logging::LogConfig;

pub fn init_logging(config: &LogConfig, node_id: &str) -> anyhow::Result<()> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_filter(EnvFilter::from_default_env().add_directive("quickdraw=info".parse()?));

    if !config.enabled {
        tracing_subscriber::registry().with(console_layer).init();
        return Ok(());
    }

    let events_layer = fmt::layer()
        .json()
        .with_writer(config.open_log(node_id, "events.jsonl")?)
        .with_filter(EnvFilter::new("quickdraw::node=info,quickdraw::network=info"));

    let protocol_layer = fmt::layer()
        .json()
        .with_writer(config.open_log(node_id, "protocol.jsonl")?)
        .with_filter(EnvFilter::new("quickdraw::protocol=trace"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(events_layer)
        .with(protocol_layer)
        .init();

    tracing::info!(
        log_dir = %config.resolve_log_dir(node_id).display(),
        "logging initialized"
    );

    Ok(())
}
