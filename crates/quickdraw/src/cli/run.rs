//! `quickdraw run` subcommand implementation.
//!
//! Starts a node with configuration layering:
//! 1. TOML config file (base)
//! 2. Environment variables (override)
//! 3. CLI arguments (highest priority)
//!
//! Host participants get a line-buffered stdin trigger: each line entered is
//! one momentary press. Firmware ports replace the trigger, indicator and
//! power controller with pin-backed implementations.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use quickdraw_core::NodeAddress;

use crate::config::{QuickdrawConfig, Role};
use crate::network::UdpBroadcast;
use crate::node::{CoordinatorNode, ParticipantNode};
use crate::platform::{HostPower, LogIndicator, MonotonicClock, TriggerInput};
use crate::util::logging::RaceOutcomeLogger;

use super::logging;

#[derive(Parser, Debug)]
pub struct Args {
    #[arg(short, long, default_value = "quickdraw.toml")]
    pub config: PathBuf,

    #[arg(long, env = "QUICKDRAW_ROLE")]
    pub role: Option<String>,

    #[arg(long, env = "QUICKDRAW_ADDRESS")]
    pub address: Option<NodeAddress>,

    #[arg(long, env = "QUICKDRAW_CHANNEL")]
    pub channel: Option<u8>,
}

/// Press level fed by a background stdin reader. Each line holds the level
/// asserted for a short window, like a physical button held down, so every
/// poller (loop entry, power controller, post-resume check) sees the same
/// level.
#[derive(Clone)]
pub struct StdinTrigger {
    pressed: Arc<AtomicBool>,
}

const PRESS_HOLD_MS: u64 = 250;

impl StdinTrigger {
    pub fn spawn() -> Self {
        let pressed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&pressed);

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(_)) = lines.next_line().await {
                flag.store(true, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(PRESS_HOLD_MS)).await;
                flag.store(false, Ordering::SeqCst);
            }
        });

        Self { pressed }
    }
}

impl TriggerInput for StdinTrigger {
    fn is_asserted(&self) -> bool {
        self.pressed.load(Ordering::SeqCst)
    }
}

pub async fn execute(args: Args) -> anyhow::Result<()> {
    let mut config = if args.config.exists() {
        QuickdrawConfig::from_file(&args.config)?
    } else {
        tracing::warn!(
            path = %args.config.display(),
            "Config file not found, using defaults"
        );
        QuickdrawConfig::default()
    };

    if let Some(role) = args.role {
        config.node.role = match role.as_str() {
            "coordinator" => Role::Coordinator,
            "participant" => Role::Participant,
            other => anyhow::bail!("unknown role '{}'", other),
        };
    }
    if let Some(address) = args.address {
        config.node.address = Some(address);
    }
    if let Some(channel) = args.channel {
        config.node.channel = channel;
    }

    config.validate()?;

    let node_id = match (config.node.role, config.node.address) {
        (Role::Coordinator, _) => "coordinator".to_string(),
        (Role::Participant, Some(addr)) => addr.to_string().replace(':', ""),
        (Role::Participant, None) => "participant".to_string(),
    };
    logging::init_logging(&config.logging, &node_id)?;

    tracing::info!(
        role = ?config.node.role,
        address = ?config.node.address,
        channel = config.node.channel,
        "Starting quickdraw node"
    );

    let transport = UdpBroadcast::bind(&config.transport, config.node.channel).await?;
    let inbox = transport.start_receive_loop();

    match config.node.role {
        Role::Coordinator => {
            let outcome_logger = RaceOutcomeLogger::new(&config.logging, "coordinator");
            let mut node = CoordinatorNode::new(
                config.timing.clone(),
                transport,
                inbox,
                MonotonicClock::new(),
                outcome_logger,
            );

            tokio::select! {
                result = node.run() => result?,
                _ = signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                }
            }
        }
        Role::Participant => {
            let own = config
                .node
                .address
                .ok_or_else(|| anyhow::anyhow!("participant requires node.address"))?;
            let trigger = StdinTrigger::spawn();
            let mut power = HostPower::new(trigger.clone());
            let mut node = ParticipantNode::new(
                own,
                config.timing.clone(),
                transport,
                inbox,
                LogIndicator::default(),
                trigger,
                MonotonicClock::new(),
            );

            tokio::select! {
                result = node.run(&mut power) => result?,
                _ = signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                }
            }
        }
    }

    Ok(())
}
