//! Headless world simulator.
//!
//! Runs the avatar simulation at a fixed tick rate with scripted input
//! and a synthetic remote player, logging state as it goes. Useful for
//! profiling the frame logic and for eyeballing tuning changes without
//! a renderer.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use parking_lot::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use officeworld::config::WorldConfig;
use officeworld::world::remote::{
    PlayerSnapshot, PositionBroadcaster, PresenceEvent, RemoteRoster, WirePosition, WireRotation,
};
use officeworld::world::{Vec3, World, WorldHandle, WorldRunner};

#[derive(Parser, Debug)]
#[command(name = "officeworld-sim", about = "Headless virtual office simulator")]
struct Args {
    /// Path to a world.toml; defaults to the built-in world
    #[arg(long, env = "OFFICEWORLD_CONFIG")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Simulation tick rate in Hz
    #[arg(long, default_value_t = 60)]
    tick_rate: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => WorldConfig::from_file(path)
            .with_context(|| format!("loading world config from {}", path.display()))?,
        None => WorldConfig::default(),
    };
    info!(world = %config.name, buildings = config.buildings.len(), "world loaded");

    let (presence_tx, presence_rx) = crossbeam_channel::unbounded();
    let (broadcast_tx, broadcast_rx) = crossbeam_channel::unbounded();

    let mut world = World::new(&config);
    world.roster = Some(RemoteRoster::new(presence_rx));
    world.broadcaster = Some(PositionBroadcaster::new(Uuid::new_v4(), broadcast_tx));

    // Scripted input: hold forward, sprint after a second.
    world.key_down("KeyW");

    let handle: WorldHandle = Arc::new(RwLock::new(world));

    // Synthetic remote player pacing back and forth on the lawn.
    let feeder = spawn_presence_feeder(presence_tx, args.ticks, args.tick_rate);

    // Drain outgoing broadcasts so the channel never backs up.
    let drain = thread::spawn(move || broadcast_rx.iter().count());

    {
        let mut world = handle.write();
        if world.tuning.can_fly {
            // Double-tap jump to demonstrate the flight toggle.
            world.key_down("Space");
            world.key_up("Space");
            world.key_down("Space");
        }
    }

    let runner = WorldRunner::new(handle.clone(), args.tick_rate);
    runner.run(args.ticks.min(60));

    handle.write().key_down("ShiftLeft");
    runner.run(args.ticks.saturating_sub(60));

    feeder.join().ok();

    let world = handle.read();
    info!(
        position = ?world.avatar.position,
        speed = world.avatar.horizontal_speed(),
        flying = world.avatar.flying,
        zone = world.current_zone(),
        pose = ?world.pose.state,
        remotes = world.roster.as_ref().map(|r| r.len()).unwrap_or(0),
        "simulation finished"
    );
    drop(world);
    // Dropping every world handle drops the broadcaster's sender, which
    // lets the drain thread finish.
    drop(runner);
    drop(handle);
    info!(broadcasts = drain.join().unwrap_or(0), "broadcast channel drained");

    Ok(())
}

/// Feeds join + walk + leave events for one synthetic remote player.
fn spawn_presence_feeder(
    tx: crossbeam_channel::Sender<PresenceEvent>,
    ticks: u64,
    tick_rate: u64,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let player_id = Uuid::new_v4();
        let origin = Vec3::new(170.0, 0.0, 10.0);
        let join = PresenceEvent::PlayerJoined {
            player: PlayerSnapshot {
                id: player_id,
                username: "visitor".to_string(),
                display_name: "Visitor".to_string(),
                avatar_url: None,
                is_admin: false,
                equipment: None,
                position: origin.into(),
                rotation: WireRotation { y: 0.0 },
                current_zone: "ground".to_string(),
                is_moving: false,
                last_update: Utc::now(),
            },
        };
        if tx.send(join).is_err() {
            return;
        }

        // ~10 Hz updates, the rate the real channel throttles to.
        let updates = (ticks / tick_rate.max(1)).max(1) * 10;
        for i in 0..updates {
            let t = i as f32 * 0.1;
            let position = origin + Vec3::new((t * 0.8).sin() * 6.0, 0.0, t.cos() * 4.0);
            let event = PresenceEvent::PositionBroadcast {
                player_id,
                position: WirePosition::from(position),
                rotation: WireRotation { y: t.sin() },
                current_zone: "ground".to_string(),
                is_moving: true,
                timestamp: Utc::now(),
            };
            if tx.send(event).is_err() {
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }

        let _ = tx.send(PresenceEvent::PlayerLeft { player_id });
    })
}
