//! Island Raid Simulator
//!
//! Runs one session on the real-time frame driver with a scripted client,
//! then replays the recorded input headlessly to check determinism.
//!
//! Usage: `island-raid-sim [preset | config.json]`

use anyhow::{bail, Context};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use island_raid::{
    VERSION,
    game::{
        combat::AttackRule,
        config::{GameConfig, Rules},
        events::GameEventData,
        input::{Key, KeyEvent},
        map::Terrain,
        state::{GamePhase, SessionState},
        tick::replay_session,
    },
    runtime::{ControlMessage, DriverOutput, FrameDriver, FrameUpdate, GameSnapshot},
};

/// Give up after this many seconds of play.
const SESSION_BUDGET_SECONDS: u32 = 60;

/// Ignore offsets smaller than this when steering.
const DEAD_ZONE: f32 = 2.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Island Raid Sim v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(arg) => match GameConfig::preset(&arg) {
            Some(preset) => preset,
            None => GameConfig::load(&arg).with_context(|| format!("loading config {arg}"))?,
        },
        None => GameConfig::default(),
    };
    let rules = config.rules().context("invalid configuration")?;
    info!(
        seed = config.seed,
        frame_rate = rules.frame_rate,
        movement = ?config.movement,
        pickup = ?config.pickup,
        attack = ?config.attack,
        "Configuration loaded"
    );

    let output = run_session(&rules, config.seed).await?;
    verify_replay(&rules, config.seed, &output)
}

/// Drive a live session with the autopilot until victory or the budget runs out.
async fn run_session(rules: &Rules, seed: u64) -> anyhow::Result<DriverOutput> {
    let (handle, driver) = FrameDriver::spawn(rules.clone(), seed)?;

    let map = handle.map();
    let water = map.cells.iter().filter(|t| **t == Terrain::Water).count();
    info!(columns = map.columns, rows = map.rows, water, "Map generated");

    let mut updates = handle.subscribe();
    handle.send(ControlMessage::Start).await?;

    let mut pilot = Autopilot::new(rules);
    let budget = rules.frame_rate * SESSION_BUDGET_SECONDS;

    loop {
        let update = match updates.recv().await {
            Ok(update) => update,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Autopilot fell behind");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        log_events(&update);

        if update.snapshot.phase == GamePhase::Won {
            break;
        }
        if update.snapshot.tick >= budget {
            warn!(tick = update.snapshot.tick, "Frame budget exhausted before victory");
            break;
        }

        for message in pilot.steer(&update.snapshot) {
            handle.send(message).await?;
        }
    }

    // Dropping the last handle stops the driver
    drop(updates);
    drop(handle);
    let output = driver.await.context("frame driver task failed")?;

    info!(
        ticks = output.state.tick,
        boss_health = output.state.boss.health,
        won = output.state.is_won(),
        "Live session finished"
    );
    Ok(output)
}

/// Replay the recording twice and compare against the live result.
fn verify_replay(rules: &Rules, seed: u64, output: &DriverOutput) -> anyhow::Result<()> {
    info!(frames = output.recording.len(), "=== Verifying Determinism ===");

    let live_hash = output.state.compute_hash();
    let mut replay_hashes = Vec::with_capacity(2);
    for _ in 0..2 {
        let initial = SessionState::new(rules, seed)?;
        let (replayed, _) = replay_session(initial, &output.recording, rules);
        replay_hashes.push(replayed.compute_hash());
    }

    info!("Live State Hash:   {}", hex::encode(live_hash));
    for hash in &replay_hashes {
        info!("Replay State Hash: {}", hex::encode(hash));
    }

    if replay_hashes.iter().all(|hash| *hash == live_hash) {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        bail!("replayed state diverged from the live session")
    }
}

fn log_events(update: &FrameUpdate) {
    for event in &update.events {
        match &event.data {
            GameEventData::PhaseChanged { from, to } => {
                info!(tick = event.tick, ?from, ?to, "Phase changed");
            }
            GameEventData::WeaponCollected { .. } => {
                info!(tick = event.tick, "Weapon collected");
            }
            GameEventData::BossDamaged { damage, health, max_health } => {
                info!(tick = event.tick, damage, "Boss health {}/{}", health, max_health);
            }
            GameEventData::Victory { ticks_played } => {
                info!(tick = event.tick, ticks_played, "Victory!");
            }
        }
    }
}

/// Scripted client: walk to the weapon, then to the boss, then swing.
struct Autopilot {
    held: [bool; 4],
    stop_distance: f32,
    triggered: bool,
}

impl Autopilot {
    const KEYS: [Key; 4] = [Key::Up, Key::Down, Key::Left, Key::Right];

    fn new(rules: &Rules) -> Self {
        let (range, triggered) = match rules.attack {
            AttackRule::Contact { range, .. } => (range, false),
            AttackRule::Triggered { range, .. } => (range, true),
        };
        Self {
            held: [false; 4],
            stop_distance: island_raid::core::fixed::to_float(range) * 0.6,
            triggered,
        }
    }

    fn steer(&mut self, snapshot: &GameSnapshot) -> Vec<ControlMessage> {
        let player = snapshot.player.bounds;
        let (target, stop) = if snapshot.player.has_weapon {
            (snapshot.boss.bounds, self.stop_distance)
        } else {
            (snapshot.weapon.bounds, 0.0)
        };

        let dx = target.x - player.x;
        let dy = target.y - player.y;
        let arrived = dx.hypot(dy) <= stop;

        let want = [
            !arrived && dy < -DEAD_ZONE,
            !arrived && dy > DEAD_ZONE,
            !arrived && dx < -DEAD_ZONE,
            !arrived && dx > DEAD_ZONE,
        ];

        let mut messages = Vec::new();
        for (i, key) in Self::KEYS.iter().enumerate() {
            if want[i] != self.held[i] {
                let event = if want[i] { KeyEvent::Down(*key) } else { KeyEvent::Up(*key) };
                messages.push(ControlMessage::Key { event });
                self.held[i] = want[i];
            }
        }

        if arrived && self.triggered && snapshot.player.has_weapon {
            messages.push(ControlMessage::Key { event: KeyEvent::Down(Key::Attack) });
            messages.push(ControlMessage::Key { event: KeyEvent::Up(Key::Attack) });
        }

        messages
    }
}
