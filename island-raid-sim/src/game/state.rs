//! Game State Definitions
//!
//! All state types for a single-player session: the player, the weapon
//! pickup, the boss, the terrain and the phase they play out in.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::game::config::{ConfigError, Rules};
use crate::game::events::GameEvent;
use crate::game::map::TileMap;

// =============================================================================
// PLAYER STATE
// =============================================================================

/// The player-controlled box.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Top-left corner
    pub position: FixedVec2,

    /// Width and height
    pub size: FixedVec2,

    /// Distance per step on land
    pub speed: Fixed,

    /// Carrying the weapon
    pub has_weapon: bool,

    /// Box center was over water after the last move
    pub in_water: bool,
}

impl PlayerState {
    /// Create a player at its spawn.
    pub fn new(position: FixedVec2, size: FixedVec2, speed: Fixed) -> Self {
        Self {
            position,
            size,
            speed,
            has_weapon: false,
            in_water: false,
        }
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> FixedVec2 {
        self.position + self.size.half()
    }

    /// Hash player state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.size);
        hasher.update_fixed(self.speed);
        hasher.update_bool(self.has_weapon);
        hasher.update_bool(self.in_water);
    }
}

// =============================================================================
// WEAPON STATE
// =============================================================================

/// The weapon lying on the map until collected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponState {
    /// Top-left corner
    pub position: FixedVec2,

    /// Width and height
    pub size: FixedVec2,

    /// Already picked up (never reverts within a round)
    pub collected: bool,
}

impl WeaponState {
    /// Create an uncollected weapon.
    pub fn new(position: FixedVec2, size: FixedVec2) -> Self {
        Self {
            position,
            size,
            collected: false,
        }
    }
}

// =============================================================================
// BOSS STATE
// =============================================================================

/// The stationary boss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossState {
    /// Top-left corner
    pub position: FixedVec2,

    /// Width and height
    pub size: FixedVec2,

    /// Current health, never below zero
    pub health: i32,

    /// Health at spawn
    pub max_health: i32,

    /// Session clock at the last contact hit
    pub last_hit: Option<Duration>,
}

impl BossState {
    /// Create a boss at full health.
    pub fn new(position: FixedVec2, size: FixedVec2, max_health: i32) -> Self {
        Self {
            position,
            size,
            health: max_health,
            max_health,
            last_hit: None,
        }
    }

    /// Health is gone.
    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Subtract damage, clamping at zero. Returns the damage actually dealt.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let dealt = amount.clamp(0, self.health.max(0));
        self.health -= dealt;
        dealt
    }
}

// =============================================================================
// GAME PHASE
// =============================================================================

/// Session phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Waiting for the start signal; the world renders but nothing moves
    #[default]
    NotStarted,
    /// Active gameplay
    Playing,
    /// Boss defeated
    Won,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Complete state of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    /// Ticks simulated while playing, across restarts
    pub tick: u32,

    /// Tick at which the current round started
    pub round_start_tick: u32,

    /// Simulated time accumulated while playing
    pub clock: Duration,

    /// Current phase
    pub phase: GamePhase,

    /// Seed the terrain was generated from
    pub rng_seed: u64,

    /// Terrain grid, fixed for the session's lifetime
    pub map: TileMap,

    /// Player
    pub player: PlayerState,

    /// Weapon pickup
    pub weapon: WeaponState,

    /// Boss
    pub boss: BossState,

    /// Ticks until the next triggered attack is allowed
    pub attack_cooldown: u32,

    /// Events generated since the last drain
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl SessionState {
    /// Build a fresh session: generate the map, clear the spawn patches and
    /// place every entity at its spawn.
    pub fn new(rules: &Rules, seed: u64) -> Result<Self, ConfigError> {
        let mut rng = DeterministicRng::new(seed);
        let mut map = TileMap::generate(
            rules.columns,
            rules.rows,
            rules.tile_size,
            &rules.layout,
            &mut rng,
        )?;

        let spawns = [
            (rules.player_spawn, rules.player_size),
            (rules.weapon_spawn, rules.weapon_size),
            (rules.boss_spawn, rules.boss_size),
        ];
        for (spawn, size) in spawns {
            let radius = rules.spawn_patch_radius(size);
            let changed = map.ensure_passable_patch(spawn + size.half(), radius);
            debug!(spawn = %spawn, radius, changed, "Cleared spawn patch");
        }

        info!(
            seed,
            columns = map.columns(),
            rows = map.rows(),
            "Session created"
        );

        Ok(Self {
            tick: 0,
            round_start_tick: 0,
            clock: Duration::ZERO,
            phase: GamePhase::NotStarted,
            rng_seed: seed,
            map,
            player: PlayerState::new(rules.player_spawn, rules.player_size, rules.player_speed),
            weapon: WeaponState::new(rules.weapon_spawn, rules.weapon_size),
            boss: BossState::new(rules.boss_spawn, rules.boss_size, rules.boss_max_health),
            attack_cooldown: 0,
            pending_events: Vec::new(),
        })
    }

    /// Leave the start screen. Only honoured from `NotStarted`.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::NotStarted {
            return false;
        }
        self.round_start_tick = self.tick;
        self.set_phase(GamePhase::Playing);
        info!(tick = self.tick, "Session started");
        true
    }

    /// Reset every entity to its spawn and resume play on the same map.
    ///
    /// Honoured from `Playing` and `Won`; ignored before the first start.
    pub fn restart(&mut self, rules: &Rules) -> bool {
        if self.phase == GamePhase::NotStarted {
            return false;
        }

        self.player = PlayerState::new(rules.player_spawn, rules.player_size, rules.player_speed);
        self.weapon = WeaponState::new(rules.weapon_spawn, rules.weapon_size);
        self.boss = BossState::new(rules.boss_spawn, rules.boss_size, rules.boss_max_health);
        self.attack_cooldown = 0;
        self.round_start_tick = self.tick;

        if self.phase != GamePhase::Playing {
            self.set_phase(GamePhase::Playing);
        }
        info!(tick = self.tick, "Session restarted");
        true
    }

    /// Is the session accepting gameplay input?
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Has the boss been defeated?
    #[inline]
    pub fn is_won(&self) -> bool {
        self.phase == GamePhase::Won
    }

    /// Ticks simulated since the current round began.
    pub fn ticks_in_round(&self) -> u32 {
        self.tick - self.round_start_tick
    }

    /// Transition phase and record the change.
    pub(crate) fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        self.phase = to;
        self.push_event(GameEvent::phase_changed(self.tick, from, to));
    }

    /// Queue an event for the next drain.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Compute deterministic hash of current state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_u32(self.round_start_tick);
            hasher.update_u64(self.clock.as_micros() as u64);
            hasher.update_u8(self.phase as u8);

            self.player.hash_into(hasher);

            hasher.update_vec2(self.weapon.position);
            hasher.update_bool(self.weapon.collected);

            hasher.update_vec2(self.boss.position);
            hasher.update_i32(self.boss.health);
            hasher.update_u64(self.boss.last_hit.map_or(u64::MAX, |t| t.as_micros() as u64));

            hasher.update_u32(self.attack_cooldown);

            for terrain in self.map.cells() {
                hasher.update_u8(*terrain as u8);
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
