//! Boss Combat
//!
//! Two ways to hurt the boss:
//!
//! - **Contact**: while armed and within range, damage is applied
//!   automatically, at most once per cooldown of session time.
//! - **Triggered**: each attack press is checked against phase, weapon,
//!   cooldown and range, in that order. Only a hit starts the cooldown.
//!
//! Either way health clamps at zero and the first tick it reaches zero
//! wins the session.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::fixed::Fixed;
use crate::game::events::GameEvent;
use crate::game::state::{GamePhase, SessionState};

/// Compiled attack policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackRule {
    /// Automatic damage while strictly within `range`
    Contact {
        /// Engagement distance
        range: Fixed,
        /// Health removed per hit
        damage: i32,
        /// Minimum session time between hits
        cooldown: Duration,
    },
    /// Damage on attack press while within `range` (inclusive)
    Triggered {
        /// Engagement distance
        range: Fixed,
        /// Health removed per hit
        damage: i32,
        /// Ticks before the next hit
        cooldown_ticks: u32,
    },
}

/// Result of one attack press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttackOutcome {
    /// Damage landed
    Hit {
        /// Damage actually dealt
        damage: i32,
        /// Boss health afterwards
        health: i32,
    },
    /// Session is not in play
    NotPlaying,
    /// Weapon not collected yet
    NoWeapon,
    /// Previous hit still cooling down
    CoolingDown {
        /// Ticks until the next hit is allowed
        ticks_left: u32,
    },
    /// Boss too far away
    OutOfRange,
}

impl AttackOutcome {
    /// Did the attack connect?
    pub fn is_hit(&self) -> bool {
        matches!(self, AttackOutcome::Hit { .. })
    }
}

/// Count the triggered-attack cooldown down by one tick, stopping at zero.
#[inline]
pub fn decay_attack_cooldown(state: &mut SessionState) {
    state.attack_cooldown = state.attack_cooldown.saturating_sub(1);
}

/// Apply contact damage if every condition holds. Returns true on a hit.
pub fn apply_contact_damage(
    state: &mut SessionState,
    range: Fixed,
    damage: i32,
    cooldown: Duration,
) -> bool {
    if !state.is_playing() || !state.player.has_weapon || state.boss.is_defeated() {
        return false;
    }
    if !state.player.position.within_distance(state.boss.position, range) {
        return false;
    }
    if let Some(last) = state.boss.last_hit {
        if state.clock.saturating_sub(last) < cooldown {
            return false;
        }
    }

    state.boss.last_hit = Some(state.clock);
    damage_boss(state, damage);
    true
}

/// Resolve one attack press.
pub fn attempt_attack(
    state: &mut SessionState,
    range: Fixed,
    damage: i32,
    cooldown_ticks: u32,
) -> AttackOutcome {
    if !state.is_playing() {
        return AttackOutcome::NotPlaying;
    }
    if !state.player.has_weapon {
        return AttackOutcome::NoWeapon;
    }
    if state.attack_cooldown > 0 {
        return AttackOutcome::CoolingDown {
            ticks_left: state.attack_cooldown,
        };
    }
    if !state.player.position.within_distance_inclusive(state.boss.position, range) {
        debug!(tick = state.tick, "Attack out of range");
        return AttackOutcome::OutOfRange;
    }

    let dealt = damage_boss(state, damage);
    state.attack_cooldown = cooldown_ticks;
    AttackOutcome::Hit {
        damage: dealt,
        health: state.boss.health,
    }
}

/// Subtract health, record the hit and handle victory. Returns damage dealt.
fn damage_boss(state: &mut SessionState, damage: i32) -> i32 {
    let dealt = state.boss.apply_damage(damage);
    let event = GameEvent::boss_damaged(state.tick, dealt, state.boss.health, state.boss.max_health);
    state.push_event(event);
    debug!(tick = state.tick, dealt, health = state.boss.health, "Boss hit");

    if state.boss.is_defeated() && state.phase == GamePhase::Playing {
        let ticks_played = state.ticks_in_round();
        state.push_event(GameEvent::victory(state.tick, ticks_played));
        state.set_phase(GamePhase::Won);
        info!(tick = state.tick, ticks_played, "Boss defeated");
    }

    dealt
}

// =============================================================================
// TESTS
// =============================================================================
