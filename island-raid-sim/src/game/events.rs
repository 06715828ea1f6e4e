//! Game Events
//!
//! Events generated during simulation. The tick loop drains them into each
//! [`TickResult`](crate::game::tick::TickResult) so a renderer or log can
//! react without polling state.

use serde::{Serialize, Deserialize};
use crate::core::vec2::FixedVec2;
use crate::game::state::GamePhase;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventData {
    /// Session phase changed
    PhaseChanged {
        /// Previous phase
        from: GamePhase,
        /// New phase
        to: GamePhase,
    },

    /// Player picked up the weapon
    WeaponCollected {
        /// Where the weapon lay
        position: FixedVec2,
    },

    /// Boss took damage
    BossDamaged {
        /// Damage actually dealt
        damage: i32,
        /// Health after the hit
        health: i32,
        /// Health at spawn
        max_health: i32,
    },

    /// Boss health reached zero
    Victory {
        /// Ticks since the round started
        ticks_played: u32,
    },
}

/// A game event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create phase changed event.
    pub fn phase_changed(tick: u32, from: GamePhase, to: GamePhase) -> Self {
        Self::new(tick, GameEventData::PhaseChanged { from, to })
    }

    /// Create weapon collected event.
    pub fn weapon_collected(tick: u32, position: FixedVec2) -> Self {
        Self::new(tick, GameEventData::WeaponCollected { position })
    }

    /// Create boss damaged event.
    pub fn boss_damaged(tick: u32, damage: i32, health: i32, max_health: i32) -> Self {
        Self::new(
            tick,
            GameEventData::BossDamaged {
                damage,
                health,
                max_health,
            },
        )
    }

    /// Create victory event.
    pub fn victory(tick: u32, ticks_played: u32) -> Self {
        Self::new(tick, GameEventData::Victory { ticks_played })
    }

    /// Is this the victory notification?
    pub fn is_victory(&self) -> bool {
        matches!(self.data, GameEventData::Victory { .. })
    }
}
