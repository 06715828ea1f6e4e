//! Simulation Tick
//!
//! One call per rendered frame. Given the same state, input frame, elapsed
//! time and rules it always produces the same result.

use std::time::Duration;
use serde::{Serialize, Deserialize};

#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::game::combat::{
    AttackOutcome, AttackRule,
    apply_contact_damage, attempt_attack, decay_attack_cooldown,
};
use crate::game::config::Rules;
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::movement::{resolve_movement, step_distance};
use crate::game::pickup::try_collect_weapon;
use crate::game::state::{GamePhase, SessionState};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated since the previous tick
    pub events: Vec<GameEvent>,
    /// Outcome of this tick's attack press, if there was one
    pub attack: Option<AttackOutcome>,
    /// Session is won after this tick
    pub won: bool,
}

/// One recorded tick of input, enough to replay a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Input sampled at tick start
    pub frame: InputFrame,
    /// Elapsed time fed to the tick
    pub dt: Duration,
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `state` - The session state (will be mutated)
/// * `frame` - Input sampled at the start of this tick
/// * `dt` - Time since the previous tick
/// * `rules` - Compiled configuration
///
/// Outside `Playing` nothing moves: the tick only drains pending events
/// (e.g. a phase change from `start`).
pub fn tick(
    state: &mut SessionState,
    frame: InputFrame,
    dt: Duration,
    rules: &Rules,
) -> TickResult {
    let mut result = TickResult::default();

    match state.phase {
        GamePhase::NotStarted => {
            result.events = state.take_events();
            return result;
        }
        GamePhase::Won => {
            result.events = state.take_events();
            result.won = true;
            return result;
        }
        GamePhase::Playing => {}
    }

    // 0. Advance tick counter and session clock
    state.tick += 1;
    state.clock += dt;

    // 1. Cooldowns
    decay_attack_cooldown(state);

    // 2. Movement
    let step = step_distance(state.player.speed, rules.timing, dt);
    resolve_movement(
        &mut state.player,
        frame,
        &state.map,
        rules.canvas,
        rules.movement,
        step,
    );

    // 3. Weapon pickup
    try_collect_weapon(state, rules.pickup);

    // 4. Boss damage
    match rules.attack {
        AttackRule::Contact { range, damage, cooldown } => {
            apply_contact_damage(state, range, damage, cooldown);
        }
        AttackRule::Triggered { range, damage, cooldown_ticks } => {
            if frame.attack_pressed() {
                result.attack = Some(attempt_attack(state, range, damage, cooldown_ticks));
            }
        }
    }

    #[cfg(feature = "debug-tracing")]
    trace!(
        tick = state.tick,
        position = %state.player.position,
        in_water = state.player.in_water,
        boss_health = state.boss.health,
        cooldown = state.attack_cooldown,
        "Tick"
    );

    result.won = state.is_won();
    result.events = state.take_events();
    result
}

/// Replay a recorded session from its initial state.
///
/// Starts the session if it has not started, then feeds frames until they
/// run out or the boss falls.
pub fn replay_session(
    initial_state: SessionState,
    frames: &[RecordedFrame],
    rules: &Rules,
) -> (SessionState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    state.start();

    for recorded in frames {
        let result = tick(&mut state, recorded.frame, recorded.dt, rules);
        all_events.extend(result.events);

        if result.won {
            break;
        }
    }

    (state, all_events)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;
    use crate::core::vec2::FixedVec2;
    use crate::game::config::GameConfig;
    use crate::game::events::GameEventData;
    use crate::game::input::Key;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn started(config: GameConfig) -> (SessionState, Rules) {
        let rules = config.rules().unwrap();
        let mut state = SessionState::new(&rules, 12345).unwrap();
        state.start();
        (state, rules)
    }

    #[test]
    fn test_not_started_is_frozen() {
        let rules = GameConfig::default().rules().unwrap();
        let mut state = SessionState::new(&rules, 1).unwrap();
        let before = state.compute_hash();

        let result = tick(&mut state, InputFrame::with_keys(&[Key::Right]), FRAME, &rules);
        assert!(result.events.is_empty());
        assert_eq!(state.compute_hash(), before);
    }

    #[test]
    fn test_start_event_drains_on_first_tick() {
        let (mut state, rules) = started(GameConfig::default());
        let result = tick(&mut state, InputFrame::new(), FRAME, &rules);

        assert_eq!(state.tick, 1);
        assert_eq!(
            result.events[0].data,
            GameEventData::PhaseChanged {
                from: GamePhase::NotStarted,
                to: GamePhase::Playing,
            }
        );
    }

    #[test]
    fn test_player_movement() {
        let (mut state, rules) = started(GameConfig::default());
        let start = state.player.position;

        tick(&mut state, InputFrame::with_keys(&[Key::Up]), FRAME, &rules);
        assert_eq!(state.player.position, start - FixedVec2::new(0, from_int(3)));
    }

    #[test]
    fn test_pickup_happens_in_tick() {
        let (mut state, rules) = started(GameConfig::default());
        state.player.position = state.weapon.position + FixedVec2::from_ints(-20, 0);

        let result = tick(&mut state, InputFrame::with_keys(&[Key::Right]), FRAME, &rules);
        assert!(state.player.has_weapon);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::WeaponCollected { .. })));
    }

    #[test]
    fn test_attack_outcome_reported() {
        let (mut state, rules) = started(GameConfig::default());
        let attack = InputFrame::with_keys(&[Key::Attack]);

        let result = tick(&mut state, attack, FRAME, &rules);
        assert_eq!(result.attack, Some(AttackOutcome::NoWeapon));

        let result = tick(&mut state, InputFrame::new(), FRAME, &rules);
        assert_eq!(result.attack, None);
    }

    #[test]
    fn test_cooldown_decays_before_attack() {
        let (mut state, rules) = started(GameConfig::default());
        state.player.has_weapon = true;
        state.weapon.collected = true;
        state.player.position = state.boss.position + FixedVec2::from_ints(-30, 0);
        let attack = InputFrame::with_keys(&[Key::Attack]);

        assert!(tick(&mut state, attack, FRAME, &rules).attack.is_some_and(|o| o.is_hit()));

        // 29 ticks later one tick of cooldown is left
        for _ in 0..28 {
            tick(&mut state, InputFrame::new(), FRAME, &rules);
        }
        assert_eq!(
            tick(&mut state, attack, FRAME, &rules).attack,
            Some(AttackOutcome::CoolingDown { ticks_left: 1 })
        );

        // The 30th tick decays it to zero first
        assert!(tick(&mut state, attack, FRAME, &rules).attack.is_some_and(|o| o.is_hit()));
    }

    #[test]
    fn test_contact_damage_uses_session_clock() {
        let (mut state, rules) = started(GameConfig::classic());
        state.player.has_weapon = true;
        state.weapon.collected = true;
        state.player.position = state.boss.position + FixedVec2::from_ints(-30, 0);

        tick(&mut state, InputFrame::new(), FRAME, &rules);
        assert_eq!(state.boss.health, 90);

        // 29 more frames ≈ 483 ms
        for _ in 0..29 {
            tick(&mut state, InputFrame::new(), FRAME, &rules);
        }
        assert_eq!(state.boss.health, 90);

        tick(&mut state, InputFrame::new(), FRAME, &rules);
        assert_eq!(state.boss.health, 80);
    }

    #[test]
    fn test_won_is_terminal() {
        let (mut state, rules) = started(GameConfig::default());
        state.player.has_weapon = true;
        state.player.position = state.boss.position;
        state.boss.health = 20;

        let result = tick(&mut state, InputFrame::with_keys(&[Key::Attack]), FRAME, &rules);
        assert!(result.won);
        assert_eq!(result.events.iter().filter(|e| e.is_victory()).count(), 1);

        let frozen = state.compute_hash();
        let result = tick(&mut state, InputFrame::with_keys(&[Key::Left]), FRAME, &rules);
        assert!(result.won);
        assert!(result.events.is_empty());
        assert_eq!(state.compute_hash(), frozen);
    }

    #[test]
    fn test_replay_determinism() {
        let rules = GameConfig::default().rules().unwrap();
        let frames: Vec<RecordedFrame> = (0..200)
            .map(|t| {
                let keys: &[Key] = match t % 4 {
                    0 => &[Key::Right],
                    1 => &[Key::Up, Key::Right],
                    2 => &[Key::Attack],
                    _ => &[],
                };
                RecordedFrame { frame: InputFrame::with_keys(keys), dt: FRAME }
            })
            .collect();

        let (final1, events1) = replay_session(SessionState::new(&rules, 99999).unwrap(), &frames, &rules);
        let (final2, events2) = replay_session(SessionState::new(&rules, 99999).unwrap(), &frames, &rules);

        assert_eq!(final1.compute_hash(), final2.compute_hash());
        assert_eq!(events1, events2);
        assert_eq!(final1.tick, 200);
    }
}
