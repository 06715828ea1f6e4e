//! End-to-end session scenarios.

use std::time::Duration;

use island_raid::core::fixed::Fixed;
use island_raid::core::vec2::FixedVec2;
use island_raid::game::combat::{attempt_attack, AttackOutcome, AttackRule};
use island_raid::game::config::{GameConfig, Rules};
use island_raid::game::events::GameEventData;
use island_raid::game::input::{InputFrame, InputState, Key, KeyEvent};
use island_raid::game::state::{GamePhase, SessionState};
use island_raid::game::tick::{replay_session, tick, RecordedFrame};

const FRAME: Duration = Duration::from_micros(16_667);

fn archipelago() -> (SessionState, Rules) {
    let rules = GameConfig::archipelago().rules().unwrap();
    let mut state = SessionState::new(&rules, 2024).unwrap();
    state.start();
    (state, rules)
}

fn press_attack(input: &mut InputState) -> InputFrame {
    input.apply(KeyEvent::Down(Key::Attack));
    input.apply(KeyEvent::Up(Key::Attack));
    input.take_frame()
}

#[test]
fn five_hits_defeat_the_boss_and_a_sixth_is_rejected() {
    let (mut state, rules) = archipelago();
    state.player.has_weapon = true;
    state.weapon.collected = true;
    state.player.position = state.boss.position + FixedVec2::from_ints(-40, 0);

    let mut input = InputState::new();
    let mut hits = 0;
    let mut victory_events = 0;
    let mut last_hit_tick = None;

    for _ in 0..400 {
        let frame = press_attack(&mut input);
        let result = tick(&mut state, frame, FRAME, &rules);
        victory_events += result.events.iter().filter(|e| e.is_victory()).count();

        if let Some(AttackOutcome::Hit { .. }) = result.attack {
            if let Some(previous) = last_hit_tick {
                assert_eq!(state.tick - previous, 30);
            }
            last_hit_tick = Some(state.tick);
            hits += 1;
        }
        if result.won {
            break;
        }
    }

    assert_eq!(hits, 5);
    assert_eq!(state.boss.health, 0);
    assert_eq!(state.phase, GamePhase::Won);
    assert_eq!(victory_events, 1);

    // A sixth swing right after the fifth
    let outcome = attempt_attack(&mut state, attack_range(&rules), 20, 30);
    assert!(!outcome.is_hit());
    assert_eq!(state.boss.health, 0);
}

fn attack_range(rules: &Rules) -> Fixed {
    match rules.attack {
        AttackRule::Triggered { range, .. } | AttackRule::Contact { range, .. } => range,
    }
}

#[test]
fn sixth_attack_inside_cooldown_is_rejected_before_victory() {
    let (mut state, rules) = archipelago();
    state.player.has_weapon = true;
    state.weapon.collected = true;
    state.boss.health = 120;
    state.player.position = state.boss.position + FixedVec2::from_ints(-40, 0);

    let mut input = InputState::new();
    let mut hits = 0;
    while hits < 5 {
        let result = tick(&mut state, press_attack(&mut input), FRAME, &rules);
        if result.attack.is_some_and(|o| o.is_hit()) {
            hits += 1;
        }
    }
    assert_eq!(state.boss.health, 20);

    let result = tick(&mut state, press_attack(&mut input), FRAME, &rules);
    assert_eq!(result.attack, Some(AttackOutcome::CoolingDown { ticks_left: 29 }));
    assert_eq!(state.boss.health, 20);
}

#[test]
fn attack_out_of_range_is_rejected() {
    let (mut state, rules) = archipelago();
    state.player.has_weapon = true;
    state.weapon.collected = true;
    state.player.position = state.boss.position + FixedVec2::from_ints(-61, 0);

    let mut input = InputState::new();
    for _ in 0..60 {
        let result = tick(&mut state, press_attack(&mut input), FRAME, &rules);
        assert_eq!(result.attack, Some(AttackOutcome::OutOfRange));
    }
    assert_eq!(state.boss.health, state.boss.max_health);
    assert_eq!(state.attack_cooldown, 0);
}

#[test]
fn restart_after_victory_resets_the_round() {
    let (mut state, rules) = archipelago();
    state.player.has_weapon = true;
    state.weapon.collected = true;
    state.player.position = state.boss.position;
    state.boss.health = 20;

    let result = tick(&mut state, InputFrame::with_keys(&[Key::Attack]), FRAME, &rules);
    assert!(result.won);

    assert!(state.restart(&rules));
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.boss.health, rules.boss_max_health);
    assert!(!state.weapon.collected);
    assert!(!state.player.has_weapon);
    assert_eq!(state.player.position, rules.player_spawn);

    let result = tick(&mut state, InputFrame::new(), FRAME, &rules);
    assert!(!result.won);
    assert!(result.events.iter().any(|e| matches!(
        e.data,
        GameEventData::PhaseChanged { from: GamePhase::Won, to: GamePhase::Playing }
    )));
}

#[test]
fn walking_onto_the_weapon_collects_it_once() {
    let (mut state, rules) = archipelago();
    state.player.position = state.weapon.position + FixedVec2::from_ints(-60, 0);
    let right = InputFrame::with_keys(&[Key::Right]);

    let mut pickups = 0;
    for _ in 0..60 {
        let result = tick(&mut state, right, FRAME, &rules);
        pickups += result
            .events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::WeaponCollected { .. }))
            .count();
    }

    assert_eq!(pickups, 1);
    assert!(state.player.has_weapon);
    assert!(state.weapon.collected);
}

#[test]
fn classic_contact_damage_wins_in_ten_hits() {
    let rules = GameConfig::classic().rules().unwrap();
    let mut state = SessionState::new(&rules, 77).unwrap();
    state.start();
    state.player.has_weapon = true;
    state.weapon.collected = true;
    state.player.position = state.boss.position + FixedVec2::from_ints(-30, 0);

    // 0.5 s per hit, 100 health, 10 per hit
    let mut ticks = 0;
    while !state.is_won() && ticks < 1_000 {
        tick(&mut state, InputFrame::new(), Duration::from_millis(100), &rules);
        ticks += 1;
    }

    assert!(state.is_won());
    assert_eq!(state.boss.health, 0);
    // First hit on tick 1, then every 5th tick
    assert_eq!(ticks, 46);
}

#[test]
fn identical_recordings_replay_identically_across_presets() {
    for config in [GameConfig::classic(), GameConfig::large_island(), GameConfig::archipelago()] {
        let rules = config.rules().unwrap();
        let frames: Vec<RecordedFrame> = (0..240u32)
            .map(|t| RecordedFrame {
                frame: InputFrame { flags: (t * 7 % 32) as u8 },
                dt: Duration::from_micros(16_000 + (t % 5) as u64 * 300),
            })
            .collect();

        let (a, events_a) = replay_session(SessionState::new(&rules, 31).unwrap(), &frames, &rules);
        let (b, events_b) = replay_session(SessionState::new(&rules, 31).unwrap(), &frames, &rules);

        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(events_a, events_b);
    }
}
