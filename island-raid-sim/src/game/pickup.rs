//! Weapon Pickup
//!
//! The weapon is collected once, the first tick the player reaches it.

use tracing::info;

use crate::core::fixed::Fixed;
use crate::game::collision::boxes_overlap;
use crate::game::events::GameEvent;
use crate::game::state::{PlayerState, SessionState, WeaponState};

/// Compiled pickup policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupRule {
    /// Positions strictly closer than `radius`
    Distance {
        /// Pickup distance
        radius: Fixed,
    },
    /// Bounding boxes overlap
    Overlap,
}

/// Is the player close enough to take the weapon?
pub fn reaches_weapon(player: &PlayerState, weapon: &WeaponState, rule: PickupRule) -> bool {
    match rule {
        PickupRule::Distance { radius } => player.position.within_distance(weapon.position, radius),
        PickupRule::Overlap => {
            boxes_overlap(player.position, player.size, weapon.position, weapon.size)
        }
    }
}

/// Collect the weapon if it is still on the map and within reach.
///
/// Returns true on the tick the weapon changes hands.
pub fn try_collect_weapon(state: &mut SessionState, rule: PickupRule) -> bool {
    if state.weapon.collected || state.player.has_weapon {
        return false;
    }
    if !reaches_weapon(&state.player, &state.weapon, rule) {
        return false;
    }

    state.weapon.collected = true;
    state.player.has_weapon = true;

    let event = GameEvent::weapon_collected(state.tick, state.weapon.position);
    state.push_event(event);
    info!(tick = state.tick, position = %state.player.position, "Weapon collected");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;
    use crate::core::vec2::FixedVec2;

    fn player_at(x: i32, y: i32) -> PlayerState {
        PlayerState::new(FixedVec2::from_ints(x, y), FixedVec2::from_ints(24, 24), from_int(3))
    }

    fn weapon() -> WeaponState {
        WeaponState::new(FixedVec2::from_ints(400, 200), FixedVec2::from_ints(16, 16))
    }

    #[test]
    fn test_distance_pickup_is_strict() {
        let rule = PickupRule::Distance { radius: from_int(30) };

        assert!(reaches_weapon(&player_at(371, 200), &weapon(), rule));
        assert!(!reaches_weapon(&player_at(370, 200), &weapon(), rule));
        // 18-24-30 triangle
        assert!(!reaches_weapon(&player_at(382, 224), &weapon(), rule));
    }

    #[test]
    fn test_overlap_pickup() {
        let rule = PickupRule::Overlap;

        assert!(reaches_weapon(&player_at(380, 190), &weapon(), rule));
        // Touching the left edge only
        assert!(!reaches_weapon(&player_at(376, 200), &weapon(), rule));
        assert!(reaches_weapon(&player_at(377, 200), &weapon(), rule));
    }
}
