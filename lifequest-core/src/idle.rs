//! Idle scheduler: the once-per-second heartbeat.
//!
//! The driver calls [`tick`] every second. A tick counts the cooldown down
//! and, once it runs out, either tells the caller an action is ready or (with
//! idle mode on) picks and performs one by itself.

use crate::actions::{ActionDefinition, ActionId, SLEEP_AP_THRESHOLD};
use crate::dice;
use crate::player::Player;
use crate::progression::{check_level_up, LevelUp};
use crate::rules::{ActionOutcome, ActionRejection, ActionResolver};
use rand::Rng;

/// Floor for a candidate's weight so cheap-but-slow actions still get picked.
pub const MIN_WEIGHT: f64 = 0.1;

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Still cooling down.
    Waiting { remaining: i64 },
    /// Cooldown over and idle mode is off; the player should act.
    Ready { level_ups: Vec<LevelUp> },
    /// Idle mode performed an action (possibly a forced sleep).
    Acted(ActionOutcome),
    /// Idle mode found no eligible action the player can pay for.
    NothingAffordable,
    /// Idle mode picked an action but the resolver refused it.
    Rejected {
        action: ActionId,
        rejection: ActionRejection,
    },
}

/// Advance the game by one second.
pub fn tick<R: Rng + ?Sized>(
    player: &mut Player,
    resolver: &ActionResolver,
    idle_enabled: bool,
    rng: &mut R,
) -> TickOutcome {
    if player.timer > 0 {
        player.timer -= 1;
    }
    let level_ups = check_level_up(player, resolver.progression());

    if player.timer > 0 {
        return TickOutcome::Waiting {
            remaining: player.timer,
        };
    }

    if !idle_enabled {
        return TickOutcome::Ready { level_ups };
    }

    let action = if player.action_points <= SLEEP_AP_THRESHOLD {
        tracing::debug!(target: "lifequest::idle", ap = player.action_points, "Forcing sleep");
        ActionId::Sleep
    } else {
        match choose_action(player, resolver, rng) {
            Some(action) => action,
            None => {
                tracing::debug!(
                    target: "lifequest::idle",
                    ap = player.action_points,
                    "Nothing affordable"
                );
                return TickOutcome::NothingAffordable;
            }
        }
    };

    match resolver.perform(player, action, rng) {
        Ok(outcome) => {
            tracing::info!(
                target: "lifequest::idle",
                %action,
                success = outcome.success,
                "Idle action"
            );
            TickOutcome::Acted(outcome)
        }
        Err(rejection) => {
            tracing::warn!(target: "lifequest::idle", %action, %rejection, "Idle action rejected");
            TickOutcome::Rejected { action, rejection }
        }
    }
}

/// Weight of one candidate: XP per second of cooldown per AP spent.
pub fn action_weight(definition: &ActionDefinition, player: &Player) -> f64 {
    let reset = definition.effective_timer_reset(player).max(1) as f64;
    let cost = definition.ap_cost().max(1) as f64;
    ((definition.xp as f64 / reset) / cost).max(MIN_WEIGHT)
}

/// Idle-eligible actions the player can currently pay for, in catalog order.
pub fn candidates<'a>(player: &Player, resolver: &'a ActionResolver) -> Vec<&'a ActionDefinition> {
    resolver
        .catalog()
        .iter()
        .filter(|d| d.idle_eligible && d.ap_cost() <= player.action_points)
        .collect()
}

/// Weighted random choice among the candidates. Consumes one draw when
/// there is at least one candidate.
pub fn choose_action<R: Rng + ?Sized>(
    player: &Player,
    resolver: &ActionResolver,
    rng: &mut R,
) -> Option<ActionId> {
    let candidates = candidates(player, resolver);
    let last = candidates.last()?;

    let weights: Vec<f64> = candidates.iter().map(|d| action_weight(d, player)).collect();
    let total: f64 = weights.iter().sum();
    let mut remainder = dice::uniform(rng, 0.0, total);

    for (definition, weight) in candidates.iter().zip(&weights) {
        remainder -= weight;
        if remainder <= 0.0 {
            return Some(definition.id);
        }
    }
    Some(last.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ready_player, ScriptedRng};

    #[test]
    fn test_counts_down() {
        let mut player = ready_player();
        player.timer = 3;
        let resolver = ActionResolver::new();
        let mut rng = ScriptedRng::new([]);

        assert_eq!(
            tick(&mut player, &resolver, true, &mut rng),
            TickOutcome::Waiting { remaining: 2 }
        );
        assert_eq!(player.timer, 2);
    }

    #[test]
    fn test_ready_when_idle_off() {
        let mut player = ready_player();
        player.timer = 1;
        let resolver = ActionResolver::new();
        let mut rng = ScriptedRng::new([]);

        let outcome = tick(&mut player, &resolver, false, &mut rng);
        assert_eq!(outcome, TickOutcome::Ready { level_ups: vec![] });
        // Fires again on the next tick while nothing happens.
        let outcome = tick(&mut player, &resolver, false, &mut rng);
        assert_eq!(outcome, TickOutcome::Ready { level_ups: vec![] });
        assert_eq!(player.timer, 0);
    }

    #[test]
    fn test_negative_timer_counts_as_ready() {
        let mut player = ready_player();
        player.timer = -4;
        let resolver = ActionResolver::new();
        let mut rng = ScriptedRng::new([]);

        let outcome = tick(&mut player, &resolver, false, &mut rng);
        assert!(matches!(outcome, TickOutcome::Ready { .. }));
    }

    #[test]
    fn test_forces_sleep_when_tired() {
        let mut player = ready_player();
        player.action_points = 2;
        let resolver = ActionResolver::new();
        let mut rng = ScriptedRng::new([]);

        match tick(&mut player, &resolver, true, &mut rng) {
            TickOutcome::Acted(outcome) => assert_eq!(outcome.action, ActionId::Sleep),
            other => panic!("expected sleep, got {other:?}"),
        }
        assert_eq!(player.action_points, 10);
        assert_eq!(player.timer, 30);
    }

    #[test]
    fn test_weights_follow_formula() {
        let player = ready_player();
        let study = ActionId::StudyExam.standard_definition();
        // (30 / 30) / 3
        assert!((action_weight(&study, &player) - 1.0 / 3.0).abs() < 1e-12);

        let sleep = ActionId::Sleep.standard_definition();
        assert_eq!(action_weight(&sleep, &player), MIN_WEIGHT);
    }

    #[test]
    fn test_candidates_exclude_unaffordable_and_ineligible() {
        let mut player = ready_player();
        player.action_points = 1;
        let resolver = ActionResolver::new();

        let ids: Vec<ActionId> = candidates(&player, &resolver).iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec![ActionId::CleanRoom, ActionId::WashDishes, ActionId::TakeWalk]
        );
    }

    #[test]
    fn test_weighted_choice_walks_catalog_order() {
        let mut player = ready_player();
        player.action_points = 1;
        let resolver = ActionResolver::new();
        // All three candidates weigh exactly 1.0, total 3.0.
        let mut rng = ScriptedRng::new([0.0, 0.5, 0.99]);

        assert_eq!(
            choose_action(&player, &resolver, &mut rng),
            Some(ActionId::CleanRoom)
        );
        assert_eq!(
            choose_action(&player, &resolver, &mut rng),
            Some(ActionId::WashDishes)
        );
        assert_eq!(
            choose_action(&player, &resolver, &mut rng),
            Some(ActionId::TakeWalk)
        );
    }

    #[test]
    fn test_nothing_affordable() {
        let mut player = ready_player();
        player.action_points = 0;
        let resolver = ActionResolver::new();
        assert_eq!(choose_action(&player, &resolver, &mut ScriptedRng::new([])), None);
    }

    #[test]
    fn test_idle_acts_and_resolves() {
        let mut player = ready_player();
        player.action_points = 3;
        let resolver = ActionResolver::new();
        // First draw picks, second rolls success.
        let mut rng = ScriptedRng::new([0.0, 0.0]);

        match tick(&mut player, &resolver, true, &mut rng) {
            TickOutcome::Acted(outcome) => {
                assert_eq!(outcome.action, ActionId::CleanRoom);
                assert!(outcome.success);
            }
            other => panic!("expected an action, got {other:?}"),
        }
        assert_eq!(player.timer, 10);
        assert_eq!(player.action_points, 2);
        assert_eq!(rng.remaining(), 0);
    }
}
