//! Action resolution with a Resolution/Effect pipeline.
//!
//! Performing an action runs in three steps:
//! 1. `ActionResolver::resolve` checks preconditions and rolls the outcome
//!    against a read-only view of the player
//! 2. The outcome is expressed as a list of `Effect`s (the state delta)
//! 3. `apply_effects` mutates the player, then the level-up check runs
//!
//! Keeping the roll separate from the mutation means a rejected action can
//! never have touched player state.

use crate::actions::{ActionCatalog, ActionDefinition, ActionId, ApRule};
use crate::dice;
use crate::player::Player;
use crate::progression::{check_level_up, LevelUp, ProgressionConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Share of a failed action's would-be rewards paid out anyway.
pub const PITY_FACTOR: f64 = 0.2;

/// Why an action was refused. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionRejection {
    #[error("You're not tired yet ({action_points} AP left, rest at {threshold} or less).")]
    NotTired { action_points: u32, threshold: u32 },

    #[error("Out of action points: need {needed}, have {available}.")]
    OutOfActionPoints { needed: u32, available: u32 },

    #[error("Not ready yet: {remaining}s left on the timer.")]
    TimerNotReady { remaining: i64 },
}

/// A concrete change to the player's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    ExperienceGained { amount: u64 },
    MoneyGained { amount: u64 },
    TimerSet { seconds: i64 },
    ActionPointsSpent { amount: u32 },
    ActionPointsRestored { value: u32 },
    BuffConsumed { source: String },
}

/// The rolled result of an action, before it is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub action: ActionId,
    pub success: bool,
    pub messages: Vec<String>,
    pub effects: Vec<Effect>,
}

impl Resolution {
    fn new(action: ActionId, success: bool) -> Self {
        Self {
            action,
            success,
            messages: Vec::new(),
            effects: Vec::new(),
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// What performing an action did.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub action: ActionId,
    pub success: bool,
    pub messages: Vec<String>,
    /// The effects that were applied.
    pub effects: Vec<Effect>,
    pub level_ups: Vec<LevelUp>,
}

impl ActionOutcome {
    pub fn xp_gained(&self) -> u64 {
        self.effects
            .iter()
            .map(|e| match e {
                Effect::ExperienceGained { amount } => *amount,
                _ => 0,
            })
            .sum()
    }

    pub fn money_gained(&self) -> u64 {
        self.effects
            .iter()
            .map(|e| match e {
                Effect::MoneyGained { amount } => *amount,
                _ => 0,
            })
            .sum()
    }
}

/// Resolves life actions against a catalog.
#[derive(Debug, Clone)]
pub struct ActionResolver {
    catalog: ActionCatalog,
    progression: ProgressionConfig,
}

impl ActionResolver {
    pub fn new() -> Self {
        Self {
            catalog: ActionCatalog::standard(),
            progression: ProgressionConfig::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: ActionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_progression(mut self, progression: ProgressionConfig) -> Self {
        self.progression = progression;
        self
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn progression(&self) -> &ProgressionConfig {
        &self.progression
    }

    /// Check preconditions in order: sleep gate, AP, timer.
    pub fn check(&self, player: &Player, action: ActionId) -> Result<(), ActionRejection> {
        let definition = self.catalog.get(action);

        if let ApRule::Restore { max_before, .. } = definition.ap {
            if player.action_points > max_before {
                return Err(ActionRejection::NotTired {
                    action_points: player.action_points,
                    threshold: max_before,
                });
            }
        }

        let cost = definition.ap_cost();
        if player.action_points < cost {
            return Err(ActionRejection::OutOfActionPoints {
                needed: cost,
                available: player.action_points,
            });
        }

        if player.timer >= 1 {
            return Err(ActionRejection::TimerNotReady {
                remaining: player.timer,
            });
        }

        Ok(())
    }

    /// Roll an action and produce its effects without applying them.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        player: &Player,
        action: ActionId,
        rng: &mut R,
    ) -> Result<Resolution, ActionRejection> {
        self.check(player, action)?;
        let definition = self.catalog.get(action);

        let success = if definition.can_fail() {
            dice::roll_unit(rng) <= definition.success_chance(player)
        } else {
            true
        };

        let xp_gain = (definition.xp as f64 * player.base_xp_multiplier).round() as u64;
        let buff_reduction = player
            .active_action_buff
            .as_ref()
            .map(|b| b.timer_reduction as i64)
            .unwrap_or(0);

        let mut resolution = if success {
            self.resolve_success(player, definition, xp_gain, buff_reduction)
        } else {
            self.resolve_failure(player, definition, xp_gain, buff_reduction)
        };

        resolution = match definition.ap {
            ApRule::Cost(amount) => resolution.with_effect(Effect::ActionPointsSpent { amount }),
            ApRule::Restore { restore_to, .. } => {
                resolution.with_effect(Effect::ActionPointsRestored { value: restore_to })
            }
        };

        if let Some(buff) = &player.active_action_buff {
            resolution = resolution.with_effect(Effect::BuffConsumed {
                source: buff.source.clone(),
            });
        }

        Ok(resolution)
    }

    fn resolve_success(
        &self,
        player: &Player,
        definition: &ActionDefinition,
        xp_gain: u64,
        buff_reduction: i64,
    ) -> Resolution {
        let timer = (definition.effective_timer_reset(player) - buff_reduction).max(0);

        let mut resolution = Resolution::new(definition.id, true)
            .with_message(definition.success_message.clone())
            .with_effect(Effect::TimerSet { seconds: timer });

        if xp_gain > 0 {
            resolution = resolution.with_effect(Effect::ExperienceGained { amount: xp_gain });
        }
        if definition.money > 0 {
            resolution = resolution.with_effect(Effect::MoneyGained {
                amount: definition.money,
            });
        }
        if let Some(line) = reward_line(xp_gain, definition.money) {
            resolution = resolution.with_message(line);
        }

        resolution
    }

    fn resolve_failure(
        &self,
        player: &Player,
        definition: &ActionDefinition,
        xp_gain: u64,
        buff_reduction: i64,
    ) -> Resolution {
        let capped = (player.timer + definition.effective_timer_penalty(player))
            .min(definition.effective_timer_reset(player));
        let timer = (capped - buff_reduction).max(0);

        let pity_xp = (xp_gain as f64 * PITY_FACTOR).floor() as u64;
        let pity_money = (definition.money as f64 * PITY_FACTOR).floor() as u64;

        let failure = definition
            .failure_message
            .clone()
            .unwrap_or_else(|| format!("{} failed.", definition.id));
        let message = match reward_line(pity_xp, pity_money) {
            Some(line) => format!("{failure} Consolation: {line}"),
            None => failure,
        };

        let mut resolution = Resolution::new(definition.id, false)
            .with_message(message)
            .with_effect(Effect::TimerSet { seconds: timer });

        if pity_xp > 0 {
            resolution = resolution.with_effect(Effect::ExperienceGained { amount: pity_xp });
        }
        if pity_money > 0 {
            resolution = resolution.with_effect(Effect::MoneyGained { amount: pity_money });
        }

        resolution
    }

    /// Resolve an action, apply it to the player, and run the level-up check.
    pub fn perform<R: Rng + ?Sized>(
        &self,
        player: &mut Player,
        action: ActionId,
        rng: &mut R,
    ) -> Result<ActionOutcome, ActionRejection> {
        let resolution = match self.resolve(player, action, rng) {
            Ok(resolution) => resolution,
            Err(rejection) => {
                tracing::debug!(
                    target: "lifequest::action",
                    %action,
                    %rejection,
                    "Action rejected"
                );
                return Err(rejection);
            }
        };

        apply_effects(player, &resolution.effects);
        let level_ups = check_level_up(player, &self.progression);

        tracing::info!(
            target: "lifequest::action",
            %action,
            success = resolution.success,
            timer = player.timer,
            ap = player.action_points,
            xp = player.current_xp,
            "Action resolved"
        );

        Ok(ActionOutcome {
            action,
            success: resolution.success,
            messages: resolution.messages,
            effects: resolution.effects,
            level_ups,
        })
    }
}

impl Default for ActionResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Perform an action with the standard catalog and progression curve.
pub fn perform_action<R: Rng + ?Sized>(
    action: ActionId,
    player: &mut Player,
    rng: &mut R,
) -> Result<ActionOutcome, ActionRejection> {
    ActionResolver::new().perform(player, action, rng)
}

fn reward_line(xp: u64, money: u64) -> Option<String> {
    match (xp, money) {
        (0, 0) => None,
        (xp, 0) => Some(format!("+{xp} XP")),
        (0, money) => Some(format!("+{money} gold")),
        (xp, money) => Some(format!("+{xp} XP, +{money} gold")),
    }
}

/// Apply effects to the player.
pub fn apply_effects(player: &mut Player, effects: &[Effect]) {
    for effect in effects {
        apply_effect(player, effect);
    }
}

/// Apply a single effect to the player.
pub fn apply_effect(player: &mut Player, effect: &Effect) {
    match effect {
        Effect::ExperienceGained { amount } => player.current_xp += amount,
        Effect::MoneyGained { amount } => player.player_money += amount,
        Effect::TimerSet { seconds } => player.timer = *seconds,
        Effect::ActionPointsSpent { amount } => {
            player.action_points = player.action_points.saturating_sub(*amount);
        }
        Effect::ActionPointsRestored { value } => player.action_points = *value,
        Effect::BuffConsumed { .. } => player.active_action_buff = None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{ActionBuff, Upgrade};
    use crate::testing::{ready_player, ScriptedRng};

    const PASS: f64 = 0.0;
    const FAIL: f64 = 0.99;

    #[test]
    fn test_success_awards_and_sets_timer() {
        let mut player = ready_player();
        let mut rng = ScriptedRng::new([PASS]);

        let outcome = perform_action(ActionId::CleanRoom, &mut player, &mut rng).unwrap();
        assert!(outcome.success);
        assert_eq!(player.current_xp, 10);
        assert_eq!(player.player_money, 5);
        assert_eq!(player.timer, 10);
        assert_eq!(player.action_points, 9);
        assert_eq!(outcome.xp_gained(), 10);
        assert!(outcome.messages.iter().any(|m| m.contains("+10 XP, +5 gold")));
    }

    #[test]
    fn test_xp_uses_multiplier() {
        let mut player = ready_player();
        player.base_xp_multiplier = 1.16;
        let mut rng = ScriptedRng::new([PASS]);

        perform_action(ActionId::Exercise, &mut player, &mut rng).unwrap();
        // round(25 * 1.16) = 29
        assert_eq!(player.current_xp, 29);
    }

    #[test]
    fn test_failure_applies_penalty_and_pity() {
        let mut player = ready_player();
        let mut rng = ScriptedRng::new([FAIL]);

        let outcome = perform_action(ActionId::PracticeCoding, &mut player, &mut rng).unwrap();
        assert!(!outcome.success);
        // min(35, 0 + 15) = 15
        assert_eq!(player.timer, 15);
        // floor(35 * 0.2) = 7, floor(20 * 0.2) = 4
        assert_eq!(player.current_xp, 7);
        assert_eq!(player.player_money, 4);
        assert_eq!(player.action_points, 7);
        assert!(outcome.messages[0].contains("Consolation: +7 XP, +4 gold"));
    }

    #[test]
    fn test_failure_without_pity_has_plain_message() {
        let mut player = ready_player();
        let mut rng = ScriptedRng::new([FAIL]);

        let outcome = perform_action(ActionId::PlayGame, &mut player, &mut rng).unwrap();
        // floor(5 * 0.2) = 1 XP, so the consolation is present
        assert!(outcome.messages[0].contains("+1 XP"));

        let def = ActionDefinition::new(ActionId::TakeWalk, 4, 12, 5)
            .with_messages("ok", "nope");
        let catalog = ActionCatalog::from_definitions(
            ActionCatalog::standard()
                .iter()
                .filter(|d| d.id != ActionId::TakeWalk)
                .cloned()
                .chain([def]),
        )
        .unwrap();
        let resolver = ActionResolver::new().with_catalog(catalog);
        let mut player = ready_player();
        let mut rng = ScriptedRng::new([FAIL]);
        let outcome = resolver.perform(&mut player, ActionId::TakeWalk, &mut rng).unwrap();
        assert_eq!(outcome.messages, vec!["nope".to_string()]);
        assert_eq!(player.current_xp, 0);
    }

    #[test]
    fn test_failure_timer_capped_at_reset() {
        let mut player = ready_player();
        player.timer = 0;
        let def = ActionId::CookMeal.standard_definition();
        let catalog = ActionCatalog::from_definitions(
            ActionCatalog::standard()
                .iter()
                .filter(|d| d.id != ActionId::CookMeal)
                .cloned()
                .chain([ActionDefinition { timer_penalty: 40, ..def }]),
        )
        .unwrap();
        let resolver = ActionResolver::new().with_catalog(catalog);
        let mut rng = ScriptedRng::new([FAIL]);

        resolver.perform(&mut player, ActionId::CookMeal, &mut rng).unwrap();
        assert_eq!(player.timer, 15);
    }

    #[test]
    fn test_buff_reduces_timer_and_is_consumed() {
        let mut player = ready_player();
        player.active_action_buff = Some(ActionBuff::new("Snack", 3));
        let mut rng = ScriptedRng::new([PASS]);

        let outcome = perform_action(ActionId::Meditate, &mut player, &mut rng).unwrap();
        assert_eq!(player.timer, 17);
        assert!(player.active_action_buff.is_none());
        assert!(outcome
            .effects
            .iter()
            .any(|e| matches!(e, Effect::BuffConsumed { source } if source == "Snack")));
    }

    #[test]
    fn test_buff_applies_on_failure_too() {
        let mut player = ready_player();
        player.active_action_buff = Some(ActionBuff::new("Snack", 3));
        let mut rng = ScriptedRng::new([FAIL]);

        perform_action(ActionId::Exercise, &mut player, &mut rng).unwrap();
        // min(25, 0 + 10) - 3
        assert_eq!(player.timer, 7);
        assert!(player.active_action_buff.is_none());
    }

    #[test]
    fn test_buff_success_bonus_shifts_roll() {
        let mut player = ready_player();
        player.active_action_buff =
            Some(ActionBuff::new("Clarity Draught", 0).with_success_bonus(0.15));
        // studyExam base chance is 0.5; 0.6 passes only with the bonus.
        let mut rng = ScriptedRng::new([0.6]);
        let outcome = perform_action(ActionId::StudyExam, &mut player, &mut rng).unwrap();
        assert!(outcome.success);
    }

    #[test]
    fn test_upgrades_shorten_timers() {
        let mut player = ready_player();
        player.upgrades.insert(Upgrade::TimeManagement);
        let mut rng = ScriptedRng::new([PASS]);

        perform_action(ActionId::CleanRoom, &mut player, &mut rng).unwrap();
        assert_eq!(player.timer, 8);
    }

    #[test]
    fn test_timer_not_ready_rejects_without_mutation() {
        let mut player = ready_player();
        player.timer = 1;
        let before = player.clone();
        let mut rng = ScriptedRng::new([PASS]);

        for action in ActionId::all() {
            if action == ActionId::Sleep {
                continue;
            }
            let err = perform_action(action, &mut player, &mut rng).unwrap_err();
            assert_eq!(err, ActionRejection::TimerNotReady { remaining: 1 });
        }
        assert_eq!(player, before);
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn test_out_of_action_points() {
        let mut player = ready_player();
        player.action_points = 2;
        let mut rng = ScriptedRng::new([PASS]);

        let err = perform_action(ActionId::StudyExam, &mut player, &mut rng).unwrap_err();
        assert_eq!(
            err,
            ActionRejection::OutOfActionPoints {
                needed: 3,
                available: 2
            }
        );
        assert_eq!(err.to_string(), "Out of action points: need 3, have 2.");
    }

    #[test]
    fn test_sleep_requires_tiredness() {
        let mut player = ready_player();
        let mut rng = ScriptedRng::new([]);
        let err = perform_action(ActionId::Sleep, &mut player, &mut rng).unwrap_err();
        assert!(matches!(err, ActionRejection::NotTired { .. }));
    }

    #[test]
    fn test_sleep_gate_checked_before_timer() {
        let mut player = ready_player();
        player.timer = 5;
        let mut rng = ScriptedRng::new([]);
        let err = perform_action(ActionId::Sleep, &mut player, &mut rng).unwrap_err();
        assert!(matches!(err, ActionRejection::NotTired { .. }));
    }

    #[test]
    fn test_sleep_restores_without_roll() {
        let mut player = ready_player();
        player.action_points = 1;
        // A failing draw would matter only if sleep rolled.
        let mut rng = ScriptedRng::new([FAIL]);

        let outcome = perform_action(ActionId::Sleep, &mut player, &mut rng).unwrap();
        assert!(outcome.success);
        assert_eq!(player.action_points, 10);
        assert_eq!(player.timer, 30);
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn test_level_up_triggered_after_action() {
        let mut player = ready_player();
        player.current_xp = 95;
        let mut rng = ScriptedRng::new([PASS]);

        let outcome = perform_action(ActionId::CleanRoom, &mut player, &mut rng).unwrap();
        assert_eq!(outcome.level_ups.len(), 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.current_xp, 5);
        // 10 - 1 + 2 level bonus
        assert_eq!(player.action_points, 11);
    }

    #[test]
    fn test_resolve_does_not_mutate() {
        let player = ready_player();
        let resolver = ActionResolver::new();
        let mut rng = ScriptedRng::new([PASS]);

        let resolution = resolver
            .resolve(&player, ActionId::WashDishes, &mut rng)
            .unwrap();
        assert!(resolution.success);
        assert_eq!(player, ready_player());
        assert!(resolution
            .effects
            .contains(&Effect::TimerSet { seconds: 8 }));
    }
}
