//! Life action definitions.
//!
//! Every action the player can take is keyed by [`ActionId`] and described by
//! a fixed-shape [`ActionDefinition`]. The standard table is an exhaustive
//! match, so it can never miss an action; catalogs loaded from JSON are
//! validated for completeness when they are built.

use crate::player::Player;
use crate::progression::timer_scale;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// AP threshold at or below which sleep is allowed (and forced when idle).
pub const SLEEP_AP_THRESHOLD: u32 = 2;

/// Errors building an action catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Action catalog is missing a definition for {0}")]
    Missing(ActionId),

    #[error("Action catalog defines {0} more than once")]
    Duplicate(ActionId),

    #[error("Invalid action catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable identifiers for every life action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionId {
    CleanRoom,
    WashDishes,
    CookMeal,
    StudyExam,
    PracticeCoding,
    TakeWalk,
    Meditate,
    Exercise,
    PlayGame,
    Sleep,
}

impl ActionId {
    pub fn all() -> [ActionId; 10] {
        [
            ActionId::CleanRoom,
            ActionId::WashDishes,
            ActionId::CookMeal,
            ActionId::StudyExam,
            ActionId::PracticeCoding,
            ActionId::TakeWalk,
            ActionId::Meditate,
            ActionId::Exercise,
            ActionId::PlayGame,
            ActionId::Sleep,
        ]
    }

    /// The identifier used on the invocation surface.
    pub fn key(&self) -> &'static str {
        match self {
            ActionId::CleanRoom => "cleanRoom",
            ActionId::WashDishes => "washDishes",
            ActionId::CookMeal => "cookMeal",
            ActionId::StudyExam => "studyExam",
            ActionId::PracticeCoding => "practiceCoding",
            ActionId::TakeWalk => "takeWalk",
            ActionId::Meditate => "meditate",
            ActionId::Exercise => "exercise",
            ActionId::PlayGame => "playGame",
            ActionId::Sleep => "sleep",
        }
    }

    /// The built-in definition for this action.
    pub fn standard_definition(&self) -> ActionDefinition {
        match self {
            ActionId::CleanRoom => ActionDefinition::new(*self, 10, 10, 5)
                .with_money(5)
                .with_ap_cost(1)
                .with_success_modifier(0.10)
                .with_messages("Your room sparkles.", "You shuffled clutter around instead."),
            ActionId::WashDishes => ActionDefinition::new(*self, 8, 8, 4)
                .with_money(4)
                .with_ap_cost(1)
                .with_success_modifier(0.15)
                .with_messages("The sink is empty at last.", "A plate slipped and shattered."),
            ActionId::CookMeal => ActionDefinition::new(*self, 15, 15, 6)
                .with_ap_cost(2)
                .with_messages("A warm meal, made from scratch.", "Burnt. Takeout it is."),
            ActionId::StudyExam => ActionDefinition::new(*self, 30, 30, 15)
                .with_ap_cost(3)
                .with_success_modifier(-0.20)
                .with_messages(
                    "The material finally clicks.",
                    "You read the same page five times.",
                ),
            ActionId::PracticeCoding => ActionDefinition::new(*self, 35, 35, 15)
                .with_money(20)
                .with_ap_cost(3)
                .with_success_modifier(-0.25)
                .with_messages(
                    "Tests pass and a freelance gig pays out.",
                    "The bug won this round.",
                ),
            ActionId::TakeWalk => ActionDefinition::new(*self, 12, 12, 5)
                .with_ap_cost(1)
                .with_success_modifier(0.20)
                .with_messages("Fresh air clears your head.", "It started raining halfway."),
            ActionId::Meditate => ActionDefinition::new(*self, 18, 20, 8)
                .with_ap_cost(2)
                .with_success_modifier(0.05)
                .with_messages("Calm settles in.", "Your thoughts kept wandering."),
            ActionId::Exercise => ActionDefinition::new(*self, 25, 25, 10)
                .with_ap_cost(2)
                .with_success_modifier(-0.10)
                .with_messages("You feel stronger already.", "You pulled a muscle warming up."),
            ActionId::PlayGame => ActionDefinition::new(*self, 5, 8, 3)
                .with_ap_cost(1)
                .with_success_modifier(0.25)
                .with_messages("A well-earned victory.", "Rage quit.")
                .not_idle(),
            ActionId::Sleep => ActionDefinition::new(*self, 0, 30, 0)
                .with_ap_rule(ApRule::Restore {
                    restore_to: 10,
                    max_before: SLEEP_AP_THRESHOLD,
                })
                .with_success_message("You wake up rested.")
                .not_idle(),
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ActionId {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionId::all()
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// An identifier that names no action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

/// How an action interacts with the AP pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApRule {
    /// Spend this many points.
    Cost(u32),
    /// Only allowed at or below `max_before` points; sets the pool to
    /// `restore_to`.
    Restore { restore_to: u32, max_before: u32 },
}

/// Fixed-shape definition of one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub id: ActionId,
    /// XP before the player's multiplier.
    pub xp: u64,
    pub money: u64,
    /// Seconds the timer is set to on success. Required for every action.
    pub timer_reset: u32,
    /// Seconds added to the timer on failure.
    pub timer_penalty: u32,
    pub ap: ApRule,
    /// Added to the player's base success rate.
    pub success_modifier: f64,
    pub success_message: String,
    /// `None` means the action cannot fail.
    pub failure_message: Option<String>,
    /// Whether the idle scheduler may pick this action on its own.
    pub idle_eligible: bool,
}

impl ActionDefinition {
    /// A definition with the given core numbers and neutral defaults:
    /// no money, 1 AP, no modifier, idle-eligible, cannot fail.
    pub fn new(id: ActionId, xp: u64, timer_reset: u32, timer_penalty: u32) -> Self {
        Self {
            id,
            xp,
            money: 0,
            timer_reset,
            timer_penalty,
            ap: ApRule::Cost(1),
            success_modifier: 0.0,
            success_message: format!("{id} done."),
            failure_message: None,
            idle_eligible: true,
        }
    }

    pub fn with_money(mut self, money: u64) -> Self {
        self.money = money;
        self
    }

    pub fn with_ap_cost(mut self, cost: u32) -> Self {
        self.ap = ApRule::Cost(cost);
        self
    }

    pub fn with_ap_rule(mut self, rule: ApRule) -> Self {
        self.ap = rule;
        self
    }

    pub fn with_success_modifier(mut self, modifier: f64) -> Self {
        self.success_modifier = modifier;
        self
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    pub fn with_messages(mut self, success: impl Into<String>, failure: impl Into<String>) -> Self {
        self.success_message = success.into();
        self.failure_message = Some(failure.into());
        self
    }

    pub fn not_idle(mut self) -> Self {
        self.idle_eligible = false;
        self
    }

    pub fn can_fail(&self) -> bool {
        self.failure_message.is_some()
    }

    /// AP spent by this action; zero for restoring actions.
    pub fn ap_cost(&self) -> u32 {
        match self.ap {
            ApRule::Cost(cost) => cost,
            ApRule::Restore { .. } => 0,
        }
    }

    /// Success probability for a player, clamped to `[0, 1]`.
    pub fn success_chance(&self, player: &Player) -> f64 {
        let buff = player
            .active_action_buff
            .as_ref()
            .map(|b| b.success_bonus)
            .unwrap_or(0.0);
        (player.action_success_rate + self.success_modifier + buff).clamp(0.0, 1.0)
    }

    /// `timer_reset` after level scaling and upgrades.
    pub fn effective_timer_reset(&self, player: &Player) -> i64 {
        scaled_timer(self.timer_reset, player.level, player.timer_reset_reduction())
    }

    /// `timer_penalty` after level scaling and upgrades.
    pub fn effective_timer_penalty(&self, player: &Player) -> i64 {
        scaled_timer(
            self.timer_penalty,
            player.level,
            player.timer_penalty_reduction(),
        )
    }
}

fn scaled_timer(base: u32, level: u32, reduction: u32) -> i64 {
    let scaled = (base as f64 * timer_scale(level)).round() as i64;
    (scaled - reduction as i64).max(0)
}

/// A complete set of action definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCatalog {
    definitions: BTreeMap<ActionId, ActionDefinition>,
}

impl ActionCatalog {
    /// The built-in catalog.
    pub fn standard() -> Self {
        Self {
            definitions: ActionId::all()
                .into_iter()
                .map(|id| (id, id.standard_definition()))
                .collect(),
        }
    }

    /// Build a catalog, checking every action is defined exactly once.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ActionDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for definition in definitions {
            let id = definition.id;
            if map.insert(id, definition).is_some() {
                return Err(CatalogError::Duplicate(id));
            }
        }
        if let Some(missing) = ActionId::all().into_iter().find(|id| !map.contains_key(id)) {
            return Err(CatalogError::Missing(missing));
        }
        Ok(Self { definitions: map })
    }

    /// Load a catalog from a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<ActionDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        let definitions: Vec<&ActionDefinition> = self.definitions.values().collect();
        Ok(serde_json::to_string_pretty(&definitions)?)
    }

    pub fn get(&self, id: ActionId) -> &ActionDefinition {
        // Construction guarantees every id is present.
        &self.definitions[&id]
    }

    /// Definitions in `ActionId` order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions.values()
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Upgrade;

    #[test]
    fn test_parse_action_keys() {
        assert_eq!("cleanRoom".parse::<ActionId>(), Ok(ActionId::CleanRoom));
        assert_eq!("SLEEP".parse::<ActionId>(), Ok(ActionId::Sleep));
        assert!("nap".parse::<ActionId>().is_err());
        for id in ActionId::all() {
            assert_eq!(id.key().parse::<ActionId>(), Ok(id));
        }
    }

    #[test]
    fn test_serde_uses_invocation_keys() {
        let json = serde_json::to_string(&ActionId::PracticeCoding).unwrap();
        assert_eq!(json, "\"practiceCoding\"");
    }

    #[test]
    fn test_standard_catalog_is_complete() {
        let catalog = ActionCatalog::standard();
        let rebuilt = ActionCatalog::from_definitions(catalog.iter().cloned()).unwrap();
        assert_eq!(rebuilt, catalog);
    }

    #[test]
    fn test_only_sleep_cannot_fail() {
        let catalog = ActionCatalog::standard();
        for def in catalog.iter() {
            assert_eq!(def.can_fail(), def.id != ActionId::Sleep, "{}", def.id);
        }
        assert!(matches!(
            catalog.get(ActionId::Sleep).ap,
            ApRule::Restore { restore_to: 10, max_before: SLEEP_AP_THRESHOLD }
        ));
    }

    #[test]
    fn test_missing_definition_rejected() {
        let defs = ActionCatalog::standard()
            .iter()
            .filter(|d| d.id != ActionId::Meditate)
            .cloned()
            .collect::<Vec<_>>();
        assert!(matches!(
            ActionCatalog::from_definitions(defs),
            Err(CatalogError::Missing(ActionId::Meditate))
        ));
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let mut defs: Vec<_> = ActionCatalog::standard().iter().cloned().collect();
        defs.push(ActionId::Exercise.standard_definition());
        assert!(matches!(
            ActionCatalog::from_definitions(defs),
            Err(CatalogError::Duplicate(ActionId::Exercise))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = ActionCatalog::standard();
        let json = catalog.to_json().unwrap();
        assert_eq!(ActionCatalog::from_json(&json).unwrap(), catalog);
        assert!(ActionCatalog::from_json("[]").is_err());
        assert!(ActionCatalog::from_json("not json").is_err());
    }

    #[test]
    fn test_success_chance_clamped() {
        let mut player = Player::new();
        let def = ActionId::PlayGame.standard_definition();
        player.action_success_rate = 0.9;
        assert_eq!(def.success_chance(&player), 1.0);

        let def = ActionId::PracticeCoding.standard_definition();
        player.action_success_rate = 0.1;
        assert_eq!(def.success_chance(&player), 0.0);
    }

    #[test]
    fn test_timer_scaling_and_upgrades() {
        let def = ActionId::StudyExam.standard_definition();
        let mut player = Player::new();
        assert_eq!(def.effective_timer_reset(&player), 30);
        assert_eq!(def.effective_timer_penalty(&player), 15);

        // Tier 1: 30 * 1.2 = 36, 15 * 1.2 = 18
        player.level = 20;
        assert_eq!(def.effective_timer_reset(&player), 36);
        assert_eq!(def.effective_timer_penalty(&player), 18);

        player.upgrades.insert(Upgrade::TimeManagement);
        player.upgrades.insert(Upgrade::ThickSkin);
        assert_eq!(def.effective_timer_reset(&player), 34);
        assert_eq!(def.effective_timer_penalty(&player), 16);
    }

    #[test]
    fn test_upgrades_never_go_negative() {
        let def = ActionDefinition::new(ActionId::TakeWalk, 1, 1, 1);
        let mut player = Player::new();
        player.upgrades.insert(Upgrade::TimeManagement);
        player.upgrades.insert(Upgrade::ThickSkin);
        assert_eq!(def.effective_timer_reset(&player), 0);
        assert_eq!(def.effective_timer_penalty(&player), 0);
    }
}
