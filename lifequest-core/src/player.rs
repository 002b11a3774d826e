//! The player record and everything that hangs directly off it.
//!
//! The player is plain data passed explicitly into every engine function.
//! Nothing here knows about timers or battles beyond the raw numbers.

use crate::inventory::Inventory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Upper bound for stamina regeneration and tonics.
pub const MAX_STAMINA: f64 = 100.0;

// ============================================================================
// Upgrades
// ============================================================================

/// Permanent perks bought from the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    /// Shaves time off every successful action's cooldown.
    TimeManagement,
    /// Shaves time off every failure penalty.
    ThickSkin,
}

impl Upgrade {
    pub fn name(&self) -> &'static str {
        match self {
            Upgrade::TimeManagement => "Time Management",
            Upgrade::ThickSkin => "Thick Skin",
        }
    }

    /// Seconds removed from an action's `timer_reset`.
    pub fn timer_reset_reduction(&self) -> u32 {
        match self {
            Upgrade::TimeManagement => 2,
            Upgrade::ThickSkin => 0,
        }
    }

    /// Seconds removed from an action's `timer_penalty`.
    pub fn timer_penalty_reduction(&self) -> u32 {
        match self {
            Upgrade::TimeManagement => 0,
            Upgrade::ThickSkin => 2,
        }
    }
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Action buffs
// ============================================================================

/// A one-shot modifier consumed by the next resolved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBuff {
    /// What granted the buff, for messages.
    pub source: String,
    /// Seconds taken off the timer the next action sets.
    pub timer_reduction: u32,
    /// Added to the next action's success chance.
    pub success_bonus: f64,
}

impl ActionBuff {
    pub fn new(source: impl Into<String>, timer_reduction: u32) -> Self {
        Self {
            source: source.into(),
            timer_reduction,
            success_bonus: 0.0,
        }
    }

    pub fn with_success_bonus(mut self, bonus: f64) -> Self {
        self.success_bonus = bonus;
        self
    }
}

// ============================================================================
// Player
// ============================================================================

/// The player's complete persistent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub level: u32,
    pub current_xp: u64,
    pub xp_to_next_level: u64,
    /// Compounding XP multiplier, grows with every level.
    pub base_xp_multiplier: f64,
    pub action_points: u32,
    /// Seconds until the next action is allowed.
    pub timer: i64,
    pub player_money: u64,
    pub shadow_essence: u64,
    /// Base probability that an action succeeds.
    pub action_success_rate: f64,
    pub damage: i32,
    pub defense: i32,
    pub stamina: f64,
    pub stamina_regen_rate: f64,
    pub mana: i32,
    pub health: i32,
    pub max_health: i32,
    pub inventory: Inventory,
    pub upgrades: BTreeSet<Upgrade>,
    /// Transient, never persisted.
    #[serde(skip)]
    pub active_action_buff: Option<ActionBuff>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            xp_to_next_level: 100,
            base_xp_multiplier: 1.0,
            action_points: 10,
            timer: 0,
            player_money: 0,
            shadow_essence: 0,
            action_success_rate: 0.7,
            damage: 3,
            defense: 1,
            stamina: MAX_STAMINA,
            stamina_regen_rate: 1.0,
            mana: 50,
            health: 100,
            max_health: 100,
            inventory: Inventory::default(),
            upgrades: BTreeSet::new(),
            active_action_buff: None,
        }
    }

    pub fn has_upgrade(&self, upgrade: Upgrade) -> bool {
        self.upgrades.contains(&upgrade)
    }

    /// Total seconds owned upgrades take off `timer_reset`.
    pub fn timer_reset_reduction(&self) -> u32 {
        self.upgrades.iter().map(|u| u.timer_reset_reduction()).sum()
    }

    /// Total seconds owned upgrades take off `timer_penalty`.
    pub fn timer_penalty_reduction(&self) -> u32 {
        self.upgrades.iter().map(|u| u.timer_penalty_reduction()).sum()
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Regenerate stamina by the regen rate, capped at [`MAX_STAMINA`].
    pub fn regenerate_stamina(&mut self) {
        self.stamina = (self.stamina + self.stamina_regen_rate).min(MAX_STAMINA);
    }

    /// Use one consumable from the inventory.
    ///
    /// Returns the message to show on success. Nothing changes on error.
    pub fn use_item(&mut self, name: &str) -> Result<String, ItemError> {
        if self.inventory.quantity(name) == 0 {
            return Err(ItemError::NotInInventory(name.to_string()));
        }
        let consumable =
            Consumable::from_name(name).ok_or_else(|| ItemError::NotUsable(name.to_string()))?;

        let message = match consumable {
            Consumable::Snack => {
                self.action_points += 1;
                self.active_action_buff = Some(ActionBuff::new("Snack", 3));
                "You munch a snack: +1 AP and your next task goes quicker.".to_string()
            }
            Consumable::Bandage => {
                let before = self.health;
                self.health = (self.health + 15).min(self.max_health);
                format!("You patch yourself up (+{} health).", self.health - before)
            }
            Consumable::StaminaTonic => {
                self.stamina = (self.stamina + 25.0).min(MAX_STAMINA);
                "Condensed energy floods back (+25 stamina).".to_string()
            }
            Consumable::ClarityDraught => {
                self.active_action_buff =
                    Some(ActionBuff::new("Clarity Draught", 5).with_success_bonus(0.15));
                "Your mind sharpens: the next task is faster and surer.".to_string()
            }
        };

        self.inventory.remove(name, 1);
        tracing::debug!(target: "lifequest::items", item = consumable.name(), "Consumable used");
        Ok(message)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Consumables
// ============================================================================

/// Items that do something when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumable {
    Snack,
    Bandage,
    StaminaTonic,
    ClarityDraught,
}

impl Consumable {
    pub fn name(&self) -> &'static str {
        match self {
            Consumable::Snack => "Snack",
            Consumable::Bandage => "Bandage",
            Consumable::StaminaTonic => "Stamina Tonic",
            Consumable::ClarityDraught => "Clarity Draught",
        }
    }

    /// Look up a consumable by item name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Consumable> {
        [
            Consumable::Snack,
            Consumable::Bandage,
            Consumable::StaminaTonic,
            Consumable::ClarityDraught,
        ]
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

/// Errors from using items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("You don't have any {0}.")]
    NotInInventory(String),

    #[error("{0} can't be used directly.")]
    NotUsable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_player() {
        let player = Player::new();
        assert_eq!(player.level, 1);
        assert_eq!(player.xp_to_next_level, 100);
        assert_eq!(player.action_points, 10);
        assert_eq!(player.timer, 0);
        assert_eq!(player.action_success_rate, 0.7);
        assert!(player.active_action_buff.is_none());
    }

    #[test]
    fn test_upgrade_reductions() {
        let mut player = Player::new();
        assert_eq!(player.timer_reset_reduction(), 0);

        player.upgrades.insert(Upgrade::TimeManagement);
        player.upgrades.insert(Upgrade::ThickSkin);
        assert_eq!(player.timer_reset_reduction(), 2);
        assert_eq!(player.timer_penalty_reduction(), 2);
    }

    #[test]
    fn test_use_snack_grants_ap_and_buff() {
        let mut player = Player::new();
        player.inventory.add("Snack", 2);

        player.use_item("snack").unwrap();
        assert_eq!(player.action_points, 11);
        assert_eq!(player.inventory.quantity("Snack"), 1);
        assert_eq!(
            player.active_action_buff.as_ref().map(|b| b.timer_reduction),
            Some(3)
        );
    }

    #[test]
    fn test_bandage_caps_at_max_health() {
        let mut player = Player::new();
        player.health = 95;
        player.inventory.add("Bandage", 1);

        let message = player.use_item("Bandage").unwrap();
        assert_eq!(player.health, 100);
        assert!(message.contains("+5"));
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_use_item_errors_leave_state() {
        let mut player = Player::new();
        assert_eq!(
            player.use_item("Snack"),
            Err(ItemError::NotInInventory("Snack".to_string()))
        );

        player.inventory.add("Focus Charm", 1);
        let before = player.clone();
        assert!(matches!(
            player.use_item("Focus Charm"),
            Err(ItemError::NotUsable(_))
        ));
        assert_eq!(player, before);
    }

    #[test]
    fn test_stamina_regen_caps() {
        let mut player = Player::new();
        player.stamina = 99.5;
        player.regenerate_stamina();
        assert_eq!(player.stamina, MAX_STAMINA);
    }
}
