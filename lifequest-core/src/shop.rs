//! Shop catalog, purchases, and crafting recipes.

use crate::inventory::ItemStack;
use crate::player::{Player, Upgrade};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Look up a shop offer by id (case-insensitive).
pub fn get_offer(id: &str) -> Option<&'static ShopOffer> {
    SHOP_CATALOG.iter().find(|o| o.id.eq_ignore_ascii_case(id))
}

/// Look up a crafting recipe by id (case-insensitive).
pub fn get_recipe(id: &str) -> Option<&'static Recipe> {
    RECIPES.iter().find(|r| r.id.eq_ignore_ascii_case(id))
}

// ============================================================================
// Types
// ============================================================================

/// Price in both currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub gold: u64,
    pub essence: u64,
}

impl Cost {
    pub const fn new(gold: u64, essence: u64) -> Self {
        Self { gold, essence }
    }
}

/// What buying an offer grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopReward {
    Item(ItemStack),
    Upgrade(Upgrade),
}

/// A single purchasable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopOffer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: Cost,
    pub reward: ShopReward,
}

impl ShopOffer {
    fn item(id: &str, name: &str, description: &str, cost: Cost) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            cost,
            reward: ShopReward::Item(ItemStack::one(name)),
        }
    }

    fn upgrade(id: &str, upgrade: Upgrade, description: &str, cost: Cost) -> Self {
        Self {
            id: id.to_string(),
            name: upgrade.name().to_string(),
            description: description.to_string(),
            cost,
            reward: ShopReward::Upgrade(upgrade),
        }
    }
}

/// Turns materials into a new item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub inputs: Vec<ItemStack>,
    pub output: ItemStack,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("There is no '{0}' in the shop.")]
    UnknownItem(String),

    #[error("You already own {0}.")]
    AlreadyOwned(String),

    #[error("Not enough currency.")]
    NotEnoughCurrency { cost: Cost, gold: u64, essence: u64 },

    #[error("No recipe called '{0}'.")]
    UnknownRecipe(String),

    #[error("Missing materials for {0}.")]
    MissingMaterials(String),
}

// ============================================================================
// Operations
// ============================================================================

/// Whether the player's wallet covers a cost.
pub fn can_afford(cost: &Cost, player: &Player) -> bool {
    player.player_money >= cost.gold && player.shadow_essence >= cost.essence
}

/// Buy one offer. Nothing changes on error.
pub fn purchase_item(player: &mut Player, item_id: &str) -> Result<String, ShopError> {
    let offer = get_offer(item_id).ok_or_else(|| ShopError::UnknownItem(item_id.to_string()))?;

    if let ShopReward::Upgrade(upgrade) = &offer.reward {
        if player.has_upgrade(*upgrade) {
            return Err(ShopError::AlreadyOwned(offer.name.clone()));
        }
    }

    if !can_afford(&offer.cost, player) {
        tracing::debug!(
            target: "lifequest::shop",
            item = %offer.id,
            gold = player.player_money,
            essence = player.shadow_essence,
            "Purchase declined"
        );
        return Err(ShopError::NotEnoughCurrency {
            cost: offer.cost,
            gold: player.player_money,
            essence: player.shadow_essence,
        });
    }

    player.player_money -= offer.cost.gold;
    player.shadow_essence -= offer.cost.essence;
    match &offer.reward {
        ShopReward::Item(stack) => player.inventory.add(&stack.name, stack.quantity),
        ShopReward::Upgrade(upgrade) => {
            player.upgrades.insert(*upgrade);
        }
    }

    tracing::info!(target: "lifequest::shop", item = %offer.id, "Purchased");
    Ok(format!("Purchased {}.", offer.name))
}

/// Craft one recipe from inventory materials. Nothing changes on error.
pub fn craft(player: &mut Player, recipe_id: &str) -> Result<String, ShopError> {
    let recipe =
        get_recipe(recipe_id).ok_or_else(|| ShopError::UnknownRecipe(recipe_id.to_string()))?;

    if !player.inventory.has_required(&recipe.inputs) {
        return Err(ShopError::MissingMaterials(recipe.output.name.clone()));
    }

    player.inventory.remove_all(&recipe.inputs);
    player
        .inventory
        .add(&recipe.output.name, recipe.output.quantity);

    tracing::info!(target: "lifequest::shop", recipe = %recipe.id, "Crafted");
    Ok(format!("Crafted {}.", recipe.output.name))
}

// ============================================================================
// Static tables
// ============================================================================

lazy_static::lazy_static! {
    /// Everything the shop sells.
    pub static ref SHOP_CATALOG: Vec<ShopOffer> = vec![
        ShopOffer::item("bandage", "Bandage", "Restores 15 health.", Cost::new(35, 0)),
        ShopOffer::item(
            "focus-charm",
            "Focus Charm",
            "A crafting material humming with intent.",
            Cost::new(60, 2),
        ),
        ShopOffer::item(
            "stamina-tonic",
            "Stamina Tonic",
            "Restores 25 stamina.",
            Cost::new(25, 3),
        ),
        ShopOffer::item("snack", "Snack", "+1 AP and a quicker next task.", Cost::new(12, 0)),
        ShopOffer::upgrade(
            "time-management",
            Upgrade::TimeManagement,
            "Every action's cooldown is 2s shorter.",
            Cost::new(90, 1),
        ),
        ShopOffer::upgrade(
            "thick-skin",
            Upgrade::ThickSkin,
            "Failure penalties are 2s shorter.",
            Cost::new(120, 3),
        ),
    ];

    /// Crafting recipes.
    pub static ref RECIPES: Vec<Recipe> = vec![
        Recipe {
            id: "clarity-draught".to_string(),
            inputs: vec![ItemStack::one("Focus Charm"), ItemStack::one("Stamina Tonic")],
            output: ItemStack::one("Clarity Draught"),
        },
        Recipe {
            id: "warding-charm".to_string(),
            inputs: vec![ItemStack::one("Focus Charm"), ItemStack::new("Shadow Shard", 2)],
            output: ItemStack::one("Warding Charm"),
        },
    ];
}
