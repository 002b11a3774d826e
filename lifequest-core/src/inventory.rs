//! Inventory ledger.
//!
//! A name -> quantity ledger. Names are unique keys compared
//! case-insensitively; an entry whose quantity reaches zero is removed
//! rather than kept at zero.

use serde::{Deserialize, Serialize};

/// A named quantity of an item, used for costs, recipes, and rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub name: String,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    /// A single item.
    pub fn one(name: impl Into<String>) -> Self {
        Self::new(name, 1)
    }
}

/// One ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub name: String,
    pub quantity: u32,
}

/// The player's inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<InventoryEntry>,
}

impl Inventory {
    /// Add `quantity` of an item, stacking onto an existing entry.
    pub fn add(&mut self, name: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(existing) = self.find_mut(name) {
            existing.quantity += quantity;
            return;
        }
        self.items.push(InventoryEntry {
            name: name.to_string(),
            quantity,
        });
    }

    /// Remove up to `quantity` of an item. Returns how many were removed.
    ///
    /// Removing more than is held floors the quantity at zero, which deletes
    /// the entry. Removing an unknown item is a no-op.
    pub fn remove(&mut self, name: &str, quantity: u32) -> u32 {
        let Some(idx) = self.position(name) else {
            return 0;
        };
        let entry = &mut self.items[idx];
        let removed = entry.quantity.min(quantity);
        entry.quantity -= removed;
        if entry.quantity == 0 {
            self.items.remove(idx);
        }
        removed
    }

    pub fn remove_all(&mut self, stacks: &[ItemStack]) {
        for stack in stacks {
            self.remove(&stack.name, stack.quantity);
        }
    }

    /// Check that every requirement is held in at least the required amount.
    pub fn has_required(&self, requirements: &[ItemStack]) -> bool {
        requirements
            .iter()
            .all(|req| self.quantity(&req.name) >= req.quantity)
    }

    /// Quantity held of an item, zero if absent.
    pub fn quantity(&self, name: &str) -> u32 {
        self.find(name).map(|e| e.quantity).unwrap_or(0)
    }

    pub fn find(&self, name: &str) -> Option<&InventoryEntry> {
        self.items.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut InventoryEntry> {
        self.items
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_stacks() {
        let mut inventory = Inventory::default();
        inventory.add("Snack", 1);
        inventory.add("snack", 2);
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.quantity("Snack"), 3);
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let mut inventory = Inventory::default();
        inventory.add("Bandage", 2);
        let before = inventory.clone();

        inventory.add("Bandage", 5);
        inventory.add("Focus Charm", 1);
        inventory.remove("Bandage", 5);
        inventory.remove("Focus Charm", 1);

        assert_eq!(inventory, before);
    }

    #[test]
    fn test_over_removal_deletes_entry() {
        let mut inventory = Inventory::default();
        inventory.add("Stamina Tonic", 2);

        assert_eq!(inventory.remove("Stamina Tonic", 10), 2);
        assert_eq!(inventory.quantity("Stamina Tonic"), 0);
        assert!(inventory.find("Stamina Tonic").is_none());
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut inventory = Inventory::default();
        inventory.add("Snack", 1);
        assert_eq!(inventory.remove("Shadow Shard", 1), 0);
        assert_eq!(inventory.quantity("Snack"), 1);
    }

    #[test]
    fn test_has_required() {
        let mut inventory = Inventory::default();
        inventory.add("Focus Charm", 1);
        inventory.add("Shadow Shard", 2);

        assert!(inventory.has_required(&[
            ItemStack::one("Focus Charm"),
            ItemStack::new("Shadow Shard", 2),
        ]));
        assert!(!inventory.has_required(&[ItemStack::new("Shadow Shard", 3)]));
        assert!(inventory.has_required(&[]));
    }

    #[test]
    fn test_zero_add_creates_nothing() {
        let mut inventory = Inventory::default();
        inventory.add("Snack", 0);
        assert!(inventory.is_empty());
    }
}
