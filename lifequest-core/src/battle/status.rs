//! Status effects that linger on a combatant between turns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a status, without its strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    Burn,
    Bleed,
    Weaken,
}

impl StatusKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatusKind::Burn => "Burn",
            StatusKind::Bleed => "Bleed",
            StatusKind::Weaken => "Weaken",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A status and its strength. Only damaging statuses carry a tick value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffect {
    Burn { damage: i32 },
    Bleed { damage: i32 },
    /// Scales the afflicted combatant's outgoing damage.
    Weaken,
}

impl StatusEffect {
    pub fn kind(&self) -> StatusKind {
        match self {
            StatusEffect::Burn { .. } => StatusKind::Burn,
            StatusEffect::Bleed { .. } => StatusKind::Bleed,
            StatusEffect::Weaken => StatusKind::Weaken,
        }
    }

    /// Damage dealt each tick, `None` for modifier-only statuses.
    pub fn tick_damage(&self) -> Option<i32> {
        match self {
            StatusEffect::Burn { damage } | StatusEffect::Bleed { damage } => Some(*damage),
            StatusEffect::Weaken => None,
        }
    }

    /// Combine with a re-application of the same kind, keeping the stronger.
    fn strongest(self, other: StatusEffect) -> StatusEffect {
        match (self, other) {
            (StatusEffect::Burn { damage: a }, StatusEffect::Burn { damage: b }) => {
                StatusEffect::Burn { damage: a.max(b) }
            }
            (StatusEffect::Bleed { damage: a }, StatusEffect::Bleed { damage: b }) => {
                StatusEffect::Bleed { damage: a.max(b) }
            }
            (_, other) => other,
        }
    }
}

/// A status currently affecting a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub effect: StatusEffect,
    /// Ticks left before it wears off.
    pub remaining: u32,
}

/// Result of ticking a status list once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTick {
    /// Total damage the statuses dealt.
    pub damage: i32,
    pub log: Vec<String>,
}

/// The statuses on one combatant. At most one entry per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusList {
    active: Vec<ActiveStatus>,
}

impl StatusList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a status. Re-applying a kind already present refreshes it to the
    /// longer duration and the stronger tick instead of stacking.
    pub fn apply(&mut self, effect: StatusEffect, duration: u32) {
        if let Some(existing) = self
            .active
            .iter_mut()
            .find(|s| s.effect.kind() == effect.kind())
        {
            existing.effect = existing.effect.strongest(effect);
            existing.remaining = existing.remaining.max(duration);
            return;
        }
        self.active.push(ActiveStatus {
            effect,
            remaining: duration,
        });
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.active.iter().any(|s| s.effect.kind() == kind)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&ActiveStatus> {
        self.active.iter().find(|s| s.effect.kind() == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveStatus> {
        self.active.iter()
    }

    /// Tick every status once: damaging ones deal their damage, all lose one
    /// tick, expired ones are dropped. `target` names the afflicted combatant
    /// in log lines. The caller applies the returned damage.
    pub fn tick(&mut self, target: &str) -> StatusTick {
        let mut result = StatusTick::default();

        for status in &mut self.active {
            if let Some(damage) = status.effect.tick_damage() {
                result.damage += damage;
                result.log.push(format!(
                    "{} deals {damage} damage to {target}.",
                    status.effect.kind()
                ));
            }
            status.remaining = status.remaining.saturating_sub(1);
        }

        self.active.retain(|status| {
            if status.remaining == 0 {
                result
                    .log
                    .push(format!("{} on {target} wore off.", status.effect.kind()));
                false
            } else {
                true
            }
        });

        result
    }
}
