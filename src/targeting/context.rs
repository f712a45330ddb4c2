//! Target contexts - which entities an effect may touch.
//!
//! A context filters the candidate pool by allegiance or category. Contexts
//! are written from the caster's point of view: when the source is itself
//! hostile, `enemy` and `ally` swap meaning for that call, so an enemy's
//! `["fire", "enemy"]` bolt hits players with the same tag vocabulary.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Combatant, EngineConfig, EntityKind};

/// Filter applied to candidate entities.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetContext {
    /// The source only; bypasses geometry.
    SelfOnly,
    Enemy,
    Ally,
    Player,
    Device,
    Construct,
    Undead,
    Mechanical,
    All,
    /// Unrecognized context; matches everything.
    Other(String),
}

impl TargetContext {
    /// Parse a context name. Unknown names become `Other`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "self" => TargetContext::SelfOnly,
            "enemy" => TargetContext::Enemy,
            "ally" => TargetContext::Ally,
            "player" => TargetContext::Player,
            "turret" => TargetContext::Device,
            "construct" => TargetContext::Construct,
            "undead" => TargetContext::Undead,
            "mechanical" => TargetContext::Mechanical,
            "all" => TargetContext::All,
            other => TargetContext::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            TargetContext::SelfOnly => "self",
            TargetContext::Enemy => "enemy",
            TargetContext::Ally => "ally",
            TargetContext::Player => "player",
            TargetContext::Device => "turret",
            TargetContext::Construct => "construct",
            TargetContext::Undead => "undead",
            TargetContext::Mechanical => "mechanical",
            TargetContext::All => "all",
            TargetContext::Other(name) => name,
        }
    }

    /// Swap `enemy` and `ally`; every other context is unchanged.
    #[must_use]
    pub fn flipped(&self) -> Self {
        match self {
            TargetContext::Enemy => TargetContext::Ally,
            TargetContext::Ally => TargetContext::Enemy,
            other => other.clone(),
        }
    }

    /// Whether `entity` passes this context.
    #[must_use]
    pub fn matches(&self, entity: &dyn Combatant, config: &EngineConfig) -> bool {
        match self {
            TargetContext::All => true,
            TargetContext::SelfOnly => false,
            TargetContext::Enemy => is_hostile(entity, config),
            TargetContext::Ally => is_friendly(entity, config),
            TargetContext::Player => {
                entity.kind() == EntityKind::Player || entity.category() == Some("player")
            }
            TargetContext::Device => {
                entity.kind() == EntityKind::Device
                    || entity.category().is_some_and(|c| config.is_device_category(c))
            }
            TargetContext::Construct => entity.category() == Some("construct"),
            TargetContext::Undead => entity.category() == Some("undead"),
            TargetContext::Mechanical => entity.category() == Some("mechanical"),
            TargetContext::Other(name) => {
                trace!(context = %name, entity = %entity.id(), "unrecognized context, allowing");
                true
            }
        }
    }
}

impl From<String> for TargetContext {
    fn from(name: String) -> Self {
        TargetContext::from_name(&name)
    }
}

impl From<TargetContext> for String {
    fn from(context: TargetContext) -> Self {
        context.as_str().to_string()
    }
}

impl std::fmt::Display for TargetContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hostile by kind, or by category when the kind doesn't say otherwise.
#[must_use]
pub fn is_hostile(entity: &dyn Combatant, config: &EngineConfig) -> bool {
    match entity.kind() {
        EntityKind::Enemy => true,
        EntityKind::Player | EntityKind::Device | EntityKind::Ally => false,
        EntityKind::Neutral => entity.category().is_some_and(|c| config.is_hostile_category(c)),
    }
}

/// Friendly by kind, or by category when the kind doesn't say otherwise.
#[must_use]
pub fn is_friendly(entity: &dyn Combatant, config: &EngineConfig) -> bool {
    match entity.kind() {
        EntityKind::Player | EntityKind::Device | EntityKind::Ally => true,
        EntityKind::Enemy => false,
        EntityKind::Neutral => entity.category().is_some_and(|c| config.is_friendly_category(c)),
    }
}
