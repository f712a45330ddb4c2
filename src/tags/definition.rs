//! Tag definitions - static tag metadata.
//!
//! A `TagDefinition` describes what one tag means: its category, the params it
//! contributes by default, how it behaves against particular target
//! categories and which status it may chain into. Definitions are loaded once
//! by the `TagRegistry` and never change afterwards.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{ConfigError, Params};

/// What kind of behavior a tag contributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    DamageType,
    Geometry,
    StatusBuff,
    StatusDebuff,
    Special,
    Trigger,
    Context,
    Equipment,
}

impl TagCategory {
    #[must_use]
    pub const fn is_status(self) -> bool {
        matches!(self, TagCategory::StatusBuff | TagCategory::StatusDebuff)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TagCategory::DamageType => "damage_type",
            TagCategory::Geometry => "geometry",
            TagCategory::StatusBuff => "status_buff",
            TagCategory::StatusDebuff => "status_debuff",
            TagCategory::Special => "special",
            TagCategory::Trigger => "trigger",
            TagCategory::Context => "context",
            TagCategory::Equipment => "equipment",
        }
    }
}

impl std::fmt::Display for TagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a damage tag behaves against one target category.
///
/// Holy against undead might carry `damage_multiplier: 1.5`; holy against
/// allies `converts_to_healing: true`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextBehavior {
    pub damage_multiplier: f64,
    pub converts_to_healing: bool,
}

impl Default for ContextBehavior {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            converts_to_healing: false,
        }
    }
}

/// Static tag definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Canonical tag name. Filled from the document key when loading.
    #[serde(default)]
    pub name: String,

    pub category: TagCategory,

    #[serde(default)]
    pub description: String,

    /// Params this tag contributes before caller overrides.
    #[serde(default)]
    pub default_params: Params,

    /// Behavior keyed by target category.
    #[serde(default)]
    pub context_behavior: FxHashMap<String, ContextBehavior>,

    /// Status this tag may chain into after dealing damage.
    #[serde(default)]
    pub auto_apply_status: Option<String>,

    /// Probability in `[0, 1]` of `auto_apply_status` firing.
    #[serde(default)]
    pub auto_apply_chance: f64,

    /// Target categories this status cannot be applied to.
    #[serde(default)]
    pub immunity: Vec<String>,

    /// Damage multipliers applied when the keyed tag is also present.
    #[serde(default)]
    pub synergies: FxHashMap<String, f64>,

    /// Alternate spellings that resolve to this tag.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl TagDefinition {
    /// Create a definition with no params or behaviors.
    #[must_use]
    pub fn new(name: impl Into<String>, category: TagCategory) -> Self {
        Self {
            name: name.into(),
            category,
            description: String::new(),
            default_params: Params::new(),
            context_behavior: FxHashMap::default(),
            auto_apply_status: None,
            auto_apply_chance: 0.0,
            immunity: Vec::new(),
            synergies: FxHashMap::default(),
            aliases: Vec::new(),
        }
    }

    /// Add a default param (builder pattern).
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<crate::core::ParamValue>) -> Self {
        self.default_params.insert(key, value);
        self
    }

    /// Add a context behavior (builder pattern).
    #[must_use]
    pub fn with_behavior(mut self, category: impl Into<String>, behavior: ContextBehavior) -> Self {
        self.context_behavior.insert(category.into(), behavior);
        self
    }

    /// Chain into `status` with `chance` after damage (builder pattern).
    #[must_use]
    pub fn with_auto_apply(mut self, status: impl Into<String>, chance: f64) -> Self {
        self.auto_apply_status = Some(status.into());
        self.auto_apply_chance = chance;
        self
    }

    #[must_use]
    pub fn with_immunity(mut self, category: impl Into<String>) -> Self {
        self.immunity.push(category.into());
        self
    }

    #[must_use]
    pub fn with_synergy(mut self, tag: impl Into<String>, multiplier: f64) -> Self {
        self.synergies.insert(tag.into(), multiplier);
        self
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn is_status(&self) -> bool {
        self.category.is_status()
    }

    /// Behavior against `category`, if the definition declares one.
    #[must_use]
    pub fn behavior_for(&self, category: &str) -> Option<&ContextBehavior> {
        self.context_behavior.get(category)
    }

    #[must_use]
    pub fn is_immune(&self, category: &str) -> bool {
        self.immunity.iter().any(|c| c == category)
    }

    /// Check the self-contained parts of the definition.
    ///
    /// Cross-references (auto-apply targets, aliases) are checked by the registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid(&self.name, "empty tag name"));
        }
        if self.name != self.name.to_lowercase() {
            return Err(ConfigError::invalid(&self.name, "tag names must be lowercase"));
        }
        if !(0.0..=1.0).contains(&self.auto_apply_chance) {
            return Err(ConfigError::invalid(
                &self.name,
                format!("auto_apply_chance {} outside [0, 1]", self.auto_apply_chance),
            ));
        }
        if self.auto_apply_chance > 0.0 && self.auto_apply_status.is_none() {
            return Err(ConfigError::invalid(
                &self.name,
                "auto_apply_chance set without auto_apply_status",
            ));
        }
        for (category, behavior) in &self.context_behavior {
            if !behavior.damage_multiplier.is_finite() || behavior.damage_multiplier < 0.0 {
                return Err(ConfigError::invalid(
                    &self.name,
                    format!("damage_multiplier for `{category}` must be a non-negative number"),
                ));
            }
        }
        for (tag, multiplier) in &self.synergies {
            if !multiplier.is_finite() || *multiplier < 0.0 {
                return Err(ConfigError::invalid(
                    &self.name,
                    format!("synergy multiplier for `{tag}` must be a non-negative number"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let holy = TagDefinition::new("holy", TagCategory::DamageType)
            .with_param("damage", 20.0)
            .with_behavior(
                "undead",
                ContextBehavior {
                    damage_multiplier: 1.5,
                    ..ContextBehavior::default()
                },
            );

        assert_eq!(holy.behavior_for("undead").map(|b| b.damage_multiplier), Some(1.5));
        assert!(holy.behavior_for("beast").is_none());
        assert!(holy.validate().is_ok());
    }

    #[test]
    fn test_invalid_chance() {
        let fire = TagDefinition::new("fire", TagCategory::DamageType).with_auto_apply("burn", 1.5);
        assert!(matches!(fire.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_chance_without_status() {
        let mut fire = TagDefinition::new("fire", TagCategory::DamageType);
        fire.auto_apply_chance = 0.5;
        assert!(fire.validate().is_err());
    }

    #[test]
    fn test_uppercase_rejected() {
        let def = TagDefinition::new("Fire", TagCategory::DamageType);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_deserialize_minimal() {
        let def: TagDefinition = serde_json::from_str(r#"{"category": "status_debuff"}"#).unwrap();
        assert!(def.is_status());
        assert!(def.default_params.is_empty());
        assert_eq!(def.auto_apply_chance, 0.0);
    }

    #[test]
    fn test_unknown_category_fails() {
        let result = serde_json::from_str::<TagDefinition>(r#"{"category": "weather"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_context_behavior_defaults() {
        let b: ContextBehavior = serde_json::from_str(r#"{"converts_to_healing": true}"#).unwrap();
        assert!(b.converts_to_healing);
        assert_eq!(b.damage_multiplier, 1.0);
    }
}
