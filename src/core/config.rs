//! Engine configuration.
//!
//! Tag behavior lives in the tag data (see `TagRegistry`); this covers the
//! few knobs that belong to the host rather than to content: the RNG seed
//! and how entity categories map onto allegiances.

use serde::{Deserialize, Serialize};

/// Executor and target finder configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for crit and auto-apply rolls.
    /// Same seed produces identical roll sequences.
    pub seed: u64,

    /// Categories treated as hostile by `enemy`/`hostile` contexts, and that
    /// make a source count as hostile for the context flip.
    pub hostile_categories: Vec<String>,

    /// Categories treated as friendly by `ally`/`friendly` contexts.
    pub friendly_categories: Vec<String>,

    /// Categories matched by the `turret`/`device` contexts.
    pub device_categories: Vec<String>,

    /// Damage type used when an effect carries base damage but no damage tag.
    pub default_damage_type: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            hostile_categories: ["enemy", "beast", "undead", "construct", "mechanical", "elemental"]
                .into_iter()
                .map(String::from)
                .collect(),
            friendly_categories: ["player", "ally", "turret", "device", "trap", "bomb"]
                .into_iter()
                .map(String::from)
                .collect(),
            device_categories: ["turret", "device", "trap", "bomb"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_damage_type: "physical".to_string(),
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Add a hostile category.
    #[must_use]
    pub fn with_hostile_category(mut self, category: impl Into<String>) -> Self {
        self.hostile_categories.push(category.into());
        self
    }

    /// Add a friendly category.
    #[must_use]
    pub fn with_friendly_category(mut self, category: impl Into<String>) -> Self {
        self.friendly_categories.push(category.into());
        self
    }

    /// Set the fallback damage type.
    #[must_use]
    pub fn with_default_damage_type(mut self, damage_type: impl Into<String>) -> Self {
        self.default_damage_type = damage_type.into();
        self
    }

    #[must_use]
    pub fn is_hostile_category(&self, category: &str) -> bool {
        self.hostile_categories.iter().any(|c| c == category)
    }

    #[must_use]
    pub fn is_friendly_category(&self, category: &str) -> bool {
        self.friendly_categories.iter().any(|c| c == category)
    }

    #[must_use]
    pub fn is_device_category(&self, category: &str) -> bool {
        self.device_categories.iter().any(|c| c == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.seed, 42);
        assert!(config.is_hostile_category("undead"));
        assert!(!config.is_hostile_category("player"));
        assert!(config.is_friendly_category("turret"));
        assert!(config.is_device_category("trap"));
        assert_eq!(config.default_damage_type, "physical");
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::default()
            .with_seed(123)
            .with_hostile_category("demon")
            .with_default_damage_type("arcane");

        assert_eq!(config.seed, 123);
        assert!(config.is_hostile_category("demon"));
        assert_eq!(config.default_damage_type, "arcane");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert!(config.is_hostile_category("beast"));
    }
}
