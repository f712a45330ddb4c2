//! Tag registry for definition lookup.
//!
//! The `TagRegistry` stores every tag definition plus the data-driven conflict
//! table (geometry priority and mutually exclusive pairs). It is built once,
//! validated as a whole, and then shared read-only (typically behind an `Arc`)
//! by the parser and executor.
//!
//! ## Document format
//!
//! ```json
//! {
//!   "tags": {
//!     "fire": { "category": "damage_type", "auto_apply_status": "burn", "auto_apply_chance": 0.1 },
//!     "burn": { "category": "status_debuff", "default_params": { "burn_duration": 3.0 } }
//!   },
//!   "conflicts": {
//!     "geometry_priority": ["beam", "cone", "circle", "chain", "single_target"],
//!     "mutually_exclusive": { "burn": ["freeze"] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::definition::{TagCategory, TagDefinition};
use crate::core::{ConfigError, Params};

const BUILTIN_DEFINITIONS: &str = include_str!("../../data/tag_definitions.json");

/// Conflict resolution data.
///
/// An empty priority list means the first geometry tag in a list wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictRules {
    /// Geometry tags, highest priority first.
    pub geometry_priority: Vec<String>,
    /// Tag → tags it cannot co-occur with. Pairs are symmetric.
    pub mutually_exclusive: FxHashMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct RegistryDocument {
    tags: BTreeMap<String, TagDefinition>,
    #[serde(default)]
    conflicts: ConflictRules,
}

/// Registry of tag definitions.
///
/// ## Example
///
/// ```
/// use combat_tags::tags::{ConflictRules, TagCategory, TagDefinition, TagRegistry};
///
/// let registry = TagRegistry::from_definitions(
///     [
///         TagDefinition::new("fire", TagCategory::DamageType).with_param("damage", 10.0),
///         TagDefinition::new("circle", TagCategory::Geometry).with_alias("aoe"),
///     ],
///     ConflictRules {
///         geometry_priority: vec!["circle".into()],
///         ..ConflictRules::default()
///     },
/// )
/// .unwrap();
///
/// assert_eq!(registry.get_definition("aoe").unwrap().name, "circle");
/// assert_eq!(registry.get_default_params("fire").f64_or("damage", 0.0), 10.0);
/// assert!(registry.get_default_params("unknown").is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TagRegistry {
    definitions: FxHashMap<String, TagDefinition>,
    aliases: FxHashMap<String, String>,
    geometry_priority: Vec<String>,
    exclusions: FxHashMap<String, Vec<String>>,
}

impl TagRegistry {
    /// Load the definition set bundled with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_DEFINITIONS)
    }

    /// Load definitions from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Load definitions from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let document: RegistryDocument = serde_json::from_str(json)?;

        let mut definitions = Vec::with_capacity(document.tags.len());
        for (key, mut definition) in document.tags {
            if definition.name.is_empty() {
                definition.name = key;
            } else if definition.name != key {
                return Err(ConfigError::invalid(
                    &key,
                    format!("entry declares mismatched name `{}`", definition.name),
                ));
            }
            definitions.push(definition);
        }

        Self::from_definitions(definitions, document.conflicts)
    }

    /// Build and validate a registry from in-memory definitions.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = TagDefinition>,
        conflicts: ConflictRules,
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::default();

        for definition in definitions {
            definition.validate()?;
            if registry.definitions.contains_key(&definition.name) {
                return Err(ConfigError::invalid(&definition.name, "defined more than once"));
            }
            registry.definitions.insert(definition.name.clone(), definition);
        }

        registry.index_aliases()?;
        registry.check_auto_apply()?;
        registry.load_conflicts(conflicts)?;

        info!(
            tags = registry.definitions.len(),
            aliases = registry.aliases.len(),
            "tag registry loaded"
        );
        Ok(registry)
    }

    fn index_aliases(&mut self) -> Result<(), ConfigError> {
        for definition in self.definitions.values() {
            for alias in &definition.aliases {
                if self.definitions.contains_key(alias) {
                    return Err(ConfigError::invalid(
                        &definition.name,
                        format!("alias `{alias}` collides with a tag name"),
                    ));
                }
                if let Some(existing) = self.aliases.insert(alias.clone(), definition.name.clone()) {
                    return Err(ConfigError::invalid(
                        &definition.name,
                        format!("alias `{alias}` already used by `{existing}`"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_auto_apply(&self) -> Result<(), ConfigError> {
        for definition in self.definitions.values() {
            let Some(status) = &definition.auto_apply_status else {
                continue;
            };
            match self.get_definition(status) {
                Some(target) if target.is_status() => {}
                Some(target) => {
                    return Err(ConfigError::invalid(
                        &definition.name,
                        format!(
                            "auto_apply_status `{status}` is a {} tag, not a status",
                            target.category
                        ),
                    ))
                }
                None => {
                    return Err(ConfigError::invalid(
                        &definition.name,
                        format!("auto_apply_status `{status}` is not defined"),
                    ))
                }
            }
        }
        Ok(())
    }

    fn load_conflicts(&mut self, conflicts: ConflictRules) -> Result<(), ConfigError> {
        for tag in &conflicts.geometry_priority {
            match self.get_definition(tag) {
                Some(def) if def.category == TagCategory::Geometry => {}
                Some(def) => {
                    return Err(ConfigError::Conflicts(format!(
                        "geometry_priority entry `{tag}` is a {} tag",
                        def.category
                    )))
                }
                None => {
                    return Err(ConfigError::Conflicts(format!(
                        "geometry_priority entry `{tag}` is not defined"
                    )))
                }
            }
        }
        self.geometry_priority = conflicts
            .geometry_priority
            .iter()
            .map(|t| self.canonical_name(t).unwrap_or(t).to_string())
            .collect();

        for (tag, others) in &conflicts.mutually_exclusive {
            let Some(a) = self.canonical_name(tag).map(str::to_string) else {
                return Err(ConfigError::Conflicts(format!("exclusion key `{tag}` is not defined")));
            };
            for other in others {
                let Some(b) = self.canonical_name(other).map(str::to_string) else {
                    return Err(ConfigError::Conflicts(format!(
                        "`{tag}` excludes undefined tag `{other}`"
                    )));
                };
                if a == b {
                    return Err(ConfigError::Conflicts(format!("`{tag}` excludes itself")));
                }
                self.exclusions.entry(a.clone()).or_default().push(b.clone());
                self.exclusions.entry(b).or_default().push(a.clone());
            }
        }
        debug!(pairs = self.exclusions.len(), "conflict table indexed");
        Ok(())
    }

    /// Canonical name for a tag or alias.
    #[must_use]
    pub fn canonical_name<'a>(&'a self, tag: &'a str) -> Option<&'a str> {
        if let Some((name, _)) = self.definitions.get_key_value(tag) {
            Some(name.as_str())
        } else {
            self.aliases.get(tag).map(String::as_str)
        }
    }

    /// Get a definition by name or alias.
    #[must_use]
    pub fn get_definition(&self, tag: &str) -> Option<&TagDefinition> {
        self.definitions
            .get(tag)
            .or_else(|| self.aliases.get(tag).and_then(|name| self.definitions.get(name)))
    }

    /// Default params of a tag, or an empty map for unknown tags.
    #[must_use]
    pub fn get_default_params(&self, tag: &str) -> Params {
        self.get_definition(tag)
            .map(|d| d.default_params.clone())
            .unwrap_or_default()
    }

    /// Geometry tags, highest priority first.
    #[must_use]
    pub fn geometry_priority(&self) -> &[String] {
        &self.geometry_priority
    }

    /// Position of `tag` in the geometry priority list (lower wins).
    #[must_use]
    pub fn geometry_rank(&self, tag: &str) -> Option<usize> {
        self.geometry_priority.iter().position(|t| t == tag)
    }

    /// Tags that cannot co-occur with `tag`.
    #[must_use]
    pub fn conflicts_for(&self, tag: &str) -> &[String] {
        self.exclusions.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether two canonical tags are mutually exclusive.
    #[must_use]
    pub fn conflicts_between(&self, a: &str, b: &str) -> bool {
        self.conflicts_for(a).iter().any(|t| t == b)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.get_definition(tag).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &TagDefinition> {
        self.definitions.values()
    }

    /// Find definitions by category.
    pub fn find_by_category(&self, category: TagCategory) -> impl Iterator<Item = &TagDefinition> {
        self.definitions.values().filter(move |d| d.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_registry() -> TagRegistry {
        TagRegistry::from_json_str(
            r#"{
                "tags": {
                    "fire": {"category": "damage_type", "auto_apply_status": "burn", "auto_apply_chance": 0.1},
                    "burn": {"category": "status_debuff", "default_params": {"burn_duration": 3.0}},
                    "freeze": {"category": "status_debuff"},
                    "circle": {"category": "geometry", "aliases": ["aoe"]},
                    "beam": {"category": "geometry", "aliases": ["line"]}
                },
                "conflicts": {
                    "geometry_priority": ["beam", "circle"],
                    "mutually_exclusive": {"burn": ["freeze"]}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_and_aliases() {
        let registry = small_registry();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get_definition("fire").unwrap().category, TagCategory::DamageType);
        assert_eq!(registry.get_definition("aoe").unwrap().name, "circle");
        assert_eq!(registry.canonical_name("line"), Some("beam"));
        assert!(registry.get_definition("bogus").is_none());
    }

    #[test]
    fn test_default_params() {
        let registry = small_registry();
        assert_eq!(registry.get_default_params("burn").f64_or("burn_duration", 0.0), 3.0);
        assert!(registry.get_default_params("nothing").is_empty());
    }

    #[test]
    fn test_conflicts_are_symmetric() {
        let registry = small_registry();
        assert!(registry.conflicts_between("burn", "freeze"));
        assert!(registry.conflicts_between("freeze", "burn"));
        assert!(!registry.conflicts_between("fire", "burn"));
        assert_eq!(registry.geometry_rank("beam"), Some(0));
        assert_eq!(registry.geometry_rank("circle"), Some(1));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let err = TagRegistry::from_json_str(r#"{"tags": {"fire": {"category": 3}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_unknown_auto_apply_target() {
        let err = TagRegistry::from_json_str(
            r#"{"tags": {"fire": {"category": "damage_type", "auto_apply_status": "burn", "auto_apply_chance": 0.5}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref tag, .. } if tag == "fire"));
    }

    #[test]
    fn test_auto_apply_must_be_status() {
        let err = TagRegistry::from_json_str(
            r#"{"tags": {
                "fire": {"category": "damage_type", "auto_apply_status": "ice", "auto_apply_chance": 0.5},
                "ice": {"category": "damage_type"}
            }}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_alias_collision() {
        let err = TagRegistry::from_definitions(
            [
                TagDefinition::new("circle", TagCategory::Geometry).with_alias("aoe"),
                TagDefinition::new("aoe", TagCategory::Geometry),
            ],
            ConflictRules::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_priority_must_name_geometry() {
        let err = TagRegistry::from_definitions(
            [TagDefinition::new("fire", TagCategory::DamageType)],
            ConflictRules {
                geometry_priority: vec!["fire".into()],
                ..ConflictRules::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Conflicts(_)));
    }

    #[test]
    fn test_exclusion_of_undefined_tag() {
        let mut exclusive = FxHashMap::default();
        exclusive.insert("fire".to_string(), vec!["water".to_string()]);
        let err = TagRegistry::from_definitions(
            [TagDefinition::new("fire", TagCategory::DamageType)],
            ConflictRules {
                geometry_priority: Vec::new(),
                mutually_exclusive: exclusive,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Conflicts(_)));
    }

    #[test]
    fn test_duplicate_definition() {
        let err = TagRegistry::from_definitions(
            [
                TagDefinition::new("fire", TagCategory::DamageType),
                TagDefinition::new("fire", TagCategory::Special),
            ],
            ConflictRules {
                geometry_priority: Vec::new(),
                ..ConflictRules::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_missing_file() {
        let err = TagRegistry::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_builtin_loads() {
        let registry = TagRegistry::builtin().unwrap();
        assert!(registry.contains("fire"));
        assert!(registry.contains("chain"));
        assert_eq!(registry.canonical_name("aoe"), Some("circle"));
        assert_eq!(registry.canonical_name("vampiric"), Some("lifesteal"));
        assert!(registry.find_by_category(TagCategory::Geometry).count() >= 6);
    }
}
