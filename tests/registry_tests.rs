//! Tag data loading and parsing integration tests.

mod common;

use std::sync::Arc;

use combat_tags::core::{ConfigError, EngineConfig, Params};
use combat_tags::tags::{TagCategory, TagParser, TagRegistry};
use combat_tags::targeting::{Geometry, TargetContext};
use tempfile::TempDir;

#[test]
fn test_load_from_path() {
    common::init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tags.json");
    std::fs::write(
        &path,
        r#"{
            "tags": {
                "frost": { "category": "damage_type", "auto_apply_status": "chill", "auto_apply_chance": 0.5 },
                "chill": { "category": "status_debuff", "default_params": { "chill_duration": 2.0 } },
                "nova": { "category": "geometry" }
            }
        }"#,
    )
    .unwrap();

    let registry = TagRegistry::from_path(&path).unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.get_default_params("chill").f64_or("chill_duration", 0.0), 2.0);
    assert!(registry.geometry_priority().is_empty());
}

#[test]
fn test_malformed_documents_fail_at_load() {
    let cases = [
        ("not json", "{ tags: "),
        ("unknown category", r#"{ "tags": { "x": { "category": "weather" } } }"#),
        (
            "chance out of range",
            r#"{ "tags": {
                "fire": { "category": "damage_type", "auto_apply_status": "burn", "auto_apply_chance": 1.5 },
                "burn": { "category": "status_debuff" } } }"#,
        ),
        (
            "auto-apply target missing",
            r#"{ "tags": { "fire": { "category": "damage_type", "auto_apply_status": "burn", "auto_apply_chance": 0.1 } } }"#,
        ),
        (
            "auto-apply target not a status",
            r#"{ "tags": {
                "fire": { "category": "damage_type", "auto_apply_status": "ice", "auto_apply_chance": 0.1 },
                "ice": { "category": "damage_type" } } }"#,
        ),
        (
            "negative multiplier",
            r#"{ "tags": { "fire": { "category": "damage_type",
                "context_behavior": { "beast": { "damage_multiplier": -1.0 } } } } }"#,
        ),
        (
            "priority names a damage tag",
            r#"{ "tags": { "fire": { "category": "damage_type" } },
                 "conflicts": { "geometry_priority": ["fire"] } }"#,
        ),
    ];

    for (label, json) in cases {
        assert!(TagRegistry::from_json_str(json).is_err(), "{label} should be rejected");
    }
}

#[test]
fn test_io_error_names_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing_tags.json");
    let err = TagRegistry::from_path(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("missing_tags.json"));
}

#[test]
fn test_builtin_vocabulary() {
    let registry = common::registry();
    for geometry in ["single_target", "chain", "cone", "circle", "beam", "pierce"] {
        let def = registry.get_definition(geometry).unwrap();
        assert_eq!(def.category, TagCategory::Geometry);
        assert!(Geometry::from_tag(geometry).is_some());
    }
    for context in ["self", "enemy", "ally", "player", "turret", "construct", "undead", "mechanical", "all"] {
        assert_eq!(registry.get_definition(context).unwrap().category, TagCategory::Context);
        assert_ne!(TargetContext::from_name(context), TargetContext::Other(context.to_string()));
    }
    assert!(registry.conflicts_between("1h", "2h"));
    assert!(registry.conflicts_between("freeze", "burn"));
}

#[test]
fn test_parse_full_ability() {
    let parser = TagParser::new(common::registry());
    let overrides = Params::new().with("baseDamage", 35.0).with("cone_angle", 90.0);

    let config = parser.parse(&["Frost", "cone", "chain", "slow", "crit", "on_hit", "1h"], &overrides);

    assert_eq!(config.geometry, Geometry::Cone);
    assert_eq!(config.damage_tags.as_slice(), ["ice".to_string()]);
    assert_eq!(config.status_tags.as_slice(), ["chill".to_string()]);
    assert_eq!(config.special_tags.as_slice(), ["critical".to_string()]);
    assert_eq!(config.context, TargetContext::Enemy);
    assert_eq!(config.base_damage, 35.0);
    assert_eq!(config.params.f64_or("cone_angle", 0.0), 90.0);
    assert_eq!(config.params.f64_or("chain_range", 0.0), 5.0);
    assert!(config.has_tag("on_hit") && config.has_tag("1h"));
}

#[test]
fn test_shared_registry_across_threads() {
    let registry: Arc<TagRegistry> = common::registry();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || TagParser::new(registry).parse(&["fire", "aoe"], &Params::new()).geometry)
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Geometry::Circle);
    }
}

#[test]
fn test_engine_config_json() {
    let config = EngineConfig::default().with_seed(7).with_hostile_category("demon");
    let json = serde_json::to_string(&config).unwrap();
    let back: EngineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let partial: EngineConfig = serde_json::from_str(r#"{ "seed": 9 }"#).unwrap();
    assert_eq!(partial.seed, 9);
    assert!(partial.is_hostile_category("undead"));
}
