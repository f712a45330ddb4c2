//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use combat_tags::core::{BasicEntity, Capabilities, EngineConfig, EntityId, EntityKind, EntityMap, planar};
use combat_tags::effects::EffectExecutor;
use combat_tags::tags::TagRegistry;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// Install a test subscriber once; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .compact()
            .try_init();
    });
}

pub fn registry() -> Arc<TagRegistry> {
    Arc::new(TagRegistry::builtin().expect("bundled tag data must load"))
}

pub fn executor(seed: u64) -> EffectExecutor {
    init_tracing();
    EffectExecutor::new(registry(), EngineConfig::default().with_seed(seed))
}

pub fn player(id: u32, x: f64, z: f64) -> BasicEntity {
    BasicEntity::new(EntityId(id), EntityKind::Player, planar(x, z))
}

pub fn enemy(id: u32, x: f64, z: f64) -> BasicEntity {
    BasicEntity::new(EntityId(id), EntityKind::Enemy, planar(x, z))
}

pub fn turret(id: u32, x: f64, z: f64) -> BasicEntity {
    BasicEntity::new(EntityId(id), EntityKind::Device, planar(x, z)).with_category("turret")
}

/// Every capability switched off.
pub fn inert() -> Capabilities {
    Capabilities {
        position: false,
        damage_channel: false,
        heal_channel: false,
        health_fields: false,
        status_manager: false,
        movement: false,
        forced_motion: false,
    }
}

pub fn world(entities: impl IntoIterator<Item = BasicEntity>) -> EntityMap<BasicEntity> {
    entities.into_iter().collect()
}
