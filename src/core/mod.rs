//! Core engine types: entities and capabilities, math, params, RNG, configuration.
//!
//! Everything here is independent of tags. The tag layer (`tags`), target
//! selection (`targeting`) and execution (`effects`) build on these.

pub mod basic;
pub mod config;
pub mod entity;
pub mod error;
pub mod math;
pub mod params;
pub mod rng;
pub mod world;

pub use basic::{AppliedStatus, BasicEntity, Capabilities, ReceivedHit};
pub use config::EngineConfig;
pub use entity::{
    Combatant, DamageHit, Damageable, EntityId, EntityKind, ForcedMotion, Healable, HealthPool,
    Movable, StatusCapable, Vitals,
};
pub use error::ConfigError;
pub use math::{angle_between_deg, direction_to, planar, project_onto_ray, RayProjection, Vec3};
pub use params::{ParamValue, Params};
pub use rng::{EffectRng, EffectRngState};
pub use world::{EntityMap, World};
