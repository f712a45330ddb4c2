//! # combat-tags
//!
//! A data-driven combat effect engine. Abilities are written as lists of
//! declarative tags (`["fire", "circle", "burn"]`) plus a few numeric
//! parameters; the engine turns them into targets, damage, healing, statuses
//! and special mechanics.
//!
//! ## Design Principles
//!
//! 1. **Content Over Code**: Tag behavior, defaults, immunities and conflict
//!    rules live in the tag data, loaded once into a `TagRegistry`.
//!
//! 2. **Degrade, Never Abort**: Unknown tags, unknown geometries and missing
//!    entity capabilities reduce to logged no-ops. Only loading tag data can fail.
//!
//! 3. **Capabilities, Not Types**: Hosts opt entities into damage, healing,
//!    statuses and movement through the `Combatant` capability accessors.
//!
//! ## Architecture
//!
//! - **Shared Registry**: One `Arc<TagRegistry>` is injected into the parser
//!   and executor; it is immutable after load.
//!
//! - **Persistent Params**: Parameter maps use `im-rs`, so per-target and
//!   per-status merges clone in O(1).
//!
//! - **Deterministic Rolls**: Crit and auto-apply chances draw from one seeded
//!   ChaCha RNG per executor.
//!
//! ## Modules
//!
//! - `core`: Entity IDs and capability traits, math, params, RNG, configuration
//! - `tags`: Tag definitions, the registry and the parser
//! - `targeting`: Contexts, geometries and the target finder
//! - `effects`: The executor and its outcome log

pub mod core;
pub mod effects;
pub mod tags;
pub mod targeting;

// Re-export commonly used types
pub use crate::core::{
    BasicEntity, Combatant, ConfigError, EffectRng, EffectRngState, EngineConfig, EntityId,
    EntityKind, EntityMap, ParamValue, Params, Vec3, World,
};

pub use crate::tags::{EffectConfig, TagCategory, TagDefinition, TagParser, TagRegistry};

pub use crate::targeting::{Geometry, TargetContext, TargetFinder, TargetQuery};

pub use crate::effects::{EffectContext, EffectExecutor, EffectOutcome, EffectRequest, Mechanic};
