//! Entity identification and capability traits.
//!
//! The engine never owns combatants. Hosts keep them in their own storage and
//! expose them through [`World`](super::World) by `EntityId`. What an entity
//! can do is discovered through the `as_*` accessors on [`Combatant`]: every
//! accessor defaults to `None`, so a turret that cannot move or a training
//! dummy without a status manager simply leaves those out.
//!
//! ## Usage
//!
//! ```
//! use combat_tags::core::{planar, Combatant, EntityId, EntityKind, Vec3};
//!
//! struct Crate { id: EntityId, at: Vec3 }
//!
//! impl Combatant for Crate {
//!     fn id(&self) -> EntityId { self.id }
//!     fn kind(&self) -> EntityKind { EntityKind::Neutral }
//!     fn position(&self) -> Option<Vec3> { Some(self.at) }
//! }
//!
//! let c = Crate { id: EntityId(7), at: planar(1.0, 2.0) };
//! assert!(c.category().is_none());
//! ```

use serde::{Deserialize, Serialize};

use super::math::Vec3;
use super::params::Params;
use crate::targeting::TargetContext;

/// Unique identifier for any combat entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Broad allegiance of an entity, independent of its category string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The player character.
    Player,
    /// Player-placed turrets, traps and bombs.
    Device,
    /// Any other friendly unit (summons, escorts).
    Ally,
    /// Hostile creatures.
    Enemy,
    /// Anything else (props, destructibles).
    #[default]
    Neutral,
}

/// Current and maximum health, as read by execute thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub current: f64,
    pub max: f64,
}

impl Vitals {
    /// Health fraction in `[0, 1]`; a non-positive max reads as full health.
    #[must_use]
    pub fn fraction(self) -> f64 {
        if self.max <= 0.0 {
            1.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

/// One damage application, as delivered to [`Damageable::take_damage`].
#[derive(Clone, Debug)]
pub struct DamageHit<'a> {
    pub amount: f64,
    /// Damage type tag (`fire`, `physical`, `execute`, ...).
    pub damage_type: &'a str,
    pub source: EntityId,
    /// Every tag of the effect that produced this hit.
    pub tags: &'a [String],
    /// Context the effect was resolved in, after any hostile-source flip.
    pub context: &'a TargetContext,
    pub critical: bool,
}

/// Preferred damage channel.
pub trait Damageable {
    fn take_damage(&mut self, hit: &DamageHit<'_>);
}

/// Preferred heal channel.
pub trait Healable {
    fn heal(&mut self, amount: f64);
}

/// Raw health fields, used when an entity has no dedicated damage/heal channel.
pub trait HealthPool {
    fn health(&self) -> f64;
    fn max_health(&self) -> f64;
    fn set_health(&mut self, value: f64);
}

/// Status manager.
pub trait StatusCapable {
    /// Apply (or refresh) status `tag` with fully merged parameters.
    fn apply_status(&mut self, tag: &str, params: &Params);
}

/// Direct position writes (pull, teleport, dash fallback).
pub trait Movable {
    fn set_position(&mut self, position: Vec3);
}

/// Forced-movement velocity (knockback, smooth dash).
pub trait ForcedMotion {
    /// Push the entity with `velocity` (units/second) for `duration` seconds.
    fn apply_forced_velocity(&mut self, velocity: Vec3, duration: f64);
}

/// Capability surface of a combat entity.
///
/// Only `id` and `kind` are required. A missing position is tolerated (the
/// finder falls back to the origin and warns), every other capability
/// degrades its sub-step to a logged no-op.
pub trait Combatant {
    fn id(&self) -> EntityId;

    fn kind(&self) -> EntityKind;

    fn position(&self) -> Option<Vec3> {
        None
    }

    /// Category string (`beast`, `undead`, `construct`, `player`, ...).
    fn category(&self) -> Option<&str> {
        None
    }

    /// Direction the entity is looking, if it tracks one.
    fn facing(&self) -> Option<Vec3> {
        None
    }

    fn vitals(&self) -> Option<Vitals> {
        None
    }

    fn as_damageable(&mut self) -> Option<&mut dyn Damageable> {
        None
    }

    fn as_healable(&mut self) -> Option<&mut dyn Healable> {
        None
    }

    fn as_health_pool(&mut self) -> Option<&mut dyn HealthPool> {
        None
    }

    fn as_status_capable(&mut self) -> Option<&mut dyn StatusCapable> {
        None
    }

    fn as_movable(&mut self) -> Option<&mut dyn Movable> {
        None
    }

    fn as_forced_motion(&mut self) -> Option<&mut dyn ForcedMotion> {
        None
    }
}
