//! Reference combatant implementing every capability.
//!
//! `BasicEntity` is what a host without its own entity model can plug in
//! directly, and what the engine's tests run against. Capabilities can be
//! switched off individually to model partially-capable targets.

use serde::{Deserialize, Serialize};

use super::entity::{
    Combatant, DamageHit, Damageable, EntityId, EntityKind, ForcedMotion, Healable, HealthPool,
    Movable, StatusCapable, Vitals,
};
use super::math::Vec3;
use super::params::Params;

/// A status applied through the status manager.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedStatus {
    pub tag: String,
    pub params: Params,
}

/// A damage event as received by a `BasicEntity`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedHit {
    pub amount: f64,
    pub damage_type: String,
    pub source: EntityId,
    pub critical: bool,
}

/// Which optional capabilities a `BasicEntity` exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub position: bool,
    pub damage_channel: bool,
    pub heal_channel: bool,
    pub health_fields: bool,
    pub status_manager: bool,
    pub movement: bool,
    pub forced_motion: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            position: true,
            damage_channel: true,
            heal_channel: true,
            health_fields: true,
            status_manager: true,
            movement: true,
            forced_motion: true,
        }
    }
}

/// General-purpose combatant.
#[derive(Clone, Debug)]
pub struct BasicEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub category: Option<String>,
    pub position: Vec3,
    pub facing: Option<Vec3>,
    pub health: f64,
    pub max_health: f64,
    pub capabilities: Capabilities,

    /// Statuses applied, in order.
    pub statuses: Vec<AppliedStatus>,
    /// Damage received, in order.
    pub hits: Vec<ReceivedHit>,
    /// Last forced velocity and its duration.
    pub forced_velocity: Option<(Vec3, f64)>,
}

impl BasicEntity {
    /// Create an entity with 100/100 health and every capability enabled.
    #[must_use]
    pub fn new(id: EntityId, kind: EntityKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            category: None,
            position,
            facing: None,
            health: 100.0,
            max_health: 100.0,
            capabilities: Capabilities::default(),
            statuses: Vec::new(),
            hits: Vec::new(),
            forced_velocity: None,
        }
    }

    /// Set the category string (builder pattern).
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set current and maximum health (builder pattern).
    #[must_use]
    pub fn with_health(mut self, current: f64, max: f64) -> Self {
        self.health = current;
        self.max_health = max;
        self
    }

    #[must_use]
    pub fn with_facing(mut self, facing: Vec3) -> Self {
        self.facing = Some(facing);
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Total damage received so far.
    #[must_use]
    pub fn damage_taken(&self) -> f64 {
        self.hits.iter().map(|h| h.amount).sum()
    }

    /// Whether a status with `tag` has been applied.
    #[must_use]
    pub fn has_status(&self, tag: &str) -> bool {
        self.statuses.iter().any(|s| s.tag == tag)
    }

    #[must_use]
    pub fn status(&self, tag: &str) -> Option<&AppliedStatus> {
        self.statuses.iter().find(|s| s.tag == tag)
    }
}

impl Combatant for BasicEntity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn position(&self) -> Option<Vec3> {
        self.capabilities.position.then_some(self.position)
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn facing(&self) -> Option<Vec3> {
        self.facing
    }

    fn vitals(&self) -> Option<Vitals> {
        self.capabilities.health_fields.then_some(Vitals {
            current: self.health,
            max: self.max_health,
        })
    }

    fn as_damageable(&mut self) -> Option<&mut dyn Damageable> {
        if self.capabilities.damage_channel {
            Some(self)
        } else {
            None
        }
    }

    fn as_healable(&mut self) -> Option<&mut dyn Healable> {
        if self.capabilities.heal_channel {
            Some(self)
        } else {
            None
        }
    }

    fn as_health_pool(&mut self) -> Option<&mut dyn HealthPool> {
        if self.capabilities.health_fields {
            Some(self)
        } else {
            None
        }
    }

    fn as_status_capable(&mut self) -> Option<&mut dyn StatusCapable> {
        if self.capabilities.status_manager {
            Some(self)
        } else {
            None
        }
    }

    fn as_movable(&mut self) -> Option<&mut dyn Movable> {
        if self.capabilities.movement {
            Some(self)
        } else {
            None
        }
    }

    fn as_forced_motion(&mut self) -> Option<&mut dyn ForcedMotion> {
        if self.capabilities.forced_motion {
            Some(self)
        } else {
            None
        }
    }
}

impl Damageable for BasicEntity {
    fn take_damage(&mut self, hit: &DamageHit<'_>) {
        self.health = (self.health - hit.amount).max(0.0);
        self.hits.push(ReceivedHit {
            amount: hit.amount,
            damage_type: hit.damage_type.to_string(),
            source: hit.source,
            critical: hit.critical,
        });
    }
}

impl Healable for BasicEntity {
    fn heal(&mut self, amount: f64) {
        self.health = (self.health + amount).min(self.max_health);
    }
}

impl HealthPool for BasicEntity {
    fn health(&self) -> f64 {
        self.health
    }

    fn max_health(&self) -> f64 {
        self.max_health
    }

    fn set_health(&mut self, value: f64) {
        self.health = value;
    }
}

impl StatusCapable for BasicEntity {
    fn apply_status(&mut self, tag: &str, params: &Params) {
        self.statuses.push(AppliedStatus {
            tag: tag.to_string(),
            params: params.clone(),
        });
    }
}

impl Movable for BasicEntity {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

impl ForcedMotion for BasicEntity {
    fn apply_forced_velocity(&mut self, velocity: Vec3, duration: f64) {
        self.forced_velocity = Some((velocity, duration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targeting::TargetContext;

    #[test]
    fn test_damage_and_heal_clamp() {
        let mut e = BasicEntity::new(EntityId(1), EntityKind::Enemy, Vec3::ZERO).with_health(30.0, 100.0);
        let context = TargetContext::Enemy;
        let tags = vec!["fire".to_string()];
        e.take_damage(&DamageHit {
            amount: 50.0,
            damage_type: "fire",
            source: EntityId(0),
            tags: &tags,
            context: &context,
            critical: false,
        });
        assert_eq!(e.health, 0.0);
        assert_eq!(e.damage_taken(), 50.0);

        e.heal(500.0);
        assert_eq!(e.health, 100.0);
    }

    #[test]
    fn test_disabled_capabilities() {
        let mut e = BasicEntity::new(EntityId(1), EntityKind::Device, Vec3::ZERO).with_capabilities(
            Capabilities {
                status_manager: false,
                movement: false,
                position: false,
                ..Capabilities::default()
            },
        );
        assert!(e.as_status_capable().is_none());
        assert!(e.as_movable().is_none());
        assert!(e.position().is_none());
        assert!(e.as_damageable().is_some());
    }
}
