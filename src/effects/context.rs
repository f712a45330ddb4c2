//! Per-invocation effect record.

use serde::Serialize;

use crate::core::{EntityId, Vec3};
use crate::tags::EffectConfig;
use crate::targeting::TargetContext;

/// One observable thing an execution did, or declined to do.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectOutcome {
    Damage {
        target: EntityId,
        amount: f64,
        damage_type: String,
        critical: bool,
    },
    /// A damage tag's context behavior turned the hit into healing.
    ConvertedToHealing {
        target: EntityId,
        amount: f64,
        damage_type: String,
    },
    Healing {
        target: EntityId,
        amount: f64,
    },
    StatusApplied {
        target: EntityId,
        status: String,
        /// Rolled from a damage tag's `auto_apply_status`.
        auto: bool,
    },
    ImmunityBlocked {
        target: EntityId,
        status: String,
    },
    Lifesteal {
        source: EntityId,
        amount: f64,
    },
    /// Forced-motion velocity handed to an entity (knockback, dash).
    Pushed {
        entity: EntityId,
        velocity: Vec3,
        duration: f64,
    },
    /// Instant reposition (pull, teleport, dash fallback).
    Moved {
        entity: EntityId,
        from: Vec3,
        to: Vec3,
        mechanic: &'static str,
    },
    Skipped {
        entity: Option<EntityId>,
        step: &'static str,
        reason: String,
    },
}

impl EffectOutcome {
    pub(crate) fn skipped(entity: Option<EntityId>, step: &'static str, reason: impl Into<String>) -> Self {
        EffectOutcome::Skipped {
            entity,
            step,
            reason: reason.into(),
        }
    }
}

/// What one `execute_effect` call resolved and did.
#[derive(Clone, Debug, Serialize)]
pub struct EffectContext {
    pub source: EntityId,
    pub primary_target: Option<EntityId>,
    pub config: EffectConfig,
    /// Context after the hostile-source flip.
    pub context: TargetContext,
    /// Resolved targets in application order.
    pub targets: Vec<EntityId>,
    pub timestamp: f64,
    pub outcomes: Vec<EffectOutcome>,
}

impl EffectContext {
    /// Falloff multiplier for the target at `index`.
    #[must_use]
    pub fn magnitude(&self, index: usize) -> f64 {
        self.config.geometry.magnitude(index, &self.config.params)
    }

    /// Magnitudes of every resolved target, in order.
    #[must_use]
    pub fn magnitudes(&self) -> Vec<f64> {
        (0..self.targets.len()).map(|i| self.magnitude(i)).collect()
    }

    /// Total damage dealt to `target`, execute bonuses included.
    #[must_use]
    pub fn damage_to(&self, target: EntityId) -> f64 {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                EffectOutcome::Damage { target: t, amount, .. } if *t == target => Some(*amount),
                _ => None,
            })
            .sum()
    }

    /// Total healing received by `entity`, from any mechanic.
    #[must_use]
    pub fn healing_to(&self, entity: EntityId) -> f64 {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                EffectOutcome::Healing { target, amount } if *target == entity => Some(*amount),
                EffectOutcome::ConvertedToHealing { target, amount, .. } if *target == entity => {
                    Some(*amount)
                }
                EffectOutcome::Lifesteal { source, amount } if *source == entity => Some(*amount),
                _ => None,
            })
            .sum()
    }

    #[must_use]
    pub fn total_damage(&self) -> f64 {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                EffectOutcome::Damage { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum()
    }

    /// Statuses that landed on `target`, in application order.
    #[must_use]
    pub fn statuses_on(&self, target: EntityId) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                EffectOutcome::StatusApplied { target: t, status, .. } if *t == target => {
                    Some(status.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Sub-steps that degraded to a no-op.
    pub fn skipped(&self) -> impl Iterator<Item = &EffectOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, EffectOutcome::Skipped { .. }))
    }

    #[must_use]
    pub fn hit(&self, target: EntityId) -> bool {
        self.targets.contains(&target)
    }
}
