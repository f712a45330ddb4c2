//! Capability-aware access to damage, heal and status channels.
//!
//! Each helper tries the preferred capability first, falls back where a
//! fallback exists, and otherwise logs a missing-capability warning and
//! records a `Skipped` outcome. None of them can fail the call.

use tracing::warn;

use super::context::EffectOutcome;
use crate::core::{DamageHit, EntityId, EntityKind, Params, Vec3, World};
use crate::targeting::finder::position_or_origin;

/// Record a degraded sub-step.
pub(crate) fn skip(
    log: &mut Vec<EffectOutcome>,
    entity: Option<EntityId>,
    step: &'static str,
    reason: impl Into<String>,
) {
    log.push(EffectOutcome::skipped(entity, step, reason));
}

/// Warn about a missing capability and record the skip.
pub(crate) fn missing(log: &mut Vec<EffectOutcome>, entity: EntityId, step: &'static str, capability: &str) {
    warn!(
        entity = %entity,
        step,
        capability,
        kind = "missing_capability",
        "entity lacks capability, skipping"
    );
    skip(log, Some(entity), step, format!("no {capability}"));
}

/// Category used for context behaviors and immunities.
///
/// Entities without a category string are keyed by their kind.
pub(crate) fn category_of<W: World + ?Sized>(world: &W, id: EntityId) -> Option<String> {
    let entity = world.entity(id)?;
    let category = match entity.category() {
        Some(category) => category,
        None => match entity.kind() {
            EntityKind::Player => "player",
            EntityKind::Device => "turret",
            EntityKind::Ally => "ally",
            EntityKind::Enemy => "enemy",
            EntityKind::Neutral => "neutral",
        },
    };
    Some(category.to_string())
}

/// Position of an entity that exists; unknown ids yield `None`.
pub(crate) fn position_of<W: World + ?Sized>(world: &W, id: EntityId) -> Option<Vec3> {
    world.entity(id).map(position_or_origin)
}

/// Health fraction before anything in this call touched the entity.
pub(crate) fn health_fraction<W: World + ?Sized>(world: &W, id: EntityId) -> Option<f64> {
    world.entity(id)?.vitals().map(|v| v.fraction())
}

/// Deal `hit` to `target` through its damage channel or raw health.
///
/// Returns the amount dealt (zero when skipped).
pub(crate) fn deal_damage<W: World + ?Sized>(
    world: &mut W,
    target: EntityId,
    hit: &DamageHit<'_>,
    log: &mut Vec<EffectOutcome>,
) -> f64 {
    let Some(entity) = world.entity_mut(target) else {
        skip(log, Some(target), "damage", "entity not found");
        return 0.0;
    };

    if let Some(channel) = entity.as_damageable() {
        channel.take_damage(hit);
    } else if let Some(pool) = entity.as_health_pool() {
        let health = pool.health();
        pool.set_health((health - hit.amount).max(0.0));
    } else {
        missing(log, target, "damage", "damage channel");
        return 0.0;
    }

    log.push(EffectOutcome::Damage {
        target,
        amount: hit.amount,
        damage_type: hit.damage_type.to_string(),
        critical: hit.critical,
    });
    hit.amount
}

/// Restore health through the heal channel or raw health fields.
///
/// Returns `false` (after recording the skip) when neither exists.
pub(crate) fn restore<W: World + ?Sized>(
    world: &mut W,
    target: EntityId,
    amount: f64,
    step: &'static str,
    log: &mut Vec<EffectOutcome>,
) -> bool {
    let Some(entity) = world.entity_mut(target) else {
        skip(log, Some(target), step, "entity not found");
        return false;
    };

    if let Some(channel) = entity.as_healable() {
        channel.heal(amount);
    } else if let Some(pool) = entity.as_health_pool() {
        let max = pool.max_health();
        let health = pool.health();
        pool.set_health((health + amount).min(max));
    } else {
        missing(log, target, step, "heal channel");
        return false;
    }
    true
}

/// Plain healing, recorded as `Healing`.
pub(crate) fn heal<W: World + ?Sized>(
    world: &mut W,
    target: EntityId,
    amount: f64,
    log: &mut Vec<EffectOutcome>,
) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }
    if restore(world, target, amount, "healing", log) {
        log.push(EffectOutcome::Healing { target, amount });
        amount
    } else {
        0.0
    }
}

/// Hand `status` to the target's status manager.
pub(crate) fn apply_status<W: World + ?Sized>(
    world: &mut W,
    target: EntityId,
    status: &str,
    params: &Params,
    auto: bool,
    log: &mut Vec<EffectOutcome>,
) -> bool {
    let Some(entity) = world.entity_mut(target) else {
        skip(log, Some(target), "status", "entity not found");
        return false;
    };
    let Some(manager) = entity.as_status_capable() else {
        missing(log, target, "status", "status manager");
        return false;
    };

    manager.apply_status(status, params);
    log.push(EffectOutcome::StatusApplied {
        target,
        status: status.to_string(),
        auto,
    });
    true
}
