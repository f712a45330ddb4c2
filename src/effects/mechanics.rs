//! Special mechanics dispatched by tag name.
//!
//! Per-target mechanics (lifesteal, knockback, pull, execute) run once for
//! every resolved target. Source mechanics (teleport, dash, phase) move or
//! change the caster and run once per effect, anchored on the primary target.
//! `critical` and `heal` are specials too, but they are consumed by the damage
//! and healing steps and have nothing to dispatch here.

use tracing::{debug, warn};

use super::channels::{self, missing, position_of, skip};
use super::context::EffectOutcome;
use crate::core::{direction_to, DamageHit, EntityId, Params, Vec3, World};
use crate::targeting::TargetContext;

/// Every special tag with engine behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mechanic {
    Critical,
    Heal,
    Lifesteal,
    Knockback,
    Pull,
    Execute,
    Teleport,
    Dash,
    Phase,
}

impl Mechanic {
    /// Map a canonical special tag to its mechanic.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "critical" => Some(Mechanic::Critical),
            "heal" => Some(Mechanic::Heal),
            "lifesteal" => Some(Mechanic::Lifesteal),
            "knockback" => Some(Mechanic::Knockback),
            "pull" => Some(Mechanic::Pull),
            "execute" => Some(Mechanic::Execute),
            "teleport" => Some(Mechanic::Teleport),
            "dash" => Some(Mechanic::Dash),
            "phase" => Some(Mechanic::Phase),
            _ => None,
        }
    }

    /// Runs once per resolved target.
    #[must_use]
    pub const fn is_per_target(self) -> bool {
        matches!(
            self,
            Mechanic::Lifesteal | Mechanic::Knockback | Mechanic::Pull | Mechanic::Execute
        )
    }

    /// Runs once per effect, on the source.
    #[must_use]
    pub const fn is_source(self) -> bool {
        matches!(self, Mechanic::Teleport | Mechanic::Dash | Mechanic::Phase)
    }
}

/// Everything a per-target mechanic may read.
pub(crate) struct Strike<'a> {
    pub source: EntityId,
    pub target: EntityId,
    pub magnitude: f64,
    /// Damage dealt to `target` by the damage step of this call.
    pub dealt: f64,
    /// Target health fraction before the damage step.
    pub health_before: Option<f64>,
    pub base_damage: f64,
    pub params: &'a Params,
    pub tags: &'a [String],
    pub context: &'a TargetContext,
}

/// Run a per-target mechanic.
pub(crate) fn apply_per_target<W: World + ?Sized>(
    mechanic: Mechanic,
    world: &mut W,
    strike: &Strike<'_>,
    log: &mut Vec<EffectOutcome>,
) {
    match mechanic {
        Mechanic::Lifesteal => lifesteal(world, strike, log),
        Mechanic::Knockback => knockback(world, strike, log),
        Mechanic::Pull => pull(world, strike, log),
        Mechanic::Execute => execute(world, strike, log),
        _ => {}
    }
}

/// Run a source mechanic towards `anchor`.
pub(crate) fn apply_to_source<W: World + ?Sized>(
    mechanic: Mechanic,
    world: &mut W,
    source: EntityId,
    anchor: Option<EntityId>,
    params: &Params,
    log: &mut Vec<EffectOutcome>,
) {
    match mechanic {
        Mechanic::Teleport => teleport(world, source, anchor, params, log),
        Mechanic::Dash => dash(world, source, anchor, params, log),
        Mechanic::Phase => phase(world, source, params, log),
        _ => {}
    }
}

fn lifesteal<W: World + ?Sized>(world: &mut W, strike: &Strike<'_>, log: &mut Vec<EffectOutcome>) {
    let amount = strike.dealt * strike.params.f64_or("lifesteal_percent", 0.15);
    if amount <= 0.0 {
        return;
    }
    if channels::restore(world, strike.source, amount, "lifesteal", log) {
        debug!(source = %strike.source, amount, "lifesteal");
        log.push(EffectOutcome::Lifesteal {
            source: strike.source,
            amount,
        });
    }
}

fn knockback<W: World + ?Sized>(world: &mut W, strike: &Strike<'_>, log: &mut Vec<EffectOutcome>) {
    let (Some(from), Some(to)) = (position_of(world, strike.source), position_of(world, strike.target)) else {
        skip(log, Some(strike.target), "knockback", "entity not found");
        return;
    };
    let Some(direction) = direction_to(from, to) else {
        skip(log, Some(strike.target), "knockback", "target overlaps source");
        return;
    };

    let distance = strike.params.f64_or("knockback_distance", 2.0);
    let duration = strike.params.f64_or("knockback_duration", 0.5);
    if duration <= 0.0 {
        skip(log, Some(strike.target), "knockback", "non-positive duration");
        return;
    }
    let velocity = direction * (distance / duration);

    let Some(entity) = world.entity_mut(strike.target) else {
        return;
    };
    match entity.as_forced_motion() {
        Some(motion) => {
            motion.apply_forced_velocity(velocity, duration);
            log.push(EffectOutcome::Pushed {
                entity: strike.target,
                velocity,
                duration,
            });
        }
        None => missing(log, strike.target, "knockback", "forced motion"),
    }
}

fn pull<W: World + ?Sized>(world: &mut W, strike: &Strike<'_>, log: &mut Vec<EffectOutcome>) {
    let (Some(anchor), Some(from)) = (position_of(world, strike.source), position_of(world, strike.target)) else {
        skip(log, Some(strike.target), "pull", "entity not found");
        return;
    };
    let to = from.move_towards(anchor, strike.params.f64_or("pull_distance", 2.0).max(0.0));
    move_entity(world, strike.target, from, to, "pull", log);
}

fn execute<W: World + ?Sized>(world: &mut W, strike: &Strike<'_>, log: &mut Vec<EffectOutcome>) {
    let Some(fraction) = strike.health_before else {
        missing(log, strike.target, "execute", "health readout");
        return;
    };
    let threshold = strike.params.f64_or("threshold_hp", 0.2);
    if fraction > threshold {
        return;
    }

    let multiplier = strike
        .params
        .first_f64_or(&["bonus_damage", "bonus_damage_multiplier"], 2.0);
    let bonus = strike.base_damage * strike.magnitude * (multiplier - 1.0);
    if bonus <= 0.0 {
        return;
    }

    debug!(target = %strike.target, fraction, bonus, "execute threshold met");
    let hit = DamageHit {
        amount: bonus,
        damage_type: "execute",
        source: strike.source,
        tags: strike.tags,
        context: strike.context,
        critical: false,
    };
    channels::deal_damage(world, strike.target, &hit, log);
}

fn teleport<W: World + ?Sized>(
    world: &mut W,
    source: EntityId,
    anchor: Option<EntityId>,
    params: &Params,
    log: &mut Vec<EffectOutcome>,
) {
    let mode = params.text_or("teleport_type", "targeted");
    if mode != "targeted" {
        warn!(mode, kind = "unsupported_mode", "teleport mode not supported, skipping");
        skip(log, Some(source), "teleport", format!("unsupported mode {mode}"));
        return;
    }

    let Some((from, to)) = source_and_anchor(world, source, anchor) else {
        skip(log, Some(source), "teleport", "no destination");
        return;
    };
    let range = params.f64_or("teleport_range", 10.0);
    if from.distance(to) > range {
        debug!(source = %source, distance = from.distance(to), range, "teleport out of range");
        skip(log, Some(source), "teleport", "destination out of range");
        return;
    }
    move_entity(world, source, from, to, "teleport", log);
}

fn dash<W: World + ?Sized>(
    world: &mut W,
    source: EntityId,
    anchor: Option<EntityId>,
    params: &Params,
    log: &mut Vec<EffectOutcome>,
) {
    let Some((from, to)) = source_and_anchor(world, source, anchor) else {
        skip(log, Some(source), "dash", "no destination");
        return;
    };
    let travel = params.f64_or("dash_distance", 5.0).min(from.distance(to));
    let Some(direction) = direction_to(from, to) else {
        return;
    };
    if travel <= 0.0 {
        return;
    }

    let speed = params.f64_or("dash_speed", 20.0);
    let Some(entity) = world.entity_mut(source) else {
        return;
    };
    if speed > 0.0 {
        if let Some(motion) = entity.as_forced_motion() {
            let velocity = direction * speed;
            let duration = travel / speed;
            motion.apply_forced_velocity(velocity, duration);
            log.push(EffectOutcome::Pushed {
                entity: source,
                velocity,
                duration,
            });
            return;
        }
    }
    move_entity(world, source, from, from.move_towards(to, travel.max(0.0)), "dash", log);
}

fn phase<W: World + ?Sized>(world: &mut W, source: EntityId, params: &Params, log: &mut Vec<EffectOutcome>) {
    let status = Params::new()
        .with("phase_duration", params.f64_or("phase_duration", 2.0))
        .with("can_pass_walls", params.bool_or("can_pass_walls", false));
    channels::apply_status(world, source, "phase", &status, false, log);
}

fn source_and_anchor<W: World + ?Sized>(
    world: &W,
    source: EntityId,
    anchor: Option<EntityId>,
) -> Option<(Vec3, Vec3)> {
    let anchor = anchor.filter(|a| *a != source)?;
    Some((position_of(world, source)?, position_of(world, anchor)?))
}

fn move_entity<W: World + ?Sized>(
    world: &mut W,
    entity: EntityId,
    from: Vec3,
    to: Vec3,
    mechanic: &'static str,
    log: &mut Vec<EffectOutcome>,
) {
    let Some(combatant) = world.entity_mut(entity) else {
        skip(log, Some(entity), mechanic, "entity not found");
        return;
    };
    match combatant.as_movable() {
        Some(movable) => {
            movable.set_position(to);
            log.push(EffectOutcome::Moved {
                entity,
                from,
                to,
                mechanic,
            });
        }
        None => missing(log, entity, mechanic, "movement"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{planar, BasicEntity, Capabilities, EntityKind, EntityMap};

    const NO_TAGS: &[String] = &[];

    fn world() -> EntityMap<BasicEntity> {
        let mut world = EntityMap::new();
        world.insert(BasicEntity::new(EntityId(0), EntityKind::Player, Vec3::ZERO).with_health(50.0, 100.0));
        world.insert(BasicEntity::new(EntityId(1), EntityKind::Enemy, planar(4.0, 0.0)));
        world
    }

    fn strike<'a>(params: &'a Params, context: &'a TargetContext) -> Strike<'a> {
        Strike {
            source: EntityId(0),
            target: EntityId(1),
            magnitude: 1.0,
            dealt: 0.0,
            health_before: Some(1.0),
            base_damage: 0.0,
            params,
            tags: NO_TAGS,
            context,
        }
    }

    #[test]
    fn test_mechanic_names() {
        assert_eq!(Mechanic::from_tag("lifesteal"), Some(Mechanic::Lifesteal));
        assert_eq!(Mechanic::from_tag("phase"), Some(Mechanic::Phase));
        assert_eq!(Mechanic::from_tag("vampiric"), None);
        assert_eq!(Mechanic::from_tag("juggle"), None);
        assert!(Mechanic::Pull.is_per_target());
        assert!(Mechanic::Dash.is_source());
        assert!(!Mechanic::Critical.is_per_target() && !Mechanic::Critical.is_source());
    }

    #[test]
    fn test_lifesteal_percent() {
        let mut world = world();
        let params = Params::new().with("lifesteal_percent", 0.2);
        let ctx = TargetContext::Enemy;
        let mut log = Vec::new();

        let s = Strike { dealt: 50.0, ..strike(&params, &ctx) };
        apply_per_target(Mechanic::Lifesteal, &mut world, &s, &mut log);

        assert_eq!(world.get(EntityId(0)).unwrap().health, 60.0);
        assert_eq!(log, vec![EffectOutcome::Lifesteal { source: EntityId(0), amount: 10.0 }]);
    }

    #[test]
    fn test_knockback_velocity() {
        let mut world = world();
        let params = Params::new().with("knockback_distance", 2.0).with("knockback_duration", 0.5);
        let ctx = TargetContext::Enemy;
        let mut log = Vec::new();

        apply_per_target(Mechanic::Knockback, &mut world, &strike(&params, &ctx), &mut log);

        let (velocity, duration) = world.get(EntityId(1)).unwrap().forced_velocity.unwrap();
        assert!((velocity.x - 4.0).abs() < 1e-9);
        assert_eq!(duration, 0.5);
    }

    #[test]
    fn test_knockback_without_motion() {
        let mut world = world();
        if let Some(e) = world.get_mut(EntityId(1)) {
            e.capabilities = Capabilities {
                forced_motion: false,
                ..Capabilities::default()
            };
        }
        let params = Params::new();
        let ctx = TargetContext::Enemy;
        let mut log = Vec::new();

        apply_per_target(Mechanic::Knockback, &mut world, &strike(&params, &ctx), &mut log);
        assert!(matches!(log[0], EffectOutcome::Skipped { step: "knockback", .. }));
    }

    #[test]
    fn test_pull_never_overshoots() {
        let mut world = world();
        let params = Params::new().with("pull_distance", 10.0);
        let ctx = TargetContext::Enemy;
        let mut log = Vec::new();

        apply_per_target(Mechanic::Pull, &mut world, &strike(&params, &ctx), &mut log);
        assert_eq!(world.get(EntityId(1)).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_pull_partial() {
        let mut world = world();
        let params = Params::new().with("pull_distance", 1.5);
        let ctx = TargetContext::Enemy;
        let mut log = Vec::new();

        apply_per_target(Mechanic::Pull, &mut world, &strike(&params, &ctx), &mut log);
        assert!((world.get(EntityId(1)).unwrap().position.x - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_execute_threshold() {
        let params = Params::new().with("threshold_hp", 0.2).with("bonus_damage", 2.0);
        let ctx = TargetContext::Enemy;

        let mut world = world();
        let mut log = Vec::new();
        let low = Strike {
            base_damage: 10.0,
            health_before: Some(0.15),
            ..strike(&params, &ctx)
        };
        apply_per_target(Mechanic::Execute, &mut world, &low, &mut log);
        assert_eq!(world.get(EntityId(1)).unwrap().damage_taken(), 10.0);

        let mut world = self::world();
        let mut log = Vec::new();
        let healthy = Strike {
            base_damage: 10.0,
            health_before: Some(0.5),
            ..strike(&params, &ctx)
        };
        apply_per_target(Mechanic::Execute, &mut world, &healthy, &mut log);
        assert_eq!(world.get(EntityId(1)).unwrap().damage_taken(), 0.0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_teleport_targeted() {
        let mut world = world();
        let mut log = Vec::new();
        apply_to_source(Mechanic::Teleport, &mut world, EntityId(0), Some(EntityId(1)), &Params::new(), &mut log);
        assert_eq!(world.get(EntityId(0)).unwrap().position, planar(4.0, 0.0));
    }

    #[test]
    fn test_teleport_out_of_range() {
        let mut world = world();
        let mut log = Vec::new();
        let params = Params::new().with("teleport_range", 3.0);
        apply_to_source(Mechanic::Teleport, &mut world, EntityId(0), Some(EntityId(1)), &params, &mut log);
        assert_eq!(world.get(EntityId(0)).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_teleport_forward_unsupported() {
        let mut world = world();
        let mut log = Vec::new();
        let params = Params::new().with("teleport_type", "forward");
        apply_to_source(Mechanic::Teleport, &mut world, EntityId(0), Some(EntityId(1)), &params, &mut log);
        assert_eq!(world.get(EntityId(0)).unwrap().position, Vec3::ZERO);
        assert!(matches!(log[0], EffectOutcome::Skipped { step: "teleport", .. }));
    }

    #[test]
    fn test_dash_prefers_forced_motion() {
        let mut world = world();
        let mut log = Vec::new();
        let params = Params::new().with("dash_distance", 2.0).with("dash_speed", 10.0);
        apply_to_source(Mechanic::Dash, &mut world, EntityId(0), Some(EntityId(1)), &params, &mut log);

        let (velocity, duration) = world.get(EntityId(0)).unwrap().forced_velocity.unwrap();
        assert!((velocity.x - 10.0).abs() < 1e-9);
        assert!((duration - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_dash_falls_back_to_position() {
        let mut world = world();
        if let Some(e) = world.get_mut(EntityId(0)) {
            e.capabilities.forced_motion = false;
        }
        let mut log = Vec::new();
        let params = Params::new().with("dash_distance", 10.0);
        apply_to_source(Mechanic::Dash, &mut world, EntityId(0), Some(EntityId(1)), &params, &mut log);
        assert_eq!(world.get(EntityId(0)).unwrap().position, planar(4.0, 0.0));
    }

    #[test]
    fn test_phase_applies_to_source() {
        let mut world = world();
        let mut log = Vec::new();
        let params = Params::new().with("phase_duration", 3.0);
        apply_to_source(Mechanic::Phase, &mut world, EntityId(0), Some(EntityId(1)), &params, &mut log);

        let status = world.get(EntityId(0)).unwrap().status("phase").unwrap();
        assert_eq!(status.params.f64_or("phase_duration", 0.0), 3.0);
        assert!(!status.params.bool_or("can_pass_walls", true));
        assert!(world.get(EntityId(1)).unwrap().statuses.is_empty());
    }
}
