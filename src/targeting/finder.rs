//! Target finder - resolves a geometry into concrete entities.
//!
//! Given a source, an optional primary target and a candidate pool, the
//! finder returns an ordered, duplicate-free list of affected entities.
//!
//! | Geometry      | Params (defaults)                                          | Order             |
//! |---------------|------------------------------------------------------------|-------------------|
//! | single_target | -                                                          | primary           |
//! | chain         | `chain_count` (2), `chain_range` (5.0)                     | hop order         |
//! | cone          | `cone_range` (8.0), `cone_angle` (60°, full width)          | nearest first     |
//! | circle        | `radius`/`circle_radius` (3.0), `origin`, `max_targets`    | nearest first     |
//! | beam          | `beam_range` (10.0), `beam_width` (0.5), `pierce_count` (-1) | along the beam  |
//! | pierce        | `pierce_range` (10.0), `pierce_width` (0.5), `pierce_count` (3) | along the line |

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use super::context::{is_hostile, TargetContext};
use super::geometry::Geometry;
use crate::core::{
    angle_between_deg, direction_to, project_onto_ray, Combatant, EngineConfig, EntityId, Params, Vec3, World,
};

/// Everything the finder needs for one resolution.
#[derive(Clone, Copy, Debug)]
pub struct TargetQuery<'a> {
    pub geometry: Geometry,
    pub source: EntityId,
    pub primary: Option<EntityId>,
    pub params: &'a Params,
    /// Context as written by the caster, before any hostile-source flip.
    pub context: &'a TargetContext,
    pub candidates: &'a [EntityId],
}

/// A candidate resolved against the world.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: EntityId,
    position: Vec3,
    valid: bool,
}

/// Resolves geometries to target lists.
///
/// Stateless apart from the allegiance rules in its `EngineConfig`.
#[derive(Clone, Debug, Default)]
pub struct TargetFinder {
    config: EngineConfig,
}

impl TargetFinder {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The context actually applied for `source`: flipped when the source is hostile.
    #[must_use]
    pub fn effective_context<W: World + ?Sized>(
        &self,
        world: &W,
        source: EntityId,
        context: &TargetContext,
    ) -> TargetContext {
        let hostile_source = world
            .entity(source)
            .is_some_and(|e| is_hostile(e, &self.config));
        if hostile_source {
            context.flipped()
        } else {
            context.clone()
        }
    }

    /// Resolve the ordered target list for `query`.
    pub fn find_targets<W: World + ?Sized>(&self, world: &W, query: &TargetQuery<'_>) -> Vec<EntityId> {
        if *query.context == TargetContext::SelfOnly {
            return vec![query.source];
        }

        let context = self.effective_context(world, query.source, query.context);
        let params = query.params;

        let targets = match query.geometry {
            Geometry::SingleTarget => self.single(world, query.primary, &context),
            Geometry::Chain => self.chain(world, query, &context),
            Geometry::Cone => self.cone(world, query, &context),
            Geometry::Circle => self.circle(world, query, &context),
            Geometry::Beam => self.line(
                world,
                query,
                &context,
                params.f64_or("beam_range", 10.0),
                params.f64_or("beam_width", 0.5),
                params.i64_or("pierce_count", -1),
            ),
            Geometry::Pierce => self.line(
                world,
                query,
                &context,
                params.f64_or("pierce_range", 10.0),
                params.f64_or("pierce_width", 0.5),
                params.i64_or("pierce_count", 3),
            ),
        };

        debug!(
            geometry = %query.geometry,
            context = %context,
            source = %query.source,
            count = targets.len(),
            "targets resolved"
        );
        targets
    }

    fn single<W: World + ?Sized>(
        &self,
        world: &W,
        primary: Option<EntityId>,
        context: &TargetContext,
    ) -> Vec<EntityId> {
        match primary.and_then(|id| world.entity(id)) {
            Some(entity) if context.matches(entity, &self.config) => vec![entity.id()],
            _ => Vec::new(),
        }
    }

    fn chain<W: World + ?Sized>(
        &self,
        world: &W,
        query: &TargetQuery<'_>,
        context: &TargetContext,
    ) -> Vec<EntityId> {
        let Some(primary) = query.primary.and_then(|id| world.entity(id)) else {
            return Vec::new();
        };
        if !context.matches(primary, &self.config) {
            return Vec::new();
        }

        let hops = query.params.i64_or("chain_count", 2).max(0);
        let range = query.params.f64_or("chain_range", 5.0);
        let pool = self.gather(world, query.candidates, context);

        let mut targets = vec![primary.id()];
        let mut visited: FxHashSet<EntityId> = targets.iter().copied().collect();
        let mut current = position_or_origin(primary);

        for _ in 0..hops {
            let next = pool
                .iter()
                .filter(|c| c.valid && !visited.contains(&c.id))
                .map(|c| (c, current.distance(c.position)))
                .filter(|(_, d)| *d <= range)
                .fold(None::<(&Candidate, f64)>, |best, (c, d)| match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((c, d)),
                });

            let Some((next, _)) = next else {
                break;
            };
            targets.push(next.id);
            visited.insert(next.id);
            current = next.position;
        }

        targets
    }

    fn cone<W: World + ?Sized>(
        &self,
        world: &W,
        query: &TargetQuery<'_>,
        context: &TargetContext,
    ) -> Vec<EntityId> {
        let range = query.params.f64_or("cone_range", 8.0);
        let half_angle = query.params.f64_or("cone_angle", 60.0) / 2.0;
        let pool = self.gather(world, query.candidates, context);
        let origin = self.source_position(world, query.source);
        let facing = self.facing(world, query, origin, &pool);

        let mut hits: Vec<(EntityId, f64)> = pool
            .iter()
            .filter(|c| c.valid && c.id != query.source)
            .filter_map(|c| {
                let offset = c.position - origin;
                let distance = offset.length();
                if distance > range || offset.try_normalize().is_none() {
                    return None;
                }
                (angle_between_deg(facing, offset) <= half_angle + 1e-9).then_some((c.id, distance))
            })
            .collect();

        sort_by_key_f64(&mut hits);
        hits.into_iter().map(|(id, _)| id).collect()
    }

    fn circle<W: World + ?Sized>(
        &self,
        world: &W,
        query: &TargetQuery<'_>,
        context: &TargetContext,
    ) -> Vec<EntityId> {
        let radius = query.params.first_f64_or(&["radius", "circle_radius"], 3.0);
        let from_source = query.params.text_or("origin", "target") == "source";

        let center = match query.primary.and_then(|id| world.entity(id)) {
            Some(primary) if !from_source => position_or_origin(primary),
            _ => self.source_position(world, query.source),
        };

        let mut hits: Vec<(EntityId, f64)> = self
            .gather(world, query.candidates, context)
            .iter()
            .filter(|c| c.valid)
            .map(|c| (c.id, center.distance(c.position)))
            .filter(|(_, d)| *d <= radius)
            .collect();

        sort_by_key_f64(&mut hits);
        let max_targets = query.params.i64_or("max_targets", 0);
        if max_targets > 0 {
            hits.truncate(usize::try_from(max_targets).unwrap_or(usize::MAX));
        }
        hits.into_iter().map(|(id, _)| id).collect()
    }

    /// Shared beam/pierce algorithm.
    ///
    /// `pierce_count` of 0 keeps only the first hit, `n > 0` keeps `n + 1`
    /// (the first hit plus `n` pierced), negative keeps every hit.
    fn line<W: World + ?Sized>(
        &self,
        world: &W,
        query: &TargetQuery<'_>,
        context: &TargetContext,
        range: f64,
        width: f64,
        pierce_count: i64,
    ) -> Vec<EntityId> {
        let pool = self.gather(world, query.candidates, context);
        let origin = self.source_position(world, query.source);
        let direction = self.facing(world, query, origin, &pool);
        let half_width = width / 2.0;

        let mut hits: Vec<(EntityId, f64)> = pool
            .iter()
            .filter(|c| c.valid && c.id != query.source)
            .filter_map(|c| {
                let projection = project_onto_ray(origin, direction, c.position);
                let on_beam = (0.0..=range).contains(&projection.along) && projection.offset <= half_width;
                on_beam.then_some((c.id, projection.along))
            })
            .collect();

        sort_by_key_f64(&mut hits);
        if pierce_count >= 0 {
            let cap = usize::try_from(pierce_count).unwrap_or(usize::MAX).saturating_add(1);
            hits.truncate(cap);
        }
        hits.into_iter().map(|(id, _)| id).collect()
    }

    /// Resolve candidates in order, dropping duplicates and unknown ids.
    fn gather<W: World + ?Sized>(
        &self,
        world: &W,
        candidates: &[EntityId],
        context: &TargetContext,
    ) -> Vec<Candidate> {
        let mut seen = FxHashSet::default();
        let mut pool = Vec::with_capacity(candidates.len());
        for &id in candidates {
            if !seen.insert(id) {
                continue;
            }
            let Some(entity) = world.entity(id) else {
                warn!(entity = %id, kind = "unknown_entity", "candidate not present in world, skipping");
                continue;
            };
            pool.push(Candidate {
                id,
                position: position_or_origin(entity),
                valid: context.matches(entity, &self.config),
            });
        }
        pool
    }

    fn source_position<W: World + ?Sized>(&self, world: &W, source: EntityId) -> Vec3 {
        match world.entity(source) {
            Some(entity) => position_or_origin(entity),
            None => {
                warn!(entity = %source, kind = "unknown_entity", "source not present in world, using origin");
                Vec3::ZERO
            }
        }
    }

    /// Direction from the source toward the primary target, else an estimate.
    fn facing<W: World + ?Sized>(
        &self,
        world: &W,
        query: &TargetQuery<'_>,
        origin: Vec3,
        pool: &[Candidate],
    ) -> Vec3 {
        query
            .primary
            .and_then(|id| world.entity(id))
            .and_then(|p| direction_to(origin, position_or_origin(p)))
            .unwrap_or_else(|| self.estimate_facing(world, query.source, origin, pool))
    }

    /// Facing heuristic: the source's own facing, else toward the nearest
    /// valid candidate, else +X.
    fn estimate_facing<W: World + ?Sized>(
        &self,
        world: &W,
        source: EntityId,
        origin: Vec3,
        pool: &[Candidate],
    ) -> Vec3 {
        if let Some(facing) = world
            .entity(source)
            .and_then(|e| e.facing())
            .and_then(Vec3::try_normalize)
        {
            return facing;
        }

        let mut nearest: Option<(Vec3, f64)> = None;
        for c in pool.iter().filter(|c| c.valid && c.id != source) {
            let Some(direction) = direction_to(origin, c.position) else {
                continue;
            };
            let distance = origin.distance(c.position);
            if nearest.map_or(true, |(_, d)| distance < d) {
                nearest = Some((direction, distance));
            }
        }

        nearest.map_or(Vec3::X, |(direction, _)| direction)
    }
}

/// Position of `entity`, or the origin with a warning when it has none.
pub(crate) fn position_or_origin(entity: &dyn Combatant) -> Vec3 {
    entity.position().unwrap_or_else(|| {
        warn!(entity = %entity.id(), kind = "missing_capability", "entity has no position, using origin");
        Vec3::ZERO
    })
}

/// Stable ascending sort on the float key.
fn sort_by_key_f64(items: &mut [(EntityId, f64)]) {
    items.sort_by(|a, b| a.1.total_cmp(&b.1));
}
