//! Effect execution - parse, resolve targets, apply.
//!
//! One `execute_effect` call is one synchronous transaction: the tags are
//! parsed, targets are resolved, and every target receives damage, healing,
//! statuses and special mechanics in that order before the call returns.
//! Nothing is queued between calls; the RNG is the only state carried over.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use combat_tags::core::{planar, BasicEntity, EngineConfig, EntityId, EntityKind, EntityMap, Params, Vec3};
//! use combat_tags::effects::EffectExecutor;
//! use combat_tags::tags::TagRegistry;
//!
//! let registry = Arc::new(TagRegistry::builtin().unwrap());
//! let mut executor = EffectExecutor::new(registry, EngineConfig::default());
//!
//! let mut world = EntityMap::new();
//! world.insert(BasicEntity::new(EntityId(0), EntityKind::Player, Vec3::ZERO));
//! world.insert(BasicEntity::new(EntityId(1), EntityKind::Enemy, planar(2.0, 0.0)));
//! let candidates = world.ids();
//!
//! let params = Params::new().with("baseDamage", 25.0);
//! let ctx = executor.execute_effect(&mut world, EntityId(0), Some(EntityId(1)), &["arcane"], &params, &candidates);
//! assert_eq!(ctx.damage_to(EntityId(1)), 25.0);
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use super::channels::{self, category_of, health_fraction};
use super::context::{EffectContext, EffectOutcome};
use super::mechanics::{self, Mechanic, Strike};
use crate::core::{DamageHit, EffectRng, EffectRngState, EngineConfig, EntityId, Params, World};
use crate::tags::{EffectConfig, TagDefinition, TagParser, TagRegistry};
use crate::targeting::{TargetContext, TargetFinder, TargetQuery};

/// One effect invocation.
#[derive(Clone, Copy, Debug)]
pub struct EffectRequest<'a> {
    pub source: EntityId,
    pub primary: Option<EntityId>,
    pub tags: &'a [&'a str],
    pub params: &'a Params,
    pub candidates: &'a [EntityId],
    /// Caller's clock, copied into the returned context.
    pub timestamp: f64,
}

/// Applies tag-described effects to a host world.
#[derive(Clone, Debug)]
pub struct EffectExecutor {
    registry: Arc<TagRegistry>,
    parser: TagParser,
    finder: TargetFinder,
    rng: EffectRng,
}

impl EffectExecutor {
    /// Create an executor seeded from `config.seed`.
    #[must_use]
    pub fn new(registry: Arc<TagRegistry>, config: EngineConfig) -> Self {
        let rng = EffectRng::new(config.seed);
        Self {
            parser: TagParser::new(Arc::clone(&registry)),
            finder: TargetFinder::new(config),
            registry,
            rng,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    #[must_use]
    pub fn parser(&self) -> &TagParser {
        &self.parser
    }

    #[must_use]
    pub fn finder(&self) -> &TargetFinder {
        &self.finder
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.finder.config()
    }

    /// Snapshot the RNG so a sequence of calls can be replayed.
    #[must_use]
    pub fn rng_state(&self) -> EffectRngState {
        self.rng.state()
    }

    pub fn restore_rng(&mut self, state: &EffectRngState) {
        self.rng = EffectRng::from_state(state);
    }

    /// Parse `tags` and apply them from `source`.
    ///
    /// The returned context carries a zero timestamp; use [`execute`](Self::execute)
    /// to stamp it with the caller's clock.
    pub fn execute_effect<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        source: EntityId,
        primary: Option<EntityId>,
        tags: &[&str],
        params: &Params,
        candidates: &[EntityId],
    ) -> EffectContext {
        let request = EffectRequest {
            source,
            primary,
            tags,
            params,
            candidates,
            timestamp: 0.0,
        };
        self.execute(world, &request)
    }

    pub fn execute<W: World + ?Sized>(&mut self, world: &mut W, request: &EffectRequest<'_>) -> EffectContext {
        let config = self.parser.parse(request.tags, request.params);
        self.execute_config(world, request.source, request.primary, config, request.candidates, request.timestamp)
    }

    /// Apply an already parsed config.
    pub fn execute_config<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        source: EntityId,
        primary: Option<EntityId>,
        config: EffectConfig,
        candidates: &[EntityId],
        timestamp: f64,
    ) -> EffectContext {
        let context = self.finder.effective_context(world, source, &config.context);
        let targets = self.finder.find_targets(
            world,
            &TargetQuery {
                geometry: config.geometry,
                source,
                primary,
                params: &config.params,
                context: &config.context,
                candidates,
            },
        );

        let mut log = Vec::new();
        for (index, &target) in targets.iter().enumerate() {
            self.apply_to_target(world, source, index, target, &config, &context, &mut log);
        }

        let anchor = primary.or_else(|| targets.iter().copied().find(|t| *t != source));
        for tag in &config.special_tags {
            match Mechanic::from_tag(tag) {
                Some(mechanic) if mechanic.is_source() => {
                    mechanics::apply_to_source(mechanic, world, source, anchor, &config.params, &mut log);
                }
                Some(_) => {}
                None => {
                    warn!(tag = %tag, kind = "unknown_mechanic", "special tag has no mechanic");
                    channels::skip(&mut log, Some(source), "special", format!("no mechanic for {tag}"));
                }
            }
        }

        debug!(
            source = %source,
            targets = targets.len(),
            outcomes = log.len(),
            "effect resolved"
        );
        EffectContext {
            source,
            primary_target: primary,
            config,
            context,
            targets,
            timestamp,
            outcomes: log,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_to_target<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        source: EntityId,
        index: usize,
        target: EntityId,
        config: &EffectConfig,
        context: &TargetContext,
        log: &mut Vec<EffectOutcome>,
    ) {
        let magnitude = config.geometry.magnitude(index, &config.params);
        let category = category_of(world, target);
        let health_before = health_fraction(world, target);

        let dealt = if config.deals_damage() {
            self.apply_damage(world, source, target, magnitude, category.as_deref(), config, context, log)
        } else {
            0.0
        };

        if config.base_healing > 0.0 {
            channels::heal(world, target, config.base_healing * magnitude, log);
        }

        for status in &config.status_tags {
            self.apply_status(world, target, status, category.as_deref(), &config.params, false, log);
        }

        let strike = Strike {
            source,
            target,
            magnitude,
            dealt,
            health_before,
            base_damage: config.base_damage,
            params: &config.params,
            tags: &config.all_tags,
            context,
        };
        for tag in &config.special_tags {
            if let Some(mechanic) = Mechanic::from_tag(tag).filter(|m| m.is_per_target()) {
                mechanics::apply_per_target(mechanic, world, &strike, log);
            }
        }
    }

    /// Damage step for one target; returns the total dealt.
    #[allow(clippy::too_many_arguments)]
    fn apply_damage<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        source: EntityId,
        target: EntityId,
        magnitude: f64,
        category: Option<&str>,
        config: &EffectConfig,
        context: &TargetContext,
        log: &mut Vec<EffectOutcome>,
    ) -> f64 {
        let registry = Arc::clone(&self.registry);

        let critical = config.has_special("critical") && self.rng.roll(config.params.f64_or("crit_chance", 0.15));
        let crit_multiplier = if critical {
            config.params.f64_or("crit_multiplier", 2.0)
        } else {
            1.0
        };

        let fallback = [self.config().default_damage_type.clone()];
        let damage_types: &[String] = if config.damage_tags.is_empty() {
            &fallback
        } else {
            &config.damage_tags
        };

        let mut dealt = 0.0;
        for damage_type in damage_types {
            let definition = registry.get_definition(damage_type);
            let behavior = definition.zip(category).and_then(|(d, c)| d.behavior_for(c));
            let amount = config.base_damage
                * magnitude
                * crit_multiplier
                * config.synergy_multiplier
                * behavior.map_or(1.0, |b| b.damage_multiplier);

            if behavior.is_some_and(|b| b.converts_to_healing) {
                debug!(target = %target, damage_type = %damage_type, amount, "damage converted to healing");
                if amount > 0.0 && channels::restore(world, target, amount, "healing", log) {
                    log.push(EffectOutcome::ConvertedToHealing {
                        target,
                        amount,
                        damage_type: damage_type.clone(),
                    });
                }
                break;
            }
            if amount <= 0.0 {
                debug!(target = %target, damage_type = %damage_type, "damage nullified");
                continue;
            }

            let hit = DamageHit {
                amount,
                damage_type,
                source,
                tags: &config.all_tags,
                context,
                critical,
            };
            let applied = channels::deal_damage(world, target, &hit, log);
            dealt += applied;

            if applied > 0.0 {
                if let Some(definition) = definition {
                    self.auto_apply(world, target, definition, category, config, log);
                }
            }
        }
        dealt
    }

    /// Roll a damage tag's `auto_apply_status`.
    ///
    /// Statuses already requested explicitly are left to the status step.
    fn auto_apply<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        target: EntityId,
        damage: &TagDefinition,
        category: Option<&str>,
        config: &EffectConfig,
        log: &mut Vec<EffectOutcome>,
    ) {
        let Some(status) = damage.auto_apply_status.as_deref() else {
            return;
        };
        if config.has_status(status) || !self.rng.roll(damage.auto_apply_chance) {
            return;
        }
        debug!(target = %target, status, source_tag = %damage.name, "auto-apply roll succeeded");
        self.apply_status(world, target, status, category, &config.params, true, log);
    }

    /// Merge defaults, check immunity, hand to the status manager.
    #[allow(clippy::too_many_arguments)]
    fn apply_status<W: World + ?Sized>(
        &self,
        world: &mut W,
        target: EntityId,
        status: &str,
        category: Option<&str>,
        params: &Params,
        auto: bool,
        log: &mut Vec<EffectOutcome>,
    ) {
        let Some(definition) = self.registry.get_definition(status) else {
            return;
        };
        if category.is_some_and(|c| definition.is_immune(c)) {
            debug!(target = %target, status, category, "immune to status");
            log.push(EffectOutcome::ImmunityBlocked {
                target,
                status: status.to_string(),
            });
            return;
        }

        let merged = definition.default_params.merged_with(params);
        channels::apply_status(world, target, &definition.name, &merged, auto, log);
    }
}
