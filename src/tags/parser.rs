//! Tag parsing - raw tag lists to `EffectConfig`.
//!
//! Parsing never fails. Unknown tags are dropped with a warning, conflicting
//! tags lose to whichever came first, and an empty or entirely unknown tag
//! list yields a single-target config that does nothing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::definition::TagCategory;
use super::registry::TagRegistry;
use crate::core::Params;
use crate::targeting::{Geometry, TargetContext};

/// Tag bucket; most effects carry one or two tags per bucket.
pub type TagList = SmallVec<[String; 4]>;

/// Fully resolved effect description for one invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Canonical name of the winning geometry tag.
    pub geometry_tag: String,
    pub geometry: Geometry,
    pub damage_tags: TagList,
    pub status_tags: TagList,
    pub special_tags: TagList,
    pub context: TargetContext,
    /// Whether `context` came from a context tag rather than inference.
    pub context_explicit: bool,
    pub base_damage: f64,
    pub base_healing: f64,
    /// Registry defaults of every accepted tag, then caller overrides.
    pub params: Params,
    /// Every accepted tag, canonical, in input order.
    pub all_tags: Vec<String>,
    /// Tags dropped by conflict resolution.
    pub dropped_tags: Vec<String>,
    /// Product of all synergy multipliers triggered by co-occurring tags.
    pub synergy_multiplier: f64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            geometry_tag: Geometry::SingleTarget.as_str().to_string(),
            geometry: Geometry::SingleTarget,
            damage_tags: TagList::new(),
            status_tags: TagList::new(),
            special_tags: TagList::new(),
            context: TargetContext::Enemy,
            context_explicit: false,
            base_damage: 0.0,
            base_healing: 0.0,
            params: Params::new(),
            all_tags: Vec::new(),
            dropped_tags: Vec::new(),
            synergy_multiplier: 1.0,
        }
    }
}

impl EffectConfig {
    #[must_use]
    pub fn has_special(&self, tag: &str) -> bool {
        self.special_tags.iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn has_status(&self, tag: &str) -> bool {
        self.status_tags.iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.all_tags.iter().any(|t| t == tag)
    }

    /// Whether this config deals damage at all.
    #[must_use]
    pub fn deals_damage(&self) -> bool {
        !self.damage_tags.is_empty() || self.base_damage > 0.0
    }
}

/// Turns tag lists into `EffectConfig`s against a shared registry.
#[derive(Clone, Debug)]
pub struct TagParser {
    registry: Arc<TagRegistry>,
}

impl TagParser {
    #[must_use]
    pub fn new(registry: Arc<TagRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Parse `tags` with caller `overrides` on top of registry defaults.
    pub fn parse<S: AsRef<str>>(&self, tags: &[S], overrides: &Params) -> EffectConfig {
        let accepted = self.accept_tags(tags);
        let (accepted, dropped) = self.resolve_conflicts(accepted);

        let mut config = EffectConfig {
            dropped_tags: dropped,
            ..EffectConfig::default()
        };

        let mut geometry_tags: SmallVec<[String; 2]> = SmallVec::new();
        let mut has_debuff = false;
        let mut has_buff = false;

        for tag in &accepted {
            let Some(definition) = self.registry.get_definition(tag) else {
                continue;
            };
            match definition.category {
                TagCategory::Geometry => geometry_tags.push(tag.clone()),
                TagCategory::DamageType => config.damage_tags.push(tag.clone()),
                TagCategory::StatusDebuff => {
                    has_debuff = true;
                    config.status_tags.push(tag.clone());
                }
                TagCategory::StatusBuff => {
                    has_buff = true;
                    config.status_tags.push(tag.clone());
                }
                TagCategory::Special => config.special_tags.push(tag.clone()),
                TagCategory::Context => {
                    if config.context_explicit {
                        info!(
                            kept = %config.context,
                            dropped = %tag,
                            kind = "conflict_resolution",
                            "multiple context tags, keeping the first"
                        );
                    } else {
                        config.context = TargetContext::from_name(tag);
                        config.context_explicit = true;
                    }
                }
                TagCategory::Trigger | TagCategory::Equipment => {}
            }
        }

        let (geometry_tag, geometry) = self.pick_geometry(&geometry_tags);
        config.geometry_tag = geometry_tag;
        config.geometry = geometry;

        for tag in &accepted {
            config.params.merge_from(&self.registry.get_default_params(tag));
        }
        config.params.merge_from(overrides);

        config.base_damage = config
            .params
            .first_f64_or(&["baseDamage", "base_damage", "damage"], 0.0)
            .max(0.0);
        config.base_healing = config
            .params
            .first_f64_or(&["baseHealing", "base_healing", "heal_amount"], 0.0)
            .max(0.0);

        if !config.context_explicit {
            let heals = config.base_healing > 0.0 || config.has_special("heal");
            config.context = if !config.damage_tags.is_empty() || has_debuff {
                TargetContext::Enemy
            } else if heals || has_buff {
                TargetContext::Ally
            } else {
                TargetContext::Enemy
            };
        }

        config.synergy_multiplier = self.synergy_multiplier(&accepted);
        config.all_tags = accepted;

        debug!(
            geometry = %config.geometry,
            context = %config.context,
            damage = ?config.damage_tags,
            status = ?config.status_tags,
            special = ?config.special_tags,
            base_damage = config.base_damage,
            base_healing = config.base_healing,
            "tags parsed"
        );
        config
    }

    /// Normalize, resolve aliases, drop unknowns and duplicates.
    fn accept_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        let mut accepted: Vec<String> = Vec::with_capacity(tags.len());
        for raw in tags {
            let normalized = raw.as_ref().trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            let Some(canonical) = self.registry.canonical_name(&normalized) else {
                warn!(tag = %normalized, kind = "unknown_tag", "unrecognized tag ignored");
                continue;
            };
            if !accepted.iter().any(|t| t == canonical) {
                accepted.push(canonical.to_string());
            }
        }
        accepted
    }

    /// First-seen wins for mutually exclusive pairs.
    fn resolve_conflicts(&self, tags: Vec<String>) -> (Vec<String>, Vec<String>) {
        let mut kept: Vec<String> = Vec::with_capacity(tags.len());
        let mut dropped = Vec::new();
        for tag in tags {
            let winner = kept
                .iter()
                .find(|k| self.registry.conflicts_between(k, &tag))
                .cloned();
            if let Some(winner) = winner {
                info!(
                    kept = %winner,
                    dropped = %tag,
                    kind = "conflict_resolution",
                    "mutually exclusive tags, keeping the first"
                );
                dropped.push(tag);
            } else {
                kept.push(tag);
            }
        }
        (kept, dropped)
    }

    /// Highest-priority geometry tag; `single_target` when none or unsupported.
    fn pick_geometry(&self, candidates: &[String]) -> (String, Geometry) {
        let winner = candidates
            .iter()
            .enumerate()
            .min_by_key(|(i, tag)| (self.registry.geometry_rank(tag).unwrap_or(usize::MAX), *i))
            .map(|(_, tag)| tag.as_str());

        let Some(tag) = winner else {
            return (Geometry::SingleTarget.as_str().to_string(), Geometry::SingleTarget);
        };
        if candidates.len() > 1 {
            debug!(chosen = %tag, candidates = ?candidates, "multiple geometry tags, using priority order");
        }

        match Geometry::from_tag(tag) {
            Some(geometry) => (tag.to_string(), geometry),
            None => {
                warn!(tag = %tag, kind = "geometry_fallback", "geometry has no algorithm, using single_target");
                (Geometry::SingleTarget.as_str().to_string(), Geometry::SingleTarget)
            }
        }
    }

    fn synergy_multiplier(&self, tags: &[String]) -> f64 {
        tags.iter()
            .filter_map(|t| self.registry.get_definition(t))
            .flat_map(|def| def.synergies.iter())
            .filter(|(other, _)| tags.iter().any(|t| t == *other))
            .map(|(_, multiplier)| *multiplier)
            .product()
    }
}
