//! Host storage seen by the engine.
//!
//! The executor borrows one entity at a time through [`World`], so hosts
//! can keep combatants in whatever structure they already use.

use rustc_hash::FxHashMap;

use super::entity::{Combatant, EntityId};

/// Lookup of combatants by id.
pub trait World {
    fn entity(&self, id: EntityId) -> Option<&dyn Combatant>;
    fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Combatant>;
}

/// A ready-made [`World`] keyed by `EntityId`.
///
/// ## Example
///
/// ```
/// use combat_tags::core::{BasicEntity, EntityId, EntityKind, EntityMap, Vec3, World};
///
/// let mut world = EntityMap::new();
/// world.insert(BasicEntity::new(EntityId(1), EntityKind::Player, Vec3::ZERO));
///
/// assert!(world.entity(EntityId(1)).is_some());
/// assert!(world.entity(EntityId(2)).is_none());
/// ```
#[derive(Debug)]
pub struct EntityMap<T> {
    entities: FxHashMap<EntityId, T>,
}

impl<T: Combatant> EntityMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: FxHashMap::default(),
        }
    }

    /// Insert an entity under its own id, returning any entity it replaced.
    pub fn insert(&mut self, entity: T) -> Option<T> {
        self.entities.insert(entity.id(), entity)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.entities.remove(&id)
    }

    /// Typed access, for hosts that need the concrete entity back.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(&id)
    }

    /// All ids, sorted, for use as a candidate pool.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T: Combatant> Default for EntityMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Combatant> FromIterator<T> for EntityMap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut map = Self::new();
        for entity in iter {
            map.insert(entity);
        }
        map
    }
}

impl<T: Combatant> World for EntityMap<T> {
    fn entity(&self, id: EntityId) -> Option<&dyn Combatant> {
        self.entities.get(&id).map(|e| e as &dyn Combatant)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Combatant> {
        self.entities.get_mut(&id).map(|e| e as &mut dyn Combatant)
    }
}

impl World for FxHashMap<EntityId, Box<dyn Combatant>> {
    fn entity(&self, id: EntityId) -> Option<&dyn Combatant> {
        self.get(&id).map(|e| e.as_ref())
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Combatant> {
        match self.get_mut(&id) {
            Some(e) => Some(e.as_mut()),
            None => None,
        }
    }
}
