//! Component registry: the engine's view of the host's component instances.
//!
//! The host owns component records. The registry mirrors the geometry the
//! engine needs for hit-testing and selection, keyed by the host's stable
//! [`ComponentId`]. Storage is a slot arena so removals never leave dangling
//! references behind; callers only ever hold ids.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use uuid::Uuid;

/// Stable identifier of a dashboard component, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub Uuid);

impl ComponentId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ComponentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

new_key_type! {
    /// Arena slot of a registered component.
    struct SlotKey;
}

/// Geometry and flags of one component instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub id: ComponentId,
    /// Top-left corner in canvas units.
    pub position: Point,
    pub size: Size,
    /// Stacking order; higher is in front.
    pub z_index: i32,
    pub locked: bool,
    pub visible: bool,
}

impl ComponentInstance {
    /// A visible, unlocked component at z-index 0.
    pub fn new(id: ComponentId, position: Point, size: Size) -> Self {
        Self {
            id,
            position,
            size,
            z_index: 0,
            locked: false,
            visible: true,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Bounding box in canvas units.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Whether this component can be picked up by a pointer.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }
}

#[derive(Debug, Clone)]
struct Entry {
    instance: ComponentInstance,
    /// Registration order, breaks z-index ties (later wins).
    seq: u64,
}

/// Arena of component instances indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    slots: SlotMap<SlotKey, Entry>,
    index: HashMap<ComponentId, SlotKey>,
    next_seq: u64,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an instance. Replacing keeps the original stacking tiebreak.
    pub fn upsert(&mut self, instance: ComponentInstance) {
        if let Some(&key) = self.index.get(&instance.id) {
            if let Some(entry) = self.slots.get_mut(key) {
                entry.instance = instance;
                return;
            }
        }
        let id = instance.id;
        let seq = self.next_seq;
        self.next_seq += 1;
        let key = self.slots.insert(Entry { instance, seq });
        self.index.insert(id, key);
    }

    /// Remove an instance, returning it if it was registered.
    pub fn remove(&mut self, id: ComponentId) -> Option<ComponentInstance> {
        let key = self.index.remove(&id)?;
        self.slots.remove(key).map(|entry| entry.instance)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    pub fn get(&self, id: ComponentId) -> Option<&ComponentInstance> {
        let key = self.index.get(&id)?;
        self.slots.get(*key).map(|entry| &entry.instance)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Instances back to front.
    pub fn ordered(&self) -> Vec<&ComponentInstance> {
        let mut entries: Vec<&Entry> = self.slots.values().collect();
        entries.sort_by_key(|entry| (entry.instance.z_index, entry.seq));
        entries.into_iter().map(|entry| &entry.instance).collect()
    }

    /// Ids back to front.
    pub fn ids(&self) -> Vec<ComponentId> {
        self.ordered().into_iter().map(|c| c.id).collect()
    }

    /// Frontmost visible, unlocked component containing `point` (canvas units).
    pub fn hit_test(&self, point: Point) -> Option<ComponentId> {
        self.ordered()
            .into_iter()
            .rev()
            .find(|c| c.is_interactive() && c.bounds().contains(point))
            .map(|c| c.id)
    }

    /// Visible components whose bounds overlap `rect`, back to front.
    ///
    /// Locked components are skipped unless `include_locked` is set.
    pub fn query_rect(&self, rect: Rect, include_locked: bool) -> Vec<ComponentId> {
        self.ordered()
            .into_iter()
            .filter(|c| c.visible && (include_locked || !c.locked))
            .filter(|c| rect.intersect(c.bounds()).area() > 0.0)
            .map(|c| c.id)
            .collect()
    }

    /// Union of the bounds of the given components.
    pub fn bounds_of(&self, ids: &[ComponentId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|&id| self.get(id))
            .map(ComponentInstance::bounds)
            .reduce(|a, b| a.union(b))
    }
}
