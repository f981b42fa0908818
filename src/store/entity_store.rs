//! Entity store implementation
//!
//! Per-kind collections behind one RwLock, with generation tickets so a slow
//! refresh cannot overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::model::{Entity, EntityId, EntityKind, Location, OrgTree, OrgUnit, User};

use super::{Collection, CollectionStatus, Generation};

/// Everything the store holds; also the shape the codec reads and writes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreState {
    pub users: Collection<User>,
    pub locations: Collection<Location>,
    pub org_units: Collection<OrgUnit>,
    pub org_tree: OrgTree,
}

impl StoreState {
    /// True when no kind holds any data
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.locations.is_empty()
            && self.org_units.is_empty()
            && self.org_tree.is_empty()
    }
}

/// Record types that live in a `StoreState` collection
pub trait StoredEntity: Entity {
    fn collection(state: &StoreState) -> &Collection<Self>;
    fn collection_mut(state: &mut StoreState) -> &mut Collection<Self>;
}

impl StoredEntity for User {
    fn collection(state: &StoreState) -> &Collection<Self> {
        &state.users
    }

    fn collection_mut(state: &mut StoreState) -> &mut Collection<Self> {
        &mut state.users
    }
}

impl StoredEntity for Location {
    fn collection(state: &StoreState) -> &Collection<Self> {
        &state.locations
    }

    fn collection_mut(state: &mut StoreState) -> &mut Collection<Self> {
        &mut state.locations
    }
}

impl StoredEntity for OrgUnit {
    fn collection(state: &StoreState) -> &Collection<Self> {
        &state.org_units
    }

    fn collection_mut(state: &mut StoreState) -> &mut Collection<Self> {
        &mut state.org_units
    }
}

/// Mutable state guarded as a unit
#[derive(Default)]
struct Inner {
    state: StoreState,
    /// Last generation applied, per kind slot
    applied: [Generation; 4],
    status: [CollectionStatus; 4],
}

/// Authoritative in-memory cache
///
/// ## Concurrency:
/// - `inner`: one RwLock, so a replace (purge, upsert, reorder) is observed
///   all at once or not at all
/// - `issued`: per-kind atomic counters handing out refresh generations
/// - All methods use `&self`
pub struct EntityStore {
    inner: RwLock<Inner>,
    issued: [AtomicU64; 4],
}

impl EntityStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            issued: Default::default(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Install persisted state (Empty → Hydrated)
    ///
    /// Kinds already refreshed are left alone so a late hydrate never
    /// overwrites fresh data.
    pub fn hydrate(&self, loaded: StoreState) {
        let mut inner = self.inner.write();
        let StoreState {
            users,
            locations,
            org_units,
            org_tree,
        } = loaded;

        if inner.status[EntityKind::User.slot()] == CollectionStatus::Empty && !users.is_empty() {
            inner.state.users = users;
            inner.status[EntityKind::User.slot()] = CollectionStatus::Hydrated;
        }
        if inner.status[EntityKind::Location.slot()] == CollectionStatus::Empty
            && !locations.is_empty()
        {
            inner.state.locations = locations;
            inner.status[EntityKind::Location.slot()] = CollectionStatus::Hydrated;
        }
        if inner.status[EntityKind::OrgUnit.slot()] == CollectionStatus::Empty
            && !org_units.is_empty()
        {
            inner.state.org_units = org_units;
            inner.status[EntityKind::OrgUnit.slot()] = CollectionStatus::Hydrated;
        }
        if inner.status[EntityKind::OrgTree.slot()] == CollectionStatus::Empty
            && !org_tree.is_empty()
        {
            inner.state.org_tree = org_tree;
            inner.status[EntityKind::OrgTree.slot()] = CollectionStatus::Hydrated;
        }
    }

    // =========================================================================
    // Generations
    // =========================================================================

    /// Issue a ticket for a refresh about to start
    pub fn begin_refresh(&self, kind: EntityKind) -> Generation {
        self.issued[kind.slot()].fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last generation applied for a kind (0 when never refreshed)
    pub fn applied_generation(&self, kind: EntityKind) -> Generation {
        self.inner.read().applied[kind.slot()]
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace a kind's records unconditionally
    ///
    /// Counts as the newest refresh: tickets issued earlier are superseded.
    pub fn replace<T: StoredEntity>(&self, records: Vec<T>) {
        let generation = self.begin_refresh(T::KIND);
        self.replace_if_current(generation, records);
    }

    /// Replace a kind's records if `generation` is newer than the last applied
    ///
    /// Returns false (and changes nothing) for a stale ticket.
    pub fn replace_if_current<T: StoredEntity>(&self, generation: Generation, records: Vec<T>) -> bool {
        let kind = T::KIND;
        let mut inner = self.inner.write();

        if generation <= inner.applied[kind.slot()] {
            warn!(
                %kind,
                generation,
                applied = inner.applied[kind.slot()],
                "discarding superseded refresh"
            );
            return false;
        }

        let count = records.len();
        let purged = T::collection_mut(&mut inner.state).replace(records);
        inner.applied[kind.slot()] = generation;
        inner.status[kind.slot()] = CollectionStatus::Fresh;

        debug!(%kind, generation, count, purged, "replaced collection");
        true
    }

    /// Store the org tree unconditionally
    pub fn set_org_tree(&self, tree: OrgTree) {
        let generation = self.begin_refresh(EntityKind::OrgTree);
        self.set_org_tree_if_current(generation, tree);
    }

    /// Store the org tree if `generation` is newer than the last applied
    pub fn set_org_tree_if_current(&self, generation: Generation, tree: OrgTree) -> bool {
        let slot = EntityKind::OrgTree.slot();
        let mut inner = self.inner.write();

        if generation <= inner.applied[slot] {
            warn!(generation, applied = inner.applied[slot], "discarding superseded org tree");
            return false;
        }

        inner.state.org_tree = tree;
        inner.applied[slot] = generation;
        inner.status[slot] = CollectionStatus::Fresh;
        true
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Look up one record; unknown ids are simply `None`
    pub fn get<T: StoredEntity>(&self, id: EntityId) -> Option<T> {
        T::collection(&self.inner.read().state).get(id).cloned()
    }

    /// All records of a kind in display order
    pub fn list<T: StoredEntity>(&self) -> Vec<T> {
        T::collection(&self.inner.read().state).list()
    }

    /// Records of a kind matching a predicate, in display order
    pub fn filter<T: StoredEntity>(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        T::collection(&self.inner.read().state)
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub fn org_tree(&self) -> OrgTree {
        self.inner.read().state.org_tree.clone()
    }

    /// Number of records held for a kind
    pub fn len(&self, kind: EntityKind) -> usize {
        let inner = self.inner.read();
        match kind {
            EntityKind::User => inner.state.users.len(),
            EntityKind::Location => inner.state.locations.len(),
            EntityKind::OrgUnit => inner.state.org_units.len(),
            EntityKind::OrgTree => usize::from(!inner.state.org_tree.is_empty()),
        }
    }

    pub fn status(&self, kind: EntityKind) -> CollectionStatus {
        self.inner.read().status[kind.slot()]
    }

    /// Consistent copy of the whole state (for persistence)
    pub fn snapshot(&self) -> StoreState {
        self.inner.read().state.clone()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
