//! Directory Module
//!
//! The explicitly constructed store instance the UI layer talks to.
//!
//! ## Responsibilities
//! - Hydrate the store from the persisted snapshot before any read
//! - Expose the read selectors
//! - Run refreshes: fetch → normalize → replace → save
//! - Keep persistence write-through and failure-silent

use std::path::Path;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::fetch::{decode_response, FetchResponse, Fetcher};
use crate::model::{EntityId, EntityKind, Location, OrgTree, OrgUnit, User};
use crate::normalize::Normalizer;
use crate::persistence::{FileStorage, PersistenceCodec, StorageBackend};
use crate::store::{CollectionStatus, EntityStore, Generation, StoreState, StoredEntity};

/// Ticket identifying one in-flight refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub kind: EntityKind,
    pub generation: Generation,
}

/// What a completed refresh did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The batch replaced the kind's records
    Applied { count: usize },

    /// A newer refresh had already been applied; nothing changed
    Superseded,
}

/// Entity store plus its normalizer and persistence
///
/// ## Concurrency Model
/// - **Reads** go straight to the store's RwLock
/// - **Writes** (replace + save) are serialized by `write_lock`, so the
///   persisted document trails live state by at most one mutation
pub struct Directory<B: StorageBackend> {
    config: Config,
    store: EntityStore,
    codec: PersistenceCodec<B>,
    normalizer: Normalizer,
    write_lock: Mutex<()>,
}

impl Directory<FileStorage> {
    /// Open with file-backed storage under `config.data_dir`
    pub fn open_file(config: Config) -> Result<Self> {
        let backend = FileStorage::open(&config.data_dir)?;
        Self::open(config, backend)
    }

    /// Open with a path (default config otherwise)
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open_file(config)
    }
}

impl<B: StorageBackend> Directory<B> {
    /// Construct and hydrate from the persisted snapshot
    ///
    /// Only a bad config fails; an unreadable snapshot just means an empty
    /// start.
    pub fn open(config: Config, backend: B) -> Result<Self> {
        config.validate()?;

        let codec = PersistenceCodec::new(backend, config.storage_key.clone());
        let normalizer = Normalizer::new(&config);
        let store = EntityStore::new();

        let loaded = codec.load();
        if !loaded.is_empty() {
            info!(
                users = loaded.users.len(),
                locations = loaded.locations.len(),
                org_units = loaded.org_units.len(),
                "hydrating store from snapshot"
            );
        }
        store.hydrate(loaded);

        Ok(Self {
            config,
            store,
            codec,
            normalizer,
            write_lock: Mutex::new(()),
        })
    }

    // =========================================================================
    // Selectors
    // =========================================================================

    pub fn users_list(&self) -> Vec<User> {
        self.store.list()
    }

    pub fn user(&self, id: EntityId) -> Option<User> {
        self.store.get(id)
    }

    pub fn locations_list(&self) -> Vec<Location> {
        self.store.list()
    }

    pub fn location(&self, id: EntityId) -> Option<Location> {
        self.store.get(id)
    }

    pub fn org_units_list(&self) -> Vec<OrgUnit> {
        self.store.list()
    }

    pub fn org_unit(&self, id: EntityId) -> Option<OrgUnit> {
        self.store.get(id)
    }

    pub fn org_tree(&self) -> OrgTree {
        self.store.org_tree()
    }

    /// Users referencing a location, in user list order
    pub fn users_at_location(&self, location_id: EntityId) -> Vec<User> {
        self.store
            .filter(|user: &User| user.location_id == Some(location_id))
    }

    pub fn status(&self, kind: EntityKind) -> CollectionStatus {
        self.store.status(kind)
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    pub fn refresh_users(&self, fetcher: &impl Fetcher) -> Result<RefreshOutcome> {
        self.refresh(EntityKind::User, fetcher)
    }

    pub fn refresh_locations(&self, fetcher: &impl Fetcher) -> Result<RefreshOutcome> {
        self.refresh(EntityKind::Location, fetcher)
    }

    pub fn refresh_org_units(&self, fetcher: &impl Fetcher) -> Result<RefreshOutcome> {
        self.refresh(EntityKind::OrgUnit, fetcher)
    }

    pub fn refresh_org_tree(&self, fetcher: &impl Fetcher) -> Result<RefreshOutcome> {
        self.refresh(EntityKind::OrgTree, fetcher)
    }

    /// Fetch, normalize and apply one kind
    ///
    /// Only `Network` and `Schema` errors are returned; on error the store
    /// is unchanged.
    pub fn refresh(&self, kind: EntityKind, fetcher: &impl Fetcher) -> Result<RefreshOutcome> {
        let ticket = self.begin_refresh(kind);
        debug!(%kind, url = %self.config.endpoint_url(kind), generation = ticket.generation, "refresh started");

        let response = fetcher.fetch(kind).map_err(|e| {
            if e.is_fetch_error() {
                e
            } else {
                StoreError::network(e.to_string())
            }
        })?;

        self.apply_response(ticket, &response)
    }

    /// Issue a ticket for a refresh whose result will arrive later
    pub fn begin_refresh(&self, kind: EntityKind) -> RefreshTicket {
        RefreshTicket {
            kind,
            generation: self.store.begin_refresh(kind),
        }
    }

    /// Complete a refresh from the transport's raw response
    pub fn apply_response(
        &self,
        ticket: RefreshTicket,
        response: &FetchResponse,
    ) -> Result<RefreshOutcome> {
        let payload = decode_response(response)?;
        self.apply_payload(ticket, &payload)
    }

    /// Complete a refresh from an already-parsed payload
    pub fn apply_payload(&self, ticket: RefreshTicket, payload: &Value) -> Result<RefreshOutcome> {
        let generation = ticket.generation;
        match ticket.kind {
            EntityKind::User => {
                let records = self.normalizer.normalize_users(payload)?;
                Ok(self.apply_records(generation, records))
            }
            EntityKind::Location => {
                let records = self.normalizer.normalize_locations(payload)?;
                Ok(self.apply_records(generation, records))
            }
            EntityKind::OrgUnit => {
                let records = self.normalizer.normalize_org_units(payload)?;
                Ok(self.apply_records(generation, records))
            }
            EntityKind::OrgTree => {
                let tree = self.normalizer.normalize_org_tree(payload);
                let _write_guard = self.write_lock.lock();
                if !self.store.set_org_tree_if_current(generation, tree) {
                    return Ok(RefreshOutcome::Superseded);
                }
                self.persist();
                Ok(RefreshOutcome::Applied { count: 1 })
            }
        }
    }

    fn apply_records<T: StoredEntity>(&self, generation: Generation, records: Vec<T>) -> RefreshOutcome {
        let count = records.len();
        let _write_guard = self.write_lock.lock();

        if !self.store.replace_if_current(generation, records) {
            return RefreshOutcome::Superseded;
        }
        self.persist();
        RefreshOutcome::Applied { count }
    }

    // =========================================================================
    // Direct Writes
    // =========================================================================

    /// Replace a kind with already-normalized records
    pub fn replace<T: StoredEntity>(&self, records: Vec<T>) {
        let _write_guard = self.write_lock.lock();
        self.store.replace(records);
        self.persist();
    }

    /// Store an org tree payload verbatim
    pub fn set_org_tree(&self, tree: OrgTree) {
        let _write_guard = self.write_lock.lock();
        self.store.set_org_tree(tree);
        self.persist();
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Save now, regardless of the write-through setting
    ///
    /// Returns whether the snapshot landed.
    pub fn flush(&self) -> bool {
        let _write_guard = self.write_lock.lock();
        self.codec.save(&self.store.snapshot())
    }

    /// Write-through hook (called with write lock held)
    fn persist(&self) {
        if self.config.write_through {
            self.codec.save(&self.store.snapshot());
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn snapshot(&self) -> StoreState {
        self.store.snapshot()
    }

    pub fn codec(&self) -> &PersistenceCodec<B> {
        &self.codec
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
