//! Configuration for the address book store
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, StoreError};
use crate::model::EntityKind;

/// Main configuration for a store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Fixed key of the single persisted document
    pub storage_key: String,

    /// Root directory for file-backed storage
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {storage_key}.json   (persisted snapshot)
    pub data_dir: PathBuf,

    /// Persist after every mutation
    pub write_through: bool,

    // -------------------------------------------------------------------------
    // Backend Configuration
    // -------------------------------------------------------------------------
    /// Base URL of the directory API (prefixed to relative asset paths)
    pub base_url: String,

    /// API paths, one per entity kind
    pub endpoints: Endpoints,

    /// Image path substituted when a user has no photo
    pub photo_placeholder: Option<String>,
}

/// API paths for each refreshable kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub users: String,
    pub locations: String,
    pub org_units: String,
    pub org_tree: String,
}

impl Endpoints {
    /// Path for the given kind
    pub fn path(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Location => &self.locations,
            EntityKind::OrgUnit => &self.org_units,
            EntityKind::OrgTree => &self.org_tree,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            users: "/api/v2/departmentuser.json".to_string(),
            locations: "/api/v2/location.json".to_string(),
            org_units: "/api/v2/orgunit.json".to_string(),
            org_tree: "/api/v2/orgtree.json".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: "oim_addressbook".to_string(),
            data_dir: PathBuf::from("./addressbook_data"),
            write_through: true,
            base_url: String::new(),
            endpoints: Endpoints::default(),
            photo_placeholder: Some("/static/photo_placeholder.svg".to_string()),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the storage key can address a single slot on every backend
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.is_empty() {
            return Err(StoreError::Config("storage key must not be empty".to_string()));
        }

        let safe = self
            .storage_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !safe || self.storage_key.starts_with('.') {
            return Err(StoreError::Config(format!(
                "storage key {:?} must be alphanumeric, '_', '-' or '.'",
                self.storage_key
            )));
        }

        Ok(())
    }

    /// Full URL for a kind's endpoint
    pub fn endpoint_url(&self, kind: EntityKind) -> String {
        format!("{}{}", self.base_url, self.endpoints.path(kind))
    }

    /// Resolved placeholder photo URL, if one is configured
    pub fn placeholder_photo_url(&self) -> Option<String> {
        self.photo_placeholder
            .as_ref()
            .map(|path| format!("{}{}", self.base_url, path))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the key of the persisted document
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.config.storage_key = key.into();
        self
    }

    /// Set the data directory (root for file-backed storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Enable or disable saving after every mutation
    pub fn write_through(mut self, enabled: bool) -> Self {
        self.config.write_through = enabled;
        self
    }

    /// Set the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the endpoint paths
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    /// Set (or clear) the placeholder photo path
    pub fn photo_placeholder(mut self, path: Option<String>) -> Self {
        self.config.photo_placeholder = path;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
