//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! AppState owns one [`Store`] per resource:
//! - **Units**: keyed by UUID, unique on `(name, race)`
//! - **Skills**: keyed by UUID, unique on `name`
//!
//! Stores are constructed empty when the process starts and live until it
//! exits. Nothing is persisted.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use thiserror::Error;
use unitdex_core::{Race, Skill, Unit, ValidationErrors};
use uuid::Uuid;

use crate::middleware::metrics::ApiMetrics;

// -- Records ------------------------------------------------------------------

/// A record kind that can live in a [`Store`].
pub trait Record: Clone + Send + Sync {
    /// Uniqueness key; no two live records may share one.
    type Key: PartialEq;

    /// Human-readable kind, used in error messages ("Unit", "Skill").
    const KIND: &'static str;

    /// Server-assigned identifier.
    fn id(&self) -> Uuid;

    /// Creation time, used to order listings.
    fn created_at(&self) -> DateTime<Utc>;

    /// Key checked for uniqueness on insert and update.
    fn identity_key(&self) -> Self::Key;

    /// Message reported when the key is already taken.
    fn duplicate_message(&self) -> String;
}

impl Record for Unit {
    type Key = (String, Race);
    const KIND: &'static str = "Unit";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn identity_key(&self) -> Self::Key {
        Unit::identity_key(self)
    }

    fn duplicate_message(&self) -> String {
        Unit::duplicate_message(self)
    }
}

impl Record for Skill {
    type Key = String;
    const KIND: &'static str = "Skill";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn identity_key(&self) -> Self::Key {
        Skill::identity_key(self)
    }

    fn duplicate_message(&self) -> String {
        Skill::duplicate_message(self)
    }
}

// -- Store errors -------------------------------------------------------------

/// Failure of a store operation. The store is unchanged whenever one is returned.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No live record has this identifier.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind.
        kind: &'static str,
        /// The requested identifier.
        id: Uuid,
    },

    /// An insert reused a live identifier.
    #[error("{kind} {id} already exists")]
    DuplicateId {
        /// Record kind.
        kind: &'static str,
        /// The colliding identifier.
        id: Uuid,
    },

    /// Another live record already holds the uniqueness key.
    #[error("{0}")]
    Conflict(String),

    /// The merged record of an update failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory record store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because the lock is never held across `.await` points. Every compound
/// operation (uniqueness check + insert, read + merge + validate + write) runs
/// under a single write guard, so concurrent handlers cannot interleave inside it.
#[derive(Debug)]
pub struct Store<T: Record> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Record> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Record> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a new record.
    ///
    /// Fails if its id is already live or if another live record has the
    /// same uniqueness key.
    pub fn insert(&self, record: T) -> Result<T, StoreError> {
        let mut guard = self.data.write();
        let id = record.id();
        if guard.contains_key(&id) {
            return Err(StoreError::DuplicateId { kind: T::KIND, id });
        }
        let key = record.identity_key();
        if guard.values().any(|existing| existing.identity_key() == key) {
            return Err(StoreError::Conflict(record.duplicate_message()));
        }
        guard.insert(id, record.clone());
        Ok(record)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Result<T, StoreError> {
        self.data
            .read()
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: T::KIND, id: *id })
    }

    /// All records matching `predicate`, oldest first.
    pub fn list(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut records: Vec<T> = self
            .data
            .read()
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.created_at(), r.id()));
        records
    }

    /// Atomically read-merge-validate-update a record.
    ///
    /// `merge` receives the current record and returns its replacement, or a
    /// validation error. The replacement is then checked for uniqueness
    /// against every other live record. Nothing is written unless both
    /// checks pass. The record keeps its original id.
    pub fn update(
        &self,
        id: &Uuid,
        merge: impl FnOnce(&T) -> Result<T, ValidationErrors>,
    ) -> Result<T, StoreError> {
        let mut guard = self.data.write();
        let current = guard
            .get(id)
            .ok_or(StoreError::NotFound { kind: T::KIND, id: *id })?;
        let merged = merge(current)?;
        debug_assert_eq!(merged.id(), *id, "merge must not reassign the id");

        let key = merged.identity_key();
        let taken = guard
            .iter()
            .any(|(other_id, other)| other_id != id && other.identity_key() == key);
        if taken {
            return Err(StoreError::Conflict(merged.duplicate_message()));
        }
        guard.insert(*id, merged.clone());
        Ok(merged)
    }

    /// Remove a record by ID, returning it.
    pub fn delete(&self, id: &Uuid) -> Result<T, StoreError> {
        self.data
            .write()
            .remove(id)
            .ok_or(StoreError::NotFound { kind: T::KIND, id: *id })
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Application State --------------------------------------------------------

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind the HTTP server to.
    pub host: IpAddr,
    /// Port to bind the HTTP server to.
    pub port: u16,
}

impl AppConfig {
    /// Read `HOST` and `PORT` from the environment.
    ///
    /// Unset variables use the defaults; unparseable ones are logged and
    /// replaced by the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let host = match lookup("HOST") {
            Some(raw) => raw.trim().parse::<IpAddr>().unwrap_or_else(|e| {
                tracing::warn!(value = %raw, error = %e, "invalid HOST, using {}", defaults.host);
                defaults.host
            }),
            None => defaults.host,
        };
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|e| {
                tracing::warn!(value = %raw, error = %e, "invalid PORT, using {}", defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };
        Self { host, port }
    }

    /// Socket address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store`; every clone sees the
/// same records.
#[derive(Debug, Clone)]
pub struct AppState {
    pub units: Store<Unit>,
    pub skills: Store<Skill>,
    /// Request counters maintained by the metrics middleware.
    pub metrics: ApiMetrics,
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration and empty stores.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application state with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            units: Store::new(),
            skills: Store::new(),
            metrics: ApiMetrics::new(),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
