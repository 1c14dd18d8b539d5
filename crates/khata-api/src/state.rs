//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Six stores, one per aggregate: accounts (payment and KYC embedded),
//! scanned documents, ledger transactions, private connections, groups,
//! and item loans. The OCR engine sits behind the `TextExtractor` trait
//! object so tests can drive the pipeline with canned text.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use khata_account::Account;
use khata_ledger::LedgerTransaction;
use khata_ocr::{NoopExtractor, ScannedDocument, TextExtractor};
use khata_private::{Group, ItemLoan, PrivateConnection};

// ── Generic In-Memory Store ─────────────────────────────────────────

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because we never hold the lock across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
///
/// Insertion order is tracked and `list` returns it, so listings and
/// aggregation folds see a stable, deterministic order. This is the
/// store-level anchor for every "first-seen" tie-break downstream.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    inner: Arc<RwLock<Inner<T>>>,
}

#[derive(Debug)]
struct Inner<T> {
    data: HashMap<Uuid, T>,
    order: Vec<Uuid>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                data: HashMap::new(),
                order: Vec::new(),
            })),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        let mut guard = self.inner.write();
        let previous = guard.data.insert(id, value);
        if previous.is_none() {
            guard.order.push(id);
        }
        previous
    }

    /// Insert a record only if no existing record matches `conflicts`.
    ///
    /// The scan and the insert run under one write lock, so two
    /// concurrent inserts with the same conflicting attribute (e.g. an
    /// email address) cannot both succeed.
    pub fn insert_unique(
        &self,
        id: Uuid,
        value: T,
        conflicts: impl Fn(&T) -> bool,
    ) -> Result<(), ()> {
        let mut guard = self.inner.write();
        if guard.data.values().any(conflicts) {
            return Err(());
        }
        guard.data.insert(id, value);
        guard.order.push(id);
        Ok(())
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.inner.read().data.get(id).cloned()
    }

    /// List all records in insertion order.
    pub fn list(&self) -> Vec<T> {
        let guard = self.inner.read();
        guard
            .order
            .iter()
            .filter_map(|id| guard.data.get(id).cloned())
            .collect()
    }

    /// First record matching the predicate, in insertion order.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        let guard = self.inner.read();
        guard
            .order
            .iter()
            .filter_map(|id| guard.data.get(id))
            .find(|v| predicate(v))
            .cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.inner.write();
        if let Some(entry) = guard.data.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current state,
    /// validate preconditions, mutate the record, and return `Ok(R)` or
    /// `Err(E)`. The entire operation runs under a single write lock,
    /// eliminating TOCTOU races between read and update.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.inner.write().data.get_mut(id).map(f)
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        let mut guard = self.inner.write();
        let removed = guard.data.remove(id);
        if removed.is_some() {
            guard.order.retain(|existing| existing != id);
        }
        removed
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Application State ───────────────────────────────────────────────

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token secret. If `None`, authentication is disabled
    /// and every request runs as an unbound superuser (development mode).
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store`.
#[derive(Clone)]
pub struct AppState {
    /// Account aggregates (payment and KYC records embedded).
    pub accounts: Store<Account>,
    /// Scanned receipt documents.
    pub documents: Store<ScannedDocument>,
    /// Ledger transactions, business and private.
    pub transactions: Store<LedgerTransaction>,
    /// Private connections.
    pub connections: Store<PrivateConnection>,
    /// Private groups.
    pub groups: Store<Group>,
    /// Private item loans.
    pub item_loans: Store<ItemLoan>,
    /// OCR engine behind the trait boundary.
    pub extractor: Arc<dyn TextExtractor>,
    /// Application configuration.
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("accounts", &self.accounts.len())
            .field("documents", &self.documents.len())
            .field("transactions", &self.transactions.len())
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Create a new application state with default configuration and no
    /// OCR engine wired.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application state with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_extractor(config, Arc::new(NoopExtractor))
    }

    /// Create a new application state with the given configuration and
    /// OCR engine.
    pub fn with_extractor(config: AppConfig, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            accounts: Store::new(),
            documents: Store::new(),
            transactions: Store::new(),
            connections: Store::new(),
            groups: Store::new(),
            item_loans: Store::new(),
            extractor,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
