//! Append-only memoization of classifications and generated statements.

use std::any::TypeId;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::classify::{Classification, ProjectionShape};
use crate::dialect::Dialect;
use crate::translation::PositionalSql;

type Slot<V> = Mutex<Option<Arc<V>>>;

/// A concurrent map whose entries are built once and never replaced or removed.
///
/// Each key owns a slot; builders for the same key run one at a time, so a value is built at
/// most once per key and every caller gets the same `Arc`. Builders for different keys do not
/// wait on each other.
pub struct OnceMap<K, V> {
    inner: RwLock<HashMap<K, Arc<Slot<V>>>>,
}

impl<K, V> Default for OnceMap<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

// entries are only ever published whole, so poisoned locks still guard consistent data
fn lock<V>(slot: &Slot<V>) -> MutexGuard<'_, Option<Arc<V>>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<K: Eq + Hash, V> OnceMap<K, V> {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, Arc<Slot<V>>>> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, Arc<Slot<V>>>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = self.read().get(key).cloned()?;
        lock(&slot).clone()
    }

    /// Return the published value for `key`, building and publishing it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the builder's error; nothing is published in that case and the next caller
    /// builds again.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let existing = self.read().get(&key).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => Arc::clone(self.write().entry(key).or_default()),
        };
        let mut value = lock(&slot);
        if let Some(found) = value.as_ref() {
            return Ok(Arc::clone(found));
        }
        let built = Arc::new(build()?);
        *value = Some(Arc::clone(&built));
        Ok(built)
    }

    /// Number of published entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read()
            .values()
            .filter(|slot| lock(slot).is_some())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a cached statement is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Model(TypeId),
    /// A projection, by its qualified property list.
    Projection(String),
}

/// Statements whose text depends only on the subject and the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// `identity` is true when the key column is left to the database.
    Insert { identity: bool },
    Get,
    Update,
    DeleteByKey,
}

/// Statement cache key; the dialect is part of every key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementKey {
    pub dialect: Dialect,
    pub subject: Subject,
    pub kind: StatementKind,
}

/// The caches owned by one [`Crud`](crate::crud::Crud).
#[derive(Default)]
pub struct CrudCache {
    pub(crate) classifications: OnceMap<TypeId, Classification>,
    pub(crate) projections: OnceMap<String, ProjectionShape>,
    pub(crate) statements: OnceMap<StatementKey, PositionalSql>,
}

impl CrudCache {
    /// Number of cached classifications, projections and statements.
    #[must_use]
    pub fn sizes(&self) -> (usize, usize, usize) {
        (
            self.classifications.len(),
            self.projections.len(),
            self.statements.len(),
        )
    }
}

impl std::fmt::Debug for CrudCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (classifications, projections, statements) = self.sizes();
        f.debug_struct("CrudCache")
            .field("classifications", &classifications)
            .field("projections", &projections)
            .field("statements", &statements)
            .finish()
    }
}
