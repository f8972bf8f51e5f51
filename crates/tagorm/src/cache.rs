//! Column-name cache keyed by table.
//!
//! The query compiler asks for the ordered column names of a record on every
//! compile. The cache resolves them once per table and hands out shared slices.
//! A table can only be mapped by one record type; a second type claiming the
//! same table is reported as a configuration error.

use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone)]
struct CacheEntry {
    type_name: &'static str,
    columns: Arc<[&'static str]>,
    generation: u64,
}

/// Per-connection cache of ordered column names.
///
/// `Send + Sync`; share it between connections with `Arc`.
#[derive(Debug, Default)]
pub struct ColumnCache {
    entries: Mutex<HashMap<&'static str, CacheEntry>>,
    generation: AtomicU64,
}

impl ColumnCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered column names for `R`, populating the cache on first use.
    pub fn columns<R: Record>(&self) -> OrmResult<Arc<[&'static str]>> {
        let table = R::table_name();
        let type_name = std::any::type_name::<R>();

        if let Some(entry) = self.lock().get(table) {
            return check_owner(table, entry, type_name).map(|()| Arc::clone(&entry.columns));
        }

        // Resolve outside the lock.
        let columns: Arc<[&'static str]> = R::columns().iter().map(|c| c.name).collect();
        let generation = self.generation.load(Ordering::Acquire);

        let mut entries = self.lock();
        let entry = entries.entry(table).or_insert_with(|| CacheEntry {
            type_name,
            columns,
            generation,
        });
        check_owner(table, entry, type_name)?;
        Ok(Arc::clone(&entry.columns))
    }

    /// Drop the entry for one table.
    pub fn invalidate(&self, table: &str) -> bool {
        self.lock().remove(table).is_some()
    }

    /// Drop every entry and start a new generation.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.lock().contains_key(table)
    }

    /// Number of times [`ColumnCache::clear`] has run.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Generation in which `table` was cached, if it is cached.
    pub fn entry_generation(&self, table: &str) -> Option<u64> {
        self.lock().get(table).map(|e| e.generation)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<&'static str, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_owner(table: &str, entry: &CacheEntry, type_name: &'static str) -> OrmResult<()> {
    if entry.type_name == type_name {
        Ok(())
    } else {
        Err(OrmError::config(format!(
            "table '{table}' is mapped by both {} and {type_name}",
            entry.type_name
        )))
    }
}
