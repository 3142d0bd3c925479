use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::OnceCell;

use crate::model::PlayerStats;

type Slot = Arc<OnceCell<Arc<PlayerStats>>>;

/// Run-scoped store of canonical player records.
///
/// Each identity owns one `OnceCell` slot. The map lock is only held to find
/// or create the slot, so lookups for other players never wait on a slow
/// upstream fetch, while two callers racing on the same new identity share a
/// single computation.
#[derive(Debug, Default)]
pub struct StatsCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<Arc<PlayerStats>> {
        self.read()
            .get(identity)
            .and_then(|slot| slot.get().cloned())
    }

    pub fn get_or_compute<F>(&self, identity: &str, compute: F) -> Arc<PlayerStats>
    where
        F: FnOnce() -> PlayerStats,
    {
        let slot = self.slot(identity);
        slot.get_or_init(|| Arc::new(compute())).clone()
    }

    /// Insert a ready-made record. Returns false and keeps the existing
    /// record if the identity is already present.
    pub fn seed(&self, identity: &str, stats: PlayerStats) -> bool {
        self.slot(identity).set(Arc::new(stats)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All computed records, ordered by identity.
    pub fn snapshot(&self) -> Vec<(String, Arc<PlayerStats>)> {
        let mut rows: Vec<(String, Arc<PlayerStats>)> = self
            .read()
            .iter()
            .filter_map(|(id, slot)| slot.get().map(|stats| (id.clone(), stats.clone())))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    fn slot(&self, identity: &str) -> Slot {
        if let Some(slot) = self.read().get(identity) {
            return slot.clone();
        }
        self.write()
            .entry(identity.to_string())
            .or_default()
            .clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Slot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}
