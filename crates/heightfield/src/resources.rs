//! Shared noise resources handed out to surface entities.
//!
//! Every terrain sampling the same manager shares one permutation table. The
//! table is built by whichever entity acquires it first and is released when the
//! last `Arc` handle goes away; a later acquire builds a fresh one.

use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use crate::kernel::PermutationTable;

#[derive(Debug, Default)]
pub struct NoiseResources {
    /// `None` shuffles every new table from entropy.
    seed: Option<u64>,
    permutation: Mutex<Weak<PermutationTable>>,
}

impl NoiseResources {
    /// Manager whose tables are shuffled from OS entropy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager whose tables are always shuffled from `seed`, so terrain survives
    /// a release/re-acquire cycle unchanged.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            permutation: Mutex::new(Weak::new()),
        }
    }

    /// Process-wide manager, created on first use.
    pub fn global() -> &'static NoiseResources {
        static GLOBAL: OnceLock<NoiseResources> = OnceLock::new();
        GLOBAL.get_or_init(NoiseResources::new)
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Get the live table, building it if nobody holds one.
    ///
    /// Construction happens under the lock, so racing first users all receive
    /// the same fully built table.
    pub fn acquire_permutation(&self) -> Arc<PermutationTable> {
        let mut slot = self
            .permutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(table) = slot.upgrade() {
            return table;
        }

        let table = Arc::new(match self.seed {
            Some(seed) => PermutationTable::from_seed(seed),
            None => PermutationTable::from_entropy(),
        });
        log::debug!("Built permutation table (seed: {:?})", self.seed);
        *slot = Arc::downgrade(&table);
        table
    }

    /// Give a handle back. The table is freed once the last handle is released.
    pub fn release(&self, table: Arc<PermutationTable>) {
        drop(table);
        if self.live_handles() == 0 {
            log::debug!("Permutation table released");
        }
    }

    /// Number of outstanding handles to the current table.
    pub fn live_handles(&self) -> usize {
        self.permutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .strong_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn acquire_shares_one_table() {
        let resources = NoiseResources::seeded(5);
        let a = resources.acquire_permutation();
        let b = resources.acquire_permutation();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(resources.live_handles(), 2);
    }

    #[test]
    fn last_release_frees_table() {
        let resources = NoiseResources::seeded(5);
        let a = resources.acquire_permutation();
        let b = resources.acquire_permutation();
        resources.release(a);
        assert_eq!(resources.live_handles(), 1);
        resources.release(b);
        assert_eq!(resources.live_handles(), 0);

        // Seeded managers rebuild the same shuffle.
        let again = resources.acquire_permutation();
        assert_eq!(*again, PermutationTable::from_seed(5));
    }

    #[test]
    fn concurrent_first_use_builds_once() {
        let resources = Arc::new(NoiseResources::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resources = Arc::clone(&resources);
                thread::spawn(move || resources.acquire_permutation())
            })
            .collect();
        let tables: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("acquire thread panicked"))
            .collect();
        for t in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], t));
        }
    }

    #[test]
    fn global_manager_is_a_singleton() {
        assert!(std::ptr::eq(NoiseResources::global(), NoiseResources::global()));
    }
}
