//! Per-person mutual exclusion for read-decide-write sequences.

use crate::model::event::PersonId;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fixed set of mutex shards; a person always maps to the same shard.
///
/// Different people may share a shard, which only over-serializes.
#[derive(Debug)]
pub struct PersonLocks {
    shards: Vec<Mutex<()>>,
}

impl PersonLocks {
    pub fn new(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Blocks until the person's shard is free.
    pub fn lock(&self, person_id: PersonId) -> MutexGuard<'_, ()> {
        self.shards[self.shard_index(person_id)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn shard_index(&self, person_id: PersonId) -> usize {
        (fnv1a_u64(&person_id.to_le_bytes()) % self.shards.len() as u64) as usize
    }
}

/// FNV-1a, stable across runs and platforms.
fn fnv1a_u64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::PersonLocks;

    #[test]
    fn zero_shards_is_clamped_to_one() {
        let locks = PersonLocks::new(0);
        assert_eq!(locks.shard_count(), 1);
        assert_eq!(locks.shard_index(42), 0);
    }

    #[test]
    fn shard_index_is_stable_and_in_range() {
        let locks = PersonLocks::new(8);
        for person_id in -50..50 {
            let idx = locks.shard_index(person_id);
            assert!(idx < 8);
            assert_eq!(idx, locks.shard_index(person_id));
        }
    }

    #[test]
    fn same_person_lock_is_exclusive() {
        let locks = PersonLocks::new(4);
        let guard = locks.lock(7);
        let idx = locks.shard_index(7);
        assert!(locks.shards[idx].try_lock().is_err());
        drop(guard);
        assert!(locks.shards[idx].try_lock().is_ok());
    }
}
