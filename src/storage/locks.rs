use std::sync::{Mutex, MutexGuard};

const STRIPES: usize = 32;

/// Striped write locks keyed by identity key.
///
/// `store` and `remove` on the same key are serialized so the row and the face
/// file cannot be left pointing at different writes. Keys that share a stripe
/// are serialized too, which is harmless.
#[derive(Debug)]
pub struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self {
            stripes: (0..STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }
}

impl KeyLocks {
    fn stripe(&self, key: i64) -> usize {
        (key.rem_euclid(STRIPES as i64)) as usize
    }

    pub fn lock(&self, key: i64) -> MutexGuard<'_, ()> {
        let m = &self.stripes[self.stripe(key)];
        // the guarded value is (), so a poisoned stripe carries no broken state
        m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Locks every stripe in order; used by whole-store operations.
    pub fn lock_all(&self) -> Vec<MutexGuard<'_, ()>> {
        self.stripes
            .iter()
            .map(|m| m.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
            .collect()
    }
}
