use std::path::Path;
use std::sync::Arc;

use super::faces::FaceStore;
use super::locks::KeyLocks;
use super::sqlite::{SqliteRowStore, DB_NAME};
use super::traits::RowStore;
use crate::configuration::StorageConfig;
use crate::types::{Identity, IdentityRow, Result};

/// Identity repository over a row store and a face directory.
///
/// The two stores are not updated transactionally. A failure between the row
/// write and the face write leaves a row without a face, which reads report
/// as an identity with no image. Writers on the same key are serialized by
/// [`KeyLocks`]; readers are not.
pub struct IdentityStorage {
    rows: Arc<dyn RowStore + Send + Sync>,
    faces: FaceStore,
    locks: KeyLocks,
}

impl IdentityStorage {
    /// Opens (creating if absent) the database and faces directory under
    /// `config.data_dir`.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let data_dir = Path::new(&config.data_dir);
        std::fs::create_dir_all(data_dir)
            .map_err(|e| crate::types::IdentityError::io("create data dir", data_dir, e))?;

        let rows = SqliteRowStore::new(data_dir.join(DB_NAME))
            .with_busy_timeout(config.busy_timeout());
        let faces = FaceStore::open(data_dir)?;
        Self::with_stores(Arc::new(rows), faces)
    }

    /// Builds a repository from already constructed stores and ensures the
    /// row schema exists.
    pub fn with_stores(rows: Arc<dyn RowStore + Send + Sync>, faces: FaceStore) -> Result<Self> {
        rows.create_schema_if_absent()?;
        Ok(Self {
            rows,
            faces,
            locks: KeyLocks::default(),
        })
    }

    pub fn faces(&self) -> &FaceStore {
        &self.faces
    }

    /// Sets the name row for `identity.key`, then writes its face if one is given.
    ///
    /// The row is replaced as a whole: a `None` name clears a stored name. A
    /// `None` image keeps whatever face was stored before.
    pub fn store(&self, identity: &Identity) -> Result<()> {
        let _guard = self.locks.lock(identity.key);
        self.rows.upsert(&IdentityRow::from(identity))?;
        self.faces.write(identity.key, identity.image.as_ref())?;
        log::debug!("stored identity {}", identity.key);
        Ok(())
    }

    /// Every stored identity, each with its face if one exists.
    pub fn dump_all(&self) -> Result<Vec<Identity>> {
        let mut out = Vec::new();
        self.rows.for_each_row(&mut |row| {
            out.push(self.complete(row)?);
            Ok(())
        })?;
        Ok(out)
    }

    /// Looks up `identity.key`; other fields of the argument are ignored.
    pub fn fetch(&self, identity: &Identity) -> Result<Option<Identity>> {
        match self.rows.select_by_key(identity.key)? {
            Some(row) => Ok(Some(self.complete(row)?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, identity: &Identity) -> Result<bool> {
        self.rows.exists_by_key(identity.key)
    }

    pub fn count(&self) -> Result<u64> {
        self.rows.count_rows()
    }

    /// Deletes the row and the face for `identity.key`. Missing entries are fine.
    pub fn remove(&self, identity: &Identity) -> Result<()> {
        let _guard = self.locks.lock(identity.key);
        self.rows.delete_by_key(identity.key)?;
        self.faces.delete(identity.key)?;
        log::debug!("removed identity {}", identity.key);
        Ok(())
    }

    pub fn clear_all(&self) -> Result<()> {
        let _guards = self.locks.lock_all();
        self.rows.delete_all()?;
        self.faces.clear()?;
        log::info!("cleared all identities");
        Ok(())
    }

    // The face is looked up by the key read back from the row store.
    fn complete(&self, row: IdentityRow) -> Result<Identity> {
        let image = self.faces.read(row.key)?;
        Ok(Identity::new(row.key, row.name, image))
    }
}
