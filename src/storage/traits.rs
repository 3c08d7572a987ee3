use crate::types::{IdentityRow, Result};

/// Durable `key -> name` mapping backing the identity repository.
///
/// Deletes are idempotent: removing a key that is not stored is a no-op.
pub trait RowStore {
    fn create_schema_if_absent(&self) -> Result<()>;

    /// Inserts or replaces the whole row for `row.key`.
    fn upsert(&self, row: &IdentityRow) -> Result<()>;

    /// Streams every row, in no particular order, into `visit`.
    ///
    /// Each call re-issues the query; an error returned by `visit` stops the scan.
    fn for_each_row(&self, visit: &mut dyn FnMut(IdentityRow) -> Result<()>) -> Result<()>;

    fn select_by_key(&self, key: i64) -> Result<Option<IdentityRow>>;
    fn count_rows(&self) -> Result<u64>;
    fn exists_by_key(&self, key: i64) -> Result<bool>;
    fn delete_by_key(&self, key: i64) -> Result<()>;
    fn delete_all(&self) -> Result<()>;

    fn select_all(&self) -> Result<Vec<IdentityRow>> {
        let mut rows = Vec::new();
        self.for_each_row(&mut |row| {
            rows.push(row);
            Ok(())
        })?;
        Ok(rows)
    }
}
