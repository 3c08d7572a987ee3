use std::sync::Arc;

use crate::context;
use crate::query::{AsyncIdentityStorage, QueryExecutor};
use crate::storage::IdentityStorage;
use anyhow::{Context, Result};

pub fn init_storage(ctx: &context::Context) -> Result<Arc<IdentityStorage>> {
    let storage = IdentityStorage::open(&ctx.config.storage()).context("initializing storage")?;
    Ok(Arc::new(storage))
}

pub fn build_identities(ctx: &context::Context, storage: Arc<IdentityStorage>) -> AsyncIdentityStorage {
    AsyncIdentityStorage::new(storage, QueryExecutor::new(ctx.config.workers))
}
