use std::sync::Arc;

use super::{AsyncQuery, QueryCallbacks, QueryExecutor};
use crate::storage::IdentityStorage;
use crate::types::Identity;

/// Background forms of the [`IdentityStorage`] operations.
///
/// Each operation comes in two shapes: one returning an [`AsyncQuery`] handle,
/// and a `*_with` form that drives a [`QueryCallbacks`] lifecycle to the end.
#[derive(Clone)]
pub struct AsyncIdentityStorage {
    storage: Arc<IdentityStorage>,
    executor: QueryExecutor,
}

impl AsyncIdentityStorage {
    pub fn new(storage: Arc<IdentityStorage>, executor: QueryExecutor) -> Self {
        Self { storage, executor }
    }

    pub fn storage(&self) -> &Arc<IdentityStorage> {
        &self.storage
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    pub fn store(&self, identity: Identity) -> AsyncQuery<()> {
        let storage = self.storage.clone();
        self.executor.spawn("store", move || storage.store(&identity))
    }

    pub fn dump_all(&self) -> AsyncQuery<Vec<Identity>> {
        let storage = self.storage.clone();
        self.executor.spawn("dump_all", move || storage.dump_all())
    }

    pub fn fetch(&self, identity: Identity) -> AsyncQuery<Option<Identity>> {
        let storage = self.storage.clone();
        self.executor.spawn("fetch", move || storage.fetch(&identity))
    }

    pub fn exists(&self, identity: Identity) -> AsyncQuery<bool> {
        let storage = self.storage.clone();
        self.executor.spawn("exists", move || storage.exists(&identity))
    }

    pub fn count(&self) -> AsyncQuery<u64> {
        let storage = self.storage.clone();
        self.executor.spawn("count", move || storage.count())
    }

    pub fn remove(&self, identity: Identity) -> AsyncQuery<()> {
        let storage = self.storage.clone();
        self.executor.spawn("remove", move || storage.remove(&identity))
    }

    pub fn clear_all(&self) -> AsyncQuery<()> {
        let storage = self.storage.clone();
        self.executor.spawn("clear_all", move || storage.clear_all())
    }

    pub async fn store_with<C>(&self, identity: Identity, callbacks: &mut C)
    where
        C: QueryCallbacks<()> + ?Sized,
    {
        callbacks.on_start();
        self.store(identity).deliver(callbacks).await;
    }

    pub async fn dump_all_with<C>(&self, callbacks: &mut C)
    where
        C: QueryCallbacks<Vec<Identity>> + ?Sized,
    {
        callbacks.on_start();
        self.dump_all().deliver(callbacks).await;
    }

    pub async fn fetch_with<C>(&self, identity: Identity, callbacks: &mut C)
    where
        C: QueryCallbacks<Option<Identity>> + ?Sized,
    {
        callbacks.on_start();
        self.fetch(identity).deliver(callbacks).await;
    }

    pub async fn exists_with<C>(&self, identity: Identity, callbacks: &mut C)
    where
        C: QueryCallbacks<bool> + ?Sized,
    {
        callbacks.on_start();
        self.exists(identity).deliver(callbacks).await;
    }

    pub async fn count_with<C>(&self, callbacks: &mut C)
    where
        C: QueryCallbacks<u64> + ?Sized,
    {
        callbacks.on_start();
        self.count().deliver(callbacks).await;
    }

    pub async fn remove_with<C>(&self, identity: Identity, callbacks: &mut C)
    where
        C: QueryCallbacks<()> + ?Sized,
    {
        callbacks.on_start();
        self.remove(identity).deliver(callbacks).await;
    }

    pub async fn clear_all_with<C>(&self, callbacks: &mut C)
    where
        C: QueryCallbacks<()> + ?Sized,
    {
        callbacks.on_start();
        self.clear_all().deliver(callbacks).await;
    }
}
