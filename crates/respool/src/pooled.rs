//! Client facade: the checked-out resource guard and scoped acquisition.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::PoolError;
use crate::factory::ResourceFactory;
use crate::lifecycle::{ResourceMetadata, ResourceState};
use crate::pool::{Entry, Pool, PoolInner};

/// A resource checked out of a [`Pool`].
///
/// Dereferences to the resource. When dropped, the resource is returned to
/// the pool, or handed straight to the oldest queued caller.
#[must_use = "dropping the guard returns the resource immediately"]
pub struct Pooled<F: ResourceFactory> {
    entry: Option<Entry<F::Resource>>,
    inner: Arc<PoolInner<F>>,
}

impl<F: ResourceFactory> Pooled<F> {
    pub(crate) fn new(mut entry: Entry<F::Resource>, inner: Arc<PoolInner<F>>) -> Self {
        entry.meta.mark_checkout();
        Self {
            entry: Some(entry),
            inner,
        }
    }

    fn entry(&self) -> &Entry<F::Resource> {
        match &self.entry {
            Some(entry) => entry,
            None => unreachable!("pooled entry is only taken on consumption"),
        }
    }

    fn entry_mut(&mut self) -> &mut Entry<F::Resource> {
        match &mut self.entry {
            Some(entry) => entry,
            None => unreachable!("pooled entry is only taken on consumption"),
        }
    }

    /// Lifecycle metadata of the resource.
    #[must_use]
    pub fn metadata(&self) -> &ResourceMetadata {
        &self.entry().meta
    }

    /// Remove the resource from the pool and take ownership of it.
    ///
    /// The capacity slot is freed; the pool may create a replacement.
    pub fn detach(mut self) -> F::Resource {
        let entry = self.entry.take();
        self.inner.forget_in_use();
        match entry {
            Some(entry) => entry.resource,
            None => unreachable!("pooled entry is only taken on consumption"),
        }
    }

    /// Destroy the resource instead of returning it, e.g. after an I/O error.
    pub fn discard(self) {
        self.evict(ResourceState::Discarded);
    }

    pub(crate) fn evict(mut self, state: ResourceState) {
        if let Some(mut entry) = self.entry.take() {
            entry.meta.state = state;
            self.inner.evict_in_use(entry);
        }
    }
}

impl<F: ResourceFactory> Deref for Pooled<F> {
    type Target = F::Resource;

    fn deref(&self) -> &F::Resource {
        &self.entry().resource
    }
}

impl<F: ResourceFactory> DerefMut for Pooled<F> {
    fn deref_mut(&mut self) -> &mut F::Resource {
        &mut self.entry_mut().resource
    }
}

impl<F: ResourceFactory> Drop for Pooled<F> {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            self.inner.checkin(entry);
        }
    }
}

impl<F> fmt::Debug for Pooled<F>
where
    F: ResourceFactory,
    F::Resource: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.entry.as_ref();
        f.debug_struct("Pooled")
            .field("resource", &entry.map(|e| &e.resource))
            .field("metadata", &entry.map(|e| &e.meta))
            .finish()
    }
}

impl<F: ResourceFactory> Pool<F> {
    /// Run `f` with a resource from the pool.
    ///
    /// The resource is acquired with the configured timeout and returned when
    /// `f` completes, fails, panics, or the returned future is dropped.
    ///
    /// ```rust,ignore
    /// let rows = pool
    ///     .with_resource(|conn| Box::pin(async move { conn.query("SELECT 1").await }))
    ///     .await?;
    /// ```
    pub async fn with_resource<T, E, Fun>(&self, f: Fun) -> Result<T, E>
    where
        Fun: for<'r> FnOnce(&'r mut F::Resource) -> BoxFuture<'r, Result<T, E>>,
        E: From<PoolError>,
    {
        let mut pooled = self.acquire().await?;
        f(&mut *pooled).await
    }
}
