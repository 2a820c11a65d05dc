//! Resource factory.
//!
//! The pool never constructs backing resources itself. A [`ResourceFactory`]
//! opens them (a database connection, a socket, a session), checks them
//! before reuse, and tears them down when the pool evicts them.

use std::fmt::Display;

use async_trait::async_trait;

/// Creates, validates and destroys the resources held by a pool.
#[async_trait]
pub trait ResourceFactory: Send + Sync + 'static {
    /// The pooled resource type.
    type Resource: Send + 'static;

    /// Error returned by the factory.
    type Error: Display + Send + 'static;

    /// Open a new resource.
    async fn create(&self) -> Result<Self::Resource, Self::Error>;

    /// Check that an idle resource is still usable before handing it out.
    ///
    /// Only called when `test_on_checkout` is enabled. A failed validation
    /// destroys the resource and the pool tries the next one.
    async fn validate(&self, _resource: &mut Self::Resource) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Tear down a resource the pool is evicting.
    ///
    /// On error the resource is handed back so the reaper can retry on its
    /// next sweep; its capacity slot stays reserved until then.
    async fn destroy(&self, resource: Self::Resource) -> Result<(), (Self::Resource, Self::Error)> {
        drop(resource);
        Ok(())
    }
}
