//! Remote Resource Client interface.
//!
//! Implementations own transport, authentication, endpoint selection and
//! any retry of transient faults. The reconciler calls each method at most
//! once per operation and passes every error back to its caller.

use crate::error::Result;
use crate::types::{ChangeSet, Payload, ResourceIdentity, Snapshot};

/// Create / Get / Update / Delete against one remote resource type.
///
/// A missing resource is reported as [`crate::Error::NotFound`]; every
/// other failure as [`crate::Error::Remote`].
pub trait RemoteClient: Send + Sync {
    /// Create a resource; the snapshot carries the assigned identity
    fn create(&self, payload: &Payload) -> Result<Snapshot>;

    /// Fetch the current remote view of a resource
    fn get(&self, identity: &ResourceIdentity) -> Result<Snapshot>;

    /// Send only the changed fields.
    ///
    /// The returned snapshot may be incomplete; callers needing the
    /// authoritative view follow up with [`RemoteClient::get`].
    fn update(&self, identity: &ResourceIdentity, changes: &ChangeSet) -> Result<Snapshot>;

    fn delete(&self, identity: &ResourceIdentity) -> Result<()>;
}

impl<C: RemoteClient + ?Sized> RemoteClient for Box<C> {
    fn create(&self, payload: &Payload) -> Result<Snapshot> {
        (**self).create(payload)
    }

    fn get(&self, identity: &ResourceIdentity) -> Result<Snapshot> {
        (**self).get(identity)
    }

    fn update(&self, identity: &ResourceIdentity, changes: &ChangeSet) -> Result<Snapshot> {
        (**self).update(identity, changes)
    }

    fn delete(&self, identity: &ResourceIdentity) -> Result<()> {
        (**self).delete(identity)
    }
}
