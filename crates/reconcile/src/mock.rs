//! In-memory remote client for testing without network access.
//!
//! [`MockClient`] stores resources in memory, hands out identities `m-1`,
//! `m-2`, ... and fills in configured server defaults on create. Every call
//! is recorded so tests can assert on exactly what reached the "remote"
//! side, and failures can be injected per operation.
//!
//! ```
//! use reconcile::mock::{Call, MockClient};
//! use reconcile::{Payload, RemoteClient, Value};
//!
//! let mock = MockClient::new().with_default("admin_state_up", Value::Bool(true));
//! let snapshot = mock.create(&Payload::new()).unwrap();
//!
//! assert_eq!(snapshot.identity.as_str(), "m-1");
//! assert_eq!(snapshot.fields.get("admin_state_up"), Some(&Value::Bool(true)));
//! assert!(matches!(mock.calls()[0], Call::Create(_)));
//! ```

use crate::client::RemoteClient;
use crate::error::{Error, Result};
use crate::types::{ChangeSet, Fields, Payload, ResourceIdentity, Snapshot};
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Operation kinds, used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Get,
    Update,
    Delete,
}

/// A recorded client call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(Payload),
    Get(ResourceIdentity),
    Update(ResourceIdentity, ChangeSet),
    Delete(ResourceIdentity),
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Create(_) => Operation::Create,
            Self::Get(_) => Operation::Get,
            Self::Update(..) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
        }
    }
}

/// Failure to inject into the next call of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    Remote(String),
}

#[derive(Debug, Default)]
struct Inner {
    resources: BTreeMap<ResourceIdentity, Fields>,
    defaults: Fields,
    next_id: u32,
    calls: Vec<Call>,
    failures: HashMap<Operation, Failure>,
    partial_updates: bool,
}

/// Mock remote client.
///
/// Clones share the same in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    inner: Arc<Mutex<Inner>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value the "server" fills in when a create request omits the field
    pub fn with_default(self, name: &str, value: Value) -> Self {
        self.lock().defaults.insert(name.to_string(), value);
        self
    }

    /// Make update responses carry only the changed fields
    pub fn with_partial_updates(self) -> Self {
        self.lock().partial_updates = true;
        self
    }

    /// Store a resource directly, as if created by someone else
    pub fn insert(&self, identity: &str, fields: Fields) {
        self.lock()
            .resources
            .insert(ResourceIdentity::new(identity), fields);
    }

    /// Drop a resource behind the client's back (out-of-band delete)
    pub fn remove(&self, identity: &str) -> Option<Fields> {
        self.lock().resources.remove(&ResourceIdentity::new(identity))
    }

    /// Change one stored field (out-of-band edit)
    pub fn set_field(&self, identity: &str, name: &str, value: Value) {
        if let Some(fields) = self
            .lock()
            .resources
            .get_mut(&ResourceIdentity::new(identity))
        {
            fields.insert(name.to_string(), value);
        }
    }

    pub fn stored(&self, identity: &str) -> Option<Fields> {
        self.lock()
            .resources
            .get(&ResourceIdentity::new(identity))
            .cloned()
    }

    /// Fail the next call of `operation` with `failure`
    pub fn fail_next(&self, operation: Operation, failure: Failure) {
        self.lock().failures.insert(operation, failure);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of recorded calls of one operation kind
    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn record(&mut self, call: Call, identity: Option<&ResourceIdentity>) -> Result<()> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.remove(&operation) {
            None => Ok(()),
            Some(Failure::NotFound) => Err(Error::not_found(
                identity.map(ToString::to_string).unwrap_or_default(),
            )),
            Some(Failure::Remote(message)) => Err(Error::remote(message)),
        }
    }
}

impl RemoteClient for MockClient {
    fn create(&self, payload: &Payload) -> Result<Snapshot> {
        let mut inner = self.lock();
        inner.record(Call::Create(payload.clone()), None)?;

        inner.next_id += 1;
        let identity = ResourceIdentity::new(format!("m-{}", inner.next_id));

        let mut fields = inner.defaults.clone();
        fields.extend(payload.fields().clone());
        inner.resources.insert(identity.clone(), fields.clone());

        Ok(Snapshot { identity, fields })
    }

    fn get(&self, identity: &ResourceIdentity) -> Result<Snapshot> {
        let mut inner = self.lock();
        inner.record(Call::Get(identity.clone()), Some(identity))?;

        inner
            .resources
            .get(identity)
            .map(|fields| Snapshot {
                identity: identity.clone(),
                fields: fields.clone(),
            })
            .ok_or_else(|| Error::not_found(identity.as_str()))
    }

    fn update(&self, identity: &ResourceIdentity, changes: &ChangeSet) -> Result<Snapshot> {
        let mut inner = self.lock();
        inner.record(Call::Update(identity.clone(), changes.clone()), Some(identity))?;

        let partial = inner.partial_updates;
        let fields = inner
            .resources
            .get_mut(identity)
            .ok_or_else(|| Error::not_found(identity.as_str()))?;
        fields.extend(changes.fields().clone());

        let reported = if partial {
            changes.fields().clone()
        } else {
            fields.clone()
        };
        Ok(Snapshot {
            identity: identity.clone(),
            fields: reported,
        })
    }

    fn delete(&self, identity: &ResourceIdentity) -> Result<()> {
        let mut inner = self.lock();
        inner.record(Call::Delete(identity.clone()), Some(identity))?;

        inner
            .resources
            .remove(identity)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(identity.as_str()))
    }
}
