//! Core data types: declared spec, applied state, remote snapshot, change set

use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field name to value mapping shared by every data type here
pub type Fields = BTreeMap<String, Value>;

/// Opaque identity assigned by the remote system on creation.
///
/// The empty identity means "does not exist remotely".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceIdentity(String);

impl ResourceIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identity of a resource that does not exist
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceIdentity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Lifecycle phase of a resource.
///
/// `Absent` and `Present` are the resting phases between passes; the other
/// three only exist while a remote call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Absent,
    Creating,
    Present,
    Updating,
    Deleting,
}

impl Phase {
    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Failed mutations fall back to the phase they started from.
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Absent, Self::Creating)
                | (Self::Creating, Self::Present | Self::Absent)
                | (Self::Present, Self::Updating | Self::Deleting)
                | (Self::Updating, Self::Present)
                | (Self::Deleting, Self::Absent | Self::Present)
        )
    }

    /// Move to `next`, rejecting transitions the state machine does not allow
    pub fn advance(self, next: Self, operation: &'static str) -> Result<Self> {
        if !self.can_transition(next) {
            return Err(Error::InvalidState {
                operation,
                phase: self,
            });
        }
        log::debug!("{self} -> {next}");
        Ok(next)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Absent => "absent",
            Self::Creating => "creating",
            Self::Present => "present",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
        };
        f.write_str(name)
    }
}

/// The declared configuration for one reconciliation pass.
///
/// Read-only to the core. Values use the declared encoding, so tri-state
/// booleans are strings here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    fields: Fields,
}

impl ResourceSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ResourceSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Last-known reconciled view of the resource.
///
/// Owned by the reconciler's caller and persisted between invocations.
/// Values use the declared encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedState {
    #[serde(default)]
    pub identity: ResourceIdentity,
    #[serde(default)]
    pub fields: Fields,
}

impl AppliedState {
    /// State of a resource that does not exist remotely
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.identity.is_empty()
    }

    /// Resting phase implied by the identity
    pub fn phase(&self) -> Phase {
        if self.is_absent() {
            Phase::Absent
        } else {
            Phase::Present
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A remote read of the resource, in the remote encoding.
///
/// Tri-state fields arrive as plain booleans. Update responses may carry
/// only some fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub identity: ResourceIdentity,
    pub fields: Fields,
}

impl Snapshot {
    pub fn new(identity: impl Into<String>, fields: Fields) -> Self {
        Self {
            identity: ResourceIdentity::new(identity),
            fields,
        }
    }
}

/// Create request payload, in the remote encoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    fields: Fields,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Mutable fields whose declared value differs from the applied state,
/// in the remote encoding. Empty means nothing to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Fields,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn fields(&self) -> &Fields {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
