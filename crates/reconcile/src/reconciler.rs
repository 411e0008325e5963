//! Reconciler: the Create / Read / Update / Delete state machine.
//!
//! The reconciler keeps no state of its own. Each operation takes the
//! caller's current [`AppliedState`] and returns the next one, so the caller
//! can persist it between invocations. Phases move
//! `Absent -> Creating -> Present -> Updating -> Present -> Deleting -> Absent`;
//! an operation started from the wrong phase fails before any remote call.
//!
//! Passes against one identity must be serialized by the caller. Nothing
//! here retries: a failed remote call leaves the state where it was and the
//! error goes back to the caller as-is.

use crate::client::RemoteClient;
use crate::error::{Error, Result};
use crate::extract::build_create_request;
use crate::merge::merge;
use crate::plan::{Plan, plan};
use crate::schema::Schema;
use crate::types::{AppliedState, ChangeSet, Phase, ResourceSpec};

/// Result of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The resource exists; this is the merged state
    Found(AppliedState),
    /// Deleted out-of-band. The caller decides whether to clear the identity.
    NotFound,
}

/// What a full pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub state: AppliedState,
    pub action: Action,
}

/// Drives one resource type through its lifecycle via a [`RemoteClient`]
pub struct Reconciler<'a, C: RemoteClient + ?Sized> {
    schema: &'a Schema,
    client: &'a C,
}

impl<'a, C: RemoteClient + ?Sized> Reconciler<'a, C> {
    pub fn new(schema: &'a Schema, client: &'a C) -> Self {
        Self { schema, client }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Create the resource declared by `spec`.
    ///
    /// Requires `applied` to be absent. The new state is built from the
    /// snapshot the remote system returns, not from the request, since the
    /// remote side may normalize or default fields.
    pub fn create(&self, spec: &ResourceSpec, applied: &AppliedState) -> Result<AppliedState> {
        let phase = require(applied, Phase::Absent, "create")?;
        let payload = build_create_request(self.schema, spec)?;

        let phase = phase.advance(Phase::Creating, "create")?;
        log::info!("Requesting {} creation", self.schema.resource_type);

        let snapshot = match self.client.create(&payload) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                phase.advance(Phase::Absent, "create")?;
                return Err(err);
            }
        };
        if snapshot.identity.is_empty() {
            phase.advance(Phase::Absent, "create")?;
            return Err(Error::remote("create response carried no identity"));
        }
        log::info!("{} ID: {}", self.schema.resource_type, snapshot.identity);

        phase.advance(Phase::Present, "create")?;
        merge(self.schema, &snapshot, spec, applied)
    }

    /// Read the remote resource and merge it with `spec`.
    ///
    /// A missing resource is [`ReadOutcome::NotFound`], not an error.
    pub fn read(&self, spec: &ResourceSpec, applied: &AppliedState) -> Result<ReadOutcome> {
        require(applied, Phase::Present, "read")?;

        match self.client.get(&applied.identity) {
            Ok(snapshot) => {
                log::debug!(
                    "Retrieved {} {}: {:?}",
                    self.schema.resource_type,
                    applied.identity,
                    snapshot.fields
                );
                Ok(ReadOutcome::Found(merge(self.schema, &snapshot, spec, applied)?))
            }
            Err(err) if err.is_not_found() => {
                log::debug!("{} {} not found", self.schema.resource_type, applied.identity);
                Ok(ReadOutcome::NotFound)
            }
            Err(err) => Err(err),
        }
    }

    /// Send `changes` and re-read the resource.
    ///
    /// An empty change set returns `applied` unchanged without touching the
    /// remote side. Otherwise the state comes from a fresh read rather than
    /// the update response, which may be incomplete.
    pub fn update(
        &self,
        spec: &ResourceSpec,
        applied: &AppliedState,
        changes: &ChangeSet,
    ) -> Result<AppliedState> {
        let phase = require(applied, Phase::Present, "update")?;
        if changes.is_empty() {
            log::debug!("{} {}: nothing to update", self.schema.resource_type, applied.identity);
            return Ok(applied.clone());
        }

        let phase = phase.advance(Phase::Updating, "update")?;
        log::debug!(
            "Updating {} {} with {:?}",
            self.schema.resource_type,
            applied.identity,
            changes.fields()
        );

        let sent = self.client.update(&applied.identity, changes);
        phase.advance(Phase::Present, "update")?;
        sent?;

        match self.read(spec, applied)? {
            ReadOutcome::Found(state) => Ok(state),
            ReadOutcome::NotFound => Err(Error::not_found(applied.identity.as_str())),
        }
    }

    /// Delete the resource and return the absent state.
    ///
    /// A resource that is already gone counts as deleted.
    pub fn delete(&self, applied: &AppliedState) -> Result<AppliedState> {
        let phase = require(applied, Phase::Present, "delete")?;
        let phase = phase.advance(Phase::Deleting, "delete")?;

        match self.client.delete(&applied.identity) {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                log::debug!(
                    "{} {} already gone",
                    self.schema.resource_type,
                    applied.identity
                );
            }
            Err(err) => {
                phase.advance(Phase::Present, "delete")?;
                return Err(err);
            }
        }

        phase.advance(Phase::Absent, "delete")?;
        Ok(AppliedState::absent())
    }

    /// Run one full pass: create if absent, update if changed.
    ///
    /// A pass that needs replacement fails with
    /// [`Error::ReplacementRequired`]; destroying and recreating is left to
    /// the caller.
    pub fn apply(&self, spec: &ResourceSpec, applied: &AppliedState) -> Result<ApplyOutcome> {
        match plan(self.schema, spec, applied)? {
            Plan::Create => Ok(ApplyOutcome {
                state: self.create(spec, applied)?,
                action: Action::Created,
            }),
            Plan::Replace { fields } => Err(Error::ReplacementRequired { fields }),
            Plan::Update(changes) => Ok(ApplyOutcome {
                state: self.update(spec, applied, &changes)?,
                action: Action::Updated,
            }),
            Plan::NoOp => Ok(ApplyOutcome {
                state: applied.clone(),
                action: Action::Unchanged,
            }),
        }
    }
}

fn require(applied: &AppliedState, expected: Phase, operation: &'static str) -> Result<Phase> {
    let phase = applied.phase();
    if phase != expected {
        return Err(Error::InvalidState { operation, phase });
    }
    Ok(phase)
}
