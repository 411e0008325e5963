//! Read-back merging of a remote snapshot into local state.
//!
//! The remote system reports a concrete value for every optional field,
//! server defaults included. Copying those defaults into local state would
//! make an undeclared field look like drift on every following pass, so an
//! optional field the spec leaves unset is stored empty instead.

use crate::changeset::applied_or_zero;
use crate::error::Result;
use crate::extract::{declared, is_set, parse_tri_state};
use crate::schema::{FieldKind, FieldSpec, Schema};
use crate::types::{AppliedState, Fields, ResourceSpec, Snapshot};
use crate::value::{TriState, Value};

/// Fold `snapshot` into a new applied state.
///
/// Per field:
/// - scope fields come from the spec when creating from absent and from
///   `previous` afterwards, since the remote system never reports them and
///   the resource stays where it was created;
/// - required attributes take the remote value verbatim;
/// - optional attributes the spec leaves unset are stored empty;
/// - optional attributes the spec declares take the remote value when the
///   declared value differs from `previous` (a change was just applied),
///   and otherwise keep the previous value.
///
/// Tri-state fields come back from the remote side as booleans and are
/// stored as `"true"` / `"false"`.
pub fn merge(
    schema: &Schema,
    snapshot: &Snapshot,
    spec: &ResourceSpec,
    previous: &AppliedState,
) -> Result<AppliedState> {
    let mut fields = Fields::new();

    for field in schema.fields {
        let value = if field.is_scope() {
            scope_value(field, spec, previous)?
        } else if field.is_required() {
            remote_value(field, snapshot)
        } else if !is_set(field, spec)? {
            field.kind.zero()
        } else if declared_change(field, spec, previous)? {
            remote_value(field, snapshot)
        } else {
            applied_or_zero(field, previous)
        };

        fields.insert(field.name.to_string(), value);
    }

    Ok(AppliedState {
        identity: snapshot.identity.clone(),
        fields,
    })
}

/// Scope value for the merged state.
///
/// A declared scope change does not move the resource; it stays a ForceNew
/// difference until the resource is replaced.
fn scope_value(field: &FieldSpec, spec: &ResourceSpec, previous: &AppliedState) -> Result<Value> {
    let recorded = previous
        .get(field.name)
        .filter(|v| !previous.is_absent() && *v != &field.kind.zero());
    if let Some(value) = recorded {
        return Ok(value.clone());
    }
    Ok(declared(field, spec)?
        .cloned()
        .unwrap_or_else(|| applied_or_zero(field, previous)))
}

/// Remote value of `field` in the declared encoding
fn remote_value(field: &FieldSpec, snapshot: &Snapshot) -> Value {
    match (field.kind, snapshot.fields.get(field.name)) {
        (FieldKind::TriState, Some(Value::Bool(b))) => {
            Value::String(TriState::from_bool(*b).as_str().to_string())
        }
        (_, Some(value)) => value.clone(),
        (_, None) => field.kind.zero(),
    }
}

/// Whether the declared value differs from what was applied before
fn declared_change(field: &FieldSpec, spec: &ResourceSpec, previous: &AppliedState) -> Result<bool> {
    let desired = declared(field, spec)?
        .cloned()
        .unwrap_or_else(|| field.kind.zero());
    let current = applied_or_zero(field, previous);

    if field.kind == FieldKind::TriState {
        return Ok(parse_tri_state(field, &desired)? != parse_tri_state(field, &current)?);
    }
    Ok(desired != current)
}
