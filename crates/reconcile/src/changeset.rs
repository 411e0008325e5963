//! Change-set computation between declared spec and applied state.
//!
//! Both functions here are pure: no remote access, no side effects.

use crate::error::Result;
use crate::extract::{declared_or_zero, parse_tri_state};
use crate::schema::{FieldKind, FieldSpec, Schema};
use crate::types::{AppliedState, ChangeSet, ResourceSpec};
use crate::value::Value;

/// Compute the mutable fields whose declared value differs from `applied`.
///
/// ForceNew fields are never included. Tri-state fields are compared after
/// parsing, so `"TRUE"` and `"true"` are the same value; a tri-state that
/// changed back to unset has no remote encoding and is left out.
pub fn build_change_set(
    schema: &Schema,
    spec: &ResourceSpec,
    applied: &AppliedState,
) -> Result<ChangeSet> {
    let mut changes = ChangeSet::new();

    for field in schema.mutable_fields() {
        let desired = declared_or_zero(field, spec)?;
        let current = applied_or_zero(field, applied);

        if field.kind == FieldKind::TriState {
            let desired = parse_tri_state(field, &desired)?;
            let current = parse_tri_state(field, &current)?;
            if desired != current
                && let Some(b) = desired.as_bool()
            {
                changes.insert(field.name, Value::Bool(b));
            }
        } else if desired != current {
            changes.insert(field.name, desired);
        }
    }

    Ok(changes)
}

/// Names of ForceNew fields whose declared value differs from `applied`.
///
/// A non-empty result means the resource has to be replaced; this crate
/// never turns that into an in-place update.
pub fn force_new_changes(
    schema: &Schema,
    spec: &ResourceSpec,
    applied: &AppliedState,
) -> Result<Vec<String>> {
    let mut fields = Vec::new();

    for field in schema.force_new_fields() {
        let desired = declared_or_zero(field, spec)?;
        let current = applied_or_zero(field, applied);
        if desired != current {
            fields.push(field.name.to_string());
        }
    }

    Ok(fields)
}

pub(crate) fn applied_or_zero(field: &FieldSpec, applied: &AppliedState) -> Value {
    applied
        .get(field.name)
        .cloned()
        .unwrap_or_else(|| field.kind.zero())
}
