//! Pass classification: what a reconciliation pass would do

use crate::changeset::{build_change_set, force_new_changes};
use crate::error::Result;
use crate::extract::build_create_request;
use crate::schema::Schema;
use crate::types::{AppliedState, ChangeSet, ResourceSpec};

/// The action a pass needs to take
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// No remote resource yet
    Create,
    /// ForceNew fields differ; destroy and recreate
    Replace { fields: Vec<String> },
    /// In-place update of these fields
    Update(ChangeSet),
    /// Declared and applied state agree
    NoOp,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// Short verb for display
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Replace { .. } => "replace",
            Self::Update(_) => "update",
            Self::NoOp => "no-op",
        }
    }
}

/// Classify the pass for `spec` against `applied`.
///
/// Runs every local validation a real pass would, so a plan that comes back
/// `Ok` will not fail pre-flight.
pub fn plan(schema: &Schema, spec: &ResourceSpec, applied: &AppliedState) -> Result<Plan> {
    if applied.is_absent() {
        build_create_request(schema, spec)?;
        return Ok(Plan::Create);
    }

    let fields = force_new_changes(schema, spec, applied)?;
    if !fields.is_empty() {
        // Validate the replacement's create request up front too.
        build_create_request(schema, spec)?;
        return Ok(Plan::Replace { fields });
    }

    let changes = build_change_set(schema, spec, applied)?;
    if changes.is_empty() {
        Ok(Plan::NoOp)
    } else {
        Ok(Plan::Update(changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, FieldSpec};
    use crate::types::ResourceIdentity;
    use crate::value::Value;

    static FIELDS: &[FieldSpec] = &[
        FieldSpec::new("type", FieldKind::String).force_new(),
        FieldSpec::new("delay", FieldKind::Int),
        FieldSpec::new("admin_state_up", FieldKind::TriState).optional(),
    ];
    static SCHEMA: Schema = Schema::new("test", FIELDS);

    fn applied() -> AppliedState {
        AppliedState {
            identity: ResourceIdentity::new("m-1"),
            fields: [
                ("type".to_string(), Value::from("HTTP")),
                ("delay".to_string(), Value::Int(10)),
                ("admin_state_up".to_string(), Value::from("")),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn spec() -> ResourceSpec {
        ResourceSpec::new().with("type", "HTTP").with("delay", 10)
    }

    #[test]
    fn test_plan_create_when_absent() {
        let plan = plan(&SCHEMA, &spec(), &AppliedState::absent()).unwrap();
        assert_eq!(plan, Plan::Create);
    }

    #[test]
    fn test_plan_create_validates() {
        let spec = spec().with("admin_state_up", "maybe");
        assert!(plan(&SCHEMA, &spec, &AppliedState::absent()).is_err());
    }

    #[test]
    fn test_plan_noop() {
        let plan = plan(&SCHEMA, &spec(), &applied()).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn test_plan_update() {
        let plan = plan(&SCHEMA, &spec().with("delay", 20), &applied()).unwrap();
        match plan {
            Plan::Update(changes) => assert_eq!(changes.get("delay"), Some(&Value::Int(20))),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_replace_wins_over_update() {
        let spec = spec().with("type", "TCP").with("delay", 20);
        let plan = plan(&SCHEMA, &spec, &applied()).unwrap();
        assert_eq!(
            plan,
            Plan::Replace {
                fields: vec!["type".to_string()]
            }
        );
        assert_eq!(plan.verb(), "replace");
    }
}
