//! Desired-state extraction: declared spec to create request

use crate::error::{Error, Result};
use crate::schema::{FieldKind, FieldSpec, Schema};
use crate::types::{Payload, ResourceSpec};
use crate::value::{TriState, Value};

/// Build the create request for `spec`.
///
/// Every declared attribute is copied verbatim, except tri-state fields,
/// which are parsed and left out entirely when unset so the remote default
/// applies. Scope fields are never sent. Fails with a validation error
/// before anything is sent when a required field is missing, a value has
/// the wrong kind, or a tri-state literal does not parse.
pub fn build_create_request(schema: &Schema, spec: &ResourceSpec) -> Result<Payload> {
    check_declared_names(schema, spec);

    let mut payload = Payload::new();
    for field in schema.fields {
        let Some(value) = declared(field, spec)? else {
            if field.is_required() {
                return Err(Error::validation(field.name, "required field is not set"));
            }
            continue;
        };

        if field.is_scope() {
            continue;
        }

        match field.kind {
            FieldKind::TriState => {
                if let Some(b) = parse_tri_state(field, value)?.as_bool() {
                    payload.insert(field.name, Value::Bool(b));
                }
            }
            _ => payload.insert(field.name, value.clone()),
        }
    }

    Ok(payload)
}

/// Declared value of `field`, checked against the schema kind
pub(crate) fn declared<'a>(field: &FieldSpec, spec: &'a ResourceSpec) -> Result<Option<&'a Value>> {
    match spec.get(field.name) {
        Some(value) if !field.kind.accepts(value) => Err(Error::validation(
            field.name,
            format!("expected {}, got {}", field.kind.name(), value.type_name()),
        )),
        other => Ok(other),
    }
}

/// Declared value of `field`, or the kind's zero value when absent
pub(crate) fn declared_or_zero(field: &FieldSpec, spec: &ResourceSpec) -> Result<Value> {
    Ok(declared(field, spec)?
        .cloned()
        .unwrap_or_else(|| field.kind.zero()))
}

/// Whether `field` is declared with a non-zero value
pub(crate) fn is_set(field: &FieldSpec, spec: &ResourceSpec) -> Result<bool> {
    Ok(declared(field, spec)?.is_some_and(|v| *v != field.kind.zero()))
}

pub(crate) fn parse_tri_state(field: &FieldSpec, value: &Value) -> Result<TriState> {
    match value {
        Value::String(raw) => TriState::parse(field.name, raw),
        other => Err(Error::validation(
            field.name,
            format!("expected {}, got {}", field.kind.name(), other.type_name()),
        )),
    }
}

fn check_declared_names(schema: &Schema, spec: &ResourceSpec) {
    for (name, _) in spec.iter() {
        schema.classify(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: &[FieldSpec] = &[
        FieldSpec::new("region", FieldKind::String).force_new().scope(),
        FieldSpec::new("type", FieldKind::String).force_new(),
        FieldSpec::new("delay", FieldKind::Int),
        FieldSpec::new("url_path", FieldKind::String).optional(),
        FieldSpec::new("admin_state_up", FieldKind::TriState).optional(),
    ];
    static SCHEMA: Schema = Schema::new("test", FIELDS);

    fn base_spec() -> ResourceSpec {
        ResourceSpec::new()
            .with("region", "RegionOne")
            .with("type", "HTTP")
            .with("delay", 10)
    }

    #[test]
    fn test_copies_declared_fields() {
        let payload = build_create_request(&SCHEMA, &base_spec().with("url_path", "/")).unwrap();
        assert_eq!(payload.get("type"), Some(&Value::from("HTTP")));
        assert_eq!(payload.get("delay"), Some(&Value::Int(10)));
        assert_eq!(payload.get("url_path"), Some(&Value::from("/")));
    }

    #[test]
    fn test_scope_field_not_sent() {
        let payload = build_create_request(&SCHEMA, &base_spec()).unwrap();
        assert!(!payload.contains("region"));
    }

    #[test]
    fn test_unset_tri_state_is_omitted() {
        let payload =
            build_create_request(&SCHEMA, &base_spec().with("admin_state_up", "")).unwrap();
        assert!(!payload.contains("admin_state_up"));
    }

    #[test]
    fn test_explicit_tri_state_is_boolean() {
        let payload =
            build_create_request(&SCHEMA, &base_spec().with("admin_state_up", "false")).unwrap();
        assert_eq!(payload.get("admin_state_up"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_invalid_tri_state_rejected() {
        let err =
            build_create_request(&SCHEMA, &base_spec().with("admin_state_up", "maybe")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_missing_required_field() {
        let mut spec = base_spec();
        spec.remove("delay");
        let err = build_create_request(&SCHEMA, &spec).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for 'delay': required field is not set"
        );
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let err = build_create_request(&SCHEMA, &base_spec().with("delay", "10")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for 'delay': expected int, got string"
        );
    }

    #[test]
    #[should_panic(expected = "unknown field")]
    fn test_unknown_declared_field_panics() {
        let _ = build_create_request(&SCHEMA, &base_spec().with("colour", "blue"));
    }
}
