//! Field schema: static per-field kind, mutability and optionality

use crate::value::Value;

/// Declared kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Bool,
    /// Boolean declared through a tri-state string (`""`, `"true"`, `"false"`)
    /// and sent to the remote system as an optional boolean.
    TriState,
}

impl FieldKind {
    /// Value a field takes when it is not declared
    pub fn zero(self) -> Value {
        match self {
            Self::String | Self::TriState => Value::String(String::new()),
            Self::Int => Value::Int(0),
            Self::Bool => Value::Bool(false),
        }
    }

    /// Whether a declared value has the right shape for this kind
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String | Self::TriState, Value::String(_))
                | (Self::Int, Value::Int(_))
                | (Self::Bool, Value::Bool(_))
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::TriState => "tri-state string",
        }
    }
}

/// Whether a field can change without replacing the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Mutable,
    ForceNew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optionality {
    Required,
    Optional,
}

/// Where a field's value goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Sent to and reported by the remote system
    Attribute,
    /// Only scopes the client handle (e.g. region); never sent
    Scope,
}

/// One schema entry.
///
/// Built with const builders so a schema can live in a `static`:
///
/// ```
/// use reconcile::{FieldKind, FieldSpec, Mutability};
///
/// const REGION: FieldSpec = FieldSpec::new("region", FieldKind::String).force_new().scope();
/// assert_eq!(REGION.mutability, Mutability::ForceNew);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub mutability: Mutability,
    pub optionality: Optionality,
    pub role: FieldRole,
}

impl FieldSpec {
    /// A required, mutable attribute
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            mutability: Mutability::Mutable,
            optionality: Optionality::Required,
            role: FieldRole::Attribute,
        }
    }

    pub const fn force_new(self) -> Self {
        Self {
            mutability: Mutability::ForceNew,
            ..self
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            optionality: Optionality::Optional,
            ..self
        }
    }

    pub const fn scope(self) -> Self {
        Self {
            role: FieldRole::Scope,
            ..self
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.mutability == Mutability::Mutable
    }

    pub fn is_force_new(&self) -> bool {
        self.mutability == Mutability::ForceNew
    }

    pub fn is_required(&self) -> bool {
        self.optionality == Optionality::Required
    }

    pub fn is_optional(&self) -> bool {
        self.optionality == Optionality::Optional
    }

    pub fn is_scope(&self) -> bool {
        self.role == FieldRole::Scope
    }
}

/// Static, total description of one resource type's fields
#[derive(Debug)]
pub struct Schema {
    pub resource_type: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(resource_type: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            resource_type,
            fields,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Classify a known field.
    ///
    /// # Panics
    ///
    /// Panics on a name the schema does not declare. Field names come from
    /// code, not user input, so an unknown one is a bug in the caller.
    pub fn classify(&self, name: &str) -> &FieldSpec {
        match self.lookup(name) {
            Some(field) => field,
            None => panic!("unknown field '{name}' for resource type '{}'", self.resource_type),
        }
    }

    pub fn mutable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_mutable())
    }

    pub fn force_new_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_force_new())
    }

    /// Fields the remote system knows about
    pub fn attributes(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.is_scope())
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

    #[test]
    fn test_classify_known_fields() {
        let ty = SCHEMA.classify("type");
        assert!(ty.is_force_new());
        assert!(ty.is_required());

        let path = SCHEMA.classify("url_path");
        assert!(path.is_mutable());
        assert!(path.is_optional());

        assert!(SCHEMA.classify("region").is_scope());
    }

    #[test]
    #[should_panic(expected = "unknown field 'nope'")]
    fn test_classify_unknown_field_panics() {
        let _ = SCHEMA.classify("nope");
    }

    #[test]
    fn test_field_partitions() {
        let mutable: Vec<_> = SCHEMA.mutable_fields().map(|f| f.name).collect();
        assert_eq!(mutable, vec!["delay", "url_path", "admin_state_up"]);

        let force_new: Vec<_> = SCHEMA.force_new_fields().map(|f| f.name).collect();
        assert_eq!(force_new, vec!["region", "type"]);

        assert!(SCHEMA.attributes().all(|f| f.name != "region"));
    }

    #[test]
    fn test_kind_zero_and_accepts() {
        assert_eq!(FieldKind::Int.zero(), Value::Int(0));
        assert_eq!(FieldKind::TriState.zero(), Value::String(String::new()));
        assert!(FieldKind::TriState.accepts(&Value::from("true")));
        assert!(!FieldKind::Int.accepts(&Value::from("10")));
    }
}
