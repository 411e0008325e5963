//! Field schema of a load-balancer health monitor.

use reconcile::{FieldKind, FieldSpec, Schema};

/// Resource type name used in log lines and errors
pub const RESOURCE_TYPE: &str = "lb monitor";

static MONITOR_FIELDS: &[FieldSpec] = &[
    // Selects the endpoint; never part of a request body.
    FieldSpec::new("region", FieldKind::String).force_new().scope(),
    FieldSpec::new("tenant_id", FieldKind::String)
        .force_new()
        .optional(),
    FieldSpec::new("type", FieldKind::String).force_new(),
    FieldSpec::new("delay", FieldKind::Int),
    FieldSpec::new("timeout", FieldKind::Int),
    FieldSpec::new("max_retries", FieldKind::Int),
    FieldSpec::new("url_path", FieldKind::String).optional(),
    FieldSpec::new("http_method", FieldKind::String).optional(),
    FieldSpec::new("expected_codes", FieldKind::String).optional(),
    FieldSpec::new("admin_state_up", FieldKind::TriState).optional(),
];

/// Schema shared by every monitor
pub static MONITOR_SCHEMA: Schema = Schema::new(RESOURCE_TYPE, MONITOR_FIELDS);
