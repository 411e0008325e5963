//! # Reconcile
//!
//! Reconciliation of a declared configuration against one remote resource.
//!
//! This crate holds the protocol that sits between a declarative config layer
//! and a networked API: which request to send, which fields changed, and how
//! a remote read-back folds into local state without reporting drift for
//! fields the user never set.
//!
//! ## Core Concepts
//!
//! - **Schema**: static per-field kind, mutability and optionality
//! - **ResourceSpec**: the declared configuration for one pass
//! - **AppliedState**: the last reconciled view plus the remote identity
//! - **ChangeSet**: the mutable fields whose declared value differs
//! - **Reconciler**: the Create / Read / Update / Delete state machine
//!
//! ## Example
//!
//! ```
//! use reconcile::mock::MockClient;
//! use reconcile::{
//!     AppliedState, FieldKind, FieldSpec, Reconciler, ResourceSpec, Schema, Value,
//!     build_change_set,
//! };
//!
//! static FIELDS: &[FieldSpec] = &[
//!     FieldSpec::new("name", FieldKind::String).force_new(),
//!     FieldSpec::new("size", FieldKind::Int),
//! ];
//! static SCHEMA: Schema = Schema::new("disk", FIELDS);
//!
//! let client = MockClient::new();
//! let reconciler = Reconciler::new(&SCHEMA, &client);
//!
//! let spec = ResourceSpec::new().with("name", "data").with("size", 10);
//! let applied = reconciler.create(&spec, &AppliedState::absent()).unwrap();
//! assert!(!applied.is_absent());
//!
//! let spec = spec.with("size", 20);
//! let changes = build_change_set(&SCHEMA, &spec, &applied).unwrap();
//! assert_eq!(changes.get("size"), Some(&Value::Int(20)));
//!
//! let applied = reconciler.update(&spec, &applied, &changes).unwrap();
//! assert_eq!(applied.get("size"), Some(&Value::Int(20)));
//! ```
//!
//! ## Remote Client
//!
//! The remote side is reached through the [`RemoteClient`] trait. Transport,
//! authentication and retry of transient faults belong to the implementation;
//! the reconciler surfaces every failure to its caller unchanged.
//! [`mock::MockClient`] is an in-memory implementation for tests.

pub mod changeset;
pub mod client;
pub mod error;
pub mod extract;
pub mod merge;
pub mod mock;
pub mod plan;
pub mod reconciler;
pub mod schema;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use changeset::{build_change_set, force_new_changes};
pub use client::RemoteClient;
pub use error::{Error, Result};
pub use extract::build_create_request;
pub use merge::merge;
pub use plan::{Plan, plan};
pub use reconciler::{Action, ApplyOutcome, ReadOutcome, Reconciler};
pub use schema::{FieldKind, FieldRole, FieldSpec, Mutability, Optionality, Schema};
pub use types::{AppliedState, ChangeSet, Fields, Payload, Phase, ResourceIdentity, ResourceSpec, Snapshot};
pub use value::{TriState, Value};
