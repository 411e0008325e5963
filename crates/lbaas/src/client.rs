//! Blocking HTTP client for the LBaaS v1 health-monitor API.
//!
//! Requests and responses wrap the monitor in a `health_monitor` envelope:
//!
//! ```text
//! POST   {endpoint}/v2.0/lb/health_monitors        {"health_monitor": {...}}
//! GET    {endpoint}/v2.0/lb/health_monitors/{id}
//! PUT    {endpoint}/v2.0/lb/health_monitors/{id}   {"health_monitor": {...}}
//! DELETE {endpoint}/v2.0/lb/health_monitors/{id}
//! ```
//!
//! Transient failures are retried with exponential backoff, except on
//! create: a retried POST whose first attempt reached the server would
//! leave a second monitor behind.

use crate::error::{Error, Result};
use crate::retry::{LogCallback, with_retry};
use crate::schema::MONITOR_SCHEMA;
use crate::types::RetryConfig;
use reconcile::{
    ChangeSet, FieldKind, Fields, Payload, RemoteClient, ResourceIdentity, Schema, Snapshot, Value,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::fmt;
use std::time::Duration;

const COLLECTION_PATH: &str = "v2.0/lb/health_monitors";
const USER_AGENT: &str = concat!("lbmon/", env!("CARGO_PKG_VERSION"));

/// Health-monitor API client for one region's endpoint
pub struct NeutronClient {
    agent: ureq::Agent,
    endpoint: String,
    token: String,
    retry: RetryConfig,
    schema: &'static Schema,
}

// Hand-written so the token never lands in logs.
impl fmt::Debug for NeutronClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeutronClient")
            .field("endpoint", &self.endpoint)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    health_monitor: &'a Map<String, Json>,
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    health_monitor: Map<String, Json>,
}

impl NeutronClient {
    /// Create a client for `endpoint`, authenticating with `token`.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into(),
            token: token.into(),
            retry: RetryConfig::default(),
            schema: &MONITOR_SCHEMA,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), COLLECTION_PATH)
    }

    fn resource_url(&self, identity: &ResourceIdentity) -> String {
        format!("{}/{}", self.collection_url(), identity)
    }

    fn post(&self, body: &Map<String, Json>) -> Result<Snapshot> {
        let url = self.collection_url();
        log::debug!("POST {url}");

        let response: ResponseEnvelope = self
            .agent
            .post(&url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send_json(RequestEnvelope {
                health_monitor: body,
            })?
            .body_mut()
            .read_json()?;

        snapshot_from_json(self.schema, response.health_monitor)
    }

    fn fetch(&self, url: &str) -> Result<Snapshot> {
        log::debug!("GET {url}");

        let response: ResponseEnvelope = self
            .agent
            .get(url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()?
            .body_mut()
            .read_json()?;

        snapshot_from_json(self.schema, response.health_monitor)
    }

    fn put(&self, url: &str, body: &Map<String, Json>) -> Result<Snapshot> {
        log::debug!("PUT {url}");

        let response: ResponseEnvelope = self
            .agent
            .put(url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send_json(RequestEnvelope {
                health_monitor: body,
            })?
            .body_mut()
            .read_json()?;

        snapshot_from_json(self.schema, response.health_monitor)
    }

    fn remove(&self, url: &str) -> Result<()> {
        log::debug!("DELETE {url}");

        self.agent
            .delete(url)
            .header("X-Auth-Token", &self.token)
            .header("User-Agent", USER_AGENT)
            .call()?;
        Ok(())
    }
}

impl RemoteClient for NeutronClient {
    fn create(&self, payload: &Payload) -> reconcile::Result<Snapshot> {
        let body = fields_to_json(payload.fields());
        self.post(&body).map_err(|e| e.into_reconcile(None))
    }

    fn get(&self, identity: &ResourceIdentity) -> reconcile::Result<Snapshot> {
        let url = self.resource_url(identity);
        let label = format!("GET {url}");
        with_retry(&self.retry, Some(&LogCallback { label: &label }), || {
            self.fetch(&url)
        })
        .map_err(|e| e.into_reconcile(Some(identity)))
    }

    fn update(&self, identity: &ResourceIdentity, changes: &ChangeSet) -> reconcile::Result<Snapshot> {
        let url = self.resource_url(identity);
        let label = format!("PUT {url}");
        let body = fields_to_json(changes.fields());
        with_retry(&self.retry, Some(&LogCallback { label: &label }), || {
            self.put(&url, &body)
        })
        .map_err(|e| e.into_reconcile(Some(identity)))
    }

    fn delete(&self, identity: &ResourceIdentity) -> reconcile::Result<()> {
        let url = self.resource_url(identity);
        let label = format!("DELETE {url}");
        with_retry(&self.retry, Some(&LogCallback { label: &label }), || {
            self.remove(&url)
        })
        .map_err(|e| e.into_reconcile(Some(identity)))
    }
}

/// Request body for a set of fields.
///
/// Empty strings are left out: the API treats an absent key as "use the
/// default" and may reject an empty one.
fn fields_to_json(fields: &Fields) -> Map<String, Json> {
    fields
        .iter()
        .filter_map(|(name, value)| {
            let json = match value {
                Value::Bool(b) => Json::Bool(*b),
                Value::Int(i) => Json::from(*i),
                Value::String(s) if s.is_empty() => return None,
                Value::String(s) => Json::String(s.clone()),
            };
            Some((name.clone(), json))
        })
        .collect()
}

/// Snapshot from a response body, typed by the schema.
///
/// Members the schema does not know are ignored. A null or missing member
/// is left out of the snapshot; the merger fills in the zero value.
fn snapshot_from_json(schema: &Schema, mut body: Map<String, Json>) -> Result<Snapshot> {
    let identity = match body.remove("id") {
        Some(Json::String(id)) if !id.is_empty() => id,
        _ => return Err(Error::InvalidResponse("monitor has no 'id'".to_string())),
    };

    let mut fields = Fields::new();
    for field in schema.attributes() {
        let Some(json) = body.remove(field.name) else {
            continue;
        };
        let value = match (field.kind, json) {
            (_, Json::Null) => continue,
            (FieldKind::String, Json::String(s)) => Value::String(s),
            (FieldKind::Int, Json::Number(n)) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => return Err(wrong_type(field.name, field.kind)),
            },
            (FieldKind::Bool | FieldKind::TriState, Json::Bool(b)) => Value::Bool(b),
            (kind, _) => return Err(wrong_type(field.name, kind)),
        };
        fields.insert(field.name.to_string(), value);
    }

    Ok(Snapshot::new(identity, fields))
}

fn wrong_type(field: &str, kind: FieldKind) -> Error {
    let expected = match kind {
        FieldKind::String => "a string",
        FieldKind::Int => "an integer",
        FieldKind::Bool | FieldKind::TriState => "a boolean",
    };
    Error::InvalidResponse(format!("'{field}' is not {expected}"))
}
