use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reconcile::AppliedState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Applied state of every monitor lbmon manages
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LbmonState {
    /// Last reconciled state, keyed by monitor name
    #[serde(default)]
    pub monitors: BTreeMap<String, AppliedState>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,
}

impl Default for LbmonState {
    fn default() -> Self {
        Self {
            monitors: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl LbmonState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!(
            "Loaded state for {} monitors from {}",
            state.monitors.len(),
            path.display()
        );
        Ok(state)
    }

    /// Save state to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(&self).context("Failed to serialize state to JSON")?;

        // Written beside the target, then renamed into place.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Update the last_updated timestamp and save
    pub fn touch(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();
        self.save(path)
    }

    /// Applied state of `name`, absent when not tracked
    pub fn applied(&self, name: &str) -> AppliedState {
        self.monitors.get(name).cloned().unwrap_or_default()
    }

    /// Store the state a pass produced; absent states drop the entry
    pub fn record(&mut self, name: &str, state: AppliedState) {
        if state.is_absent() {
            self.monitors.remove(name);
        } else {
            self.monitors.insert(name.to_string(), state);
        }
    }

    /// Tracked monitors, optionally only `filter`
    pub fn tracked<'a>(
        &'a self,
        filter: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a String, &'a AppliedState)> + 'a {
        self.monitors
            .iter()
            .filter(move |(name, _)| filter.is_none_or(|f| f == name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{ResourceIdentity, Value};

    fn present(id: &str) -> AppliedState {
        AppliedState {
            identity: ResourceIdentity::new(id),
            fields: [
                ("region".to_string(), Value::from("RegionOne")),
                ("delay".to_string(), Value::Int(10)),
                ("admin_state_up".to_string(), Value::from("")),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn test_default_state() {
        let state = LbmonState::default();
        assert!(state.monitors.is_empty());
        assert!(state.applied("web").is_absent());
    }

    #[test]
    fn test_record_and_clear() {
        let mut state = LbmonState::default();
        state.record("web", present("m-1"));
        assert_eq!(state.applied("web").identity.as_str(), "m-1");

        state.record("web", AppliedState::absent());
        assert!(!state.monitors.contains_key("web"));
    }

    #[test]
    fn test_tracked_filter() {
        let mut state = LbmonState::default();
        state.record("web", present("m-1"));
        state.record("db", present("m-2"));

        assert_eq!(state.tracked(None).count(), 2);
        let only: Vec<_> = state.tracked(Some("db")).map(|(n, _)| n.as_str()).collect();
        assert_eq!(only, vec!["db"]);
    }

    #[test]
    fn test_load_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = LbmonState::load(&dir.path().join("state.json")).unwrap();
        assert!(state.monitors.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut state = LbmonState::default();
        state.record("web", present("m-1"));
        state.touch(&path).unwrap();

        let loaded = LbmonState::load(&path).unwrap();
        assert_eq!(loaded.applied("web"), present("m-1"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_serialization_shape() {
        let mut state = LbmonState::default();
        state.record("web", present("m-1"));

        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["monitors"]["web"]["identity"], "m-1");
        assert_eq!(json["monitors"]["web"]["fields"]["delay"], 10);
        assert_eq!(json["monitors"]["web"]["fields"]["admin_state_up"], "");
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        let err = LbmonState::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse state file"));
    }
}
