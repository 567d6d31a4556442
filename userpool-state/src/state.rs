//! On-disk state: what was created, under which identifier

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use userpool_core::resource::{ResourceId, State, Value};

/// Everything the tool remembers between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// Format version
    pub version: u32,
    /// Bumped on every write
    pub serial: u64,
    /// Fixed for the life of a state file
    pub lineage: String,
    /// Version of the tool that last wrote this file
    pub tool_version: String,
    pub resources: Vec<ResourceState>,
}

impl StateFile {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            serial: 0,
            lineage: uuid::Uuid::new_v4().to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            resources: Vec::new(),
        }
    }

    /// Prepare for a write
    pub fn increment_serial(&mut self) {
        self.serial += 1;
        self.tool_version = env!("CARGO_PKG_VERSION").to_string();
    }

    /// Record an observed state. A state that no longer exists is dropped.
    pub fn record(&mut self, state: &State) {
        match ResourceState::from_state(state) {
            Some(entry) => self.upsert(entry),
            None => {
                self.remove(&state.id);
            }
        }
    }

    pub fn upsert(&mut self, entry: ResourceState) {
        let id = entry.resource_id();
        match self.resources.iter_mut().find(|r| r.matches(&id)) {
            Some(existing) => *existing = entry,
            None => self.resources.push(entry),
        }
    }

    pub fn remove(&mut self, id: &ResourceId) -> Option<ResourceState> {
        let pos = self.resources.iter().position(|r| r.matches(id))?;
        Some(self.resources.remove(pos))
    }

    /// Every recorded resource as a core `State`, keyed by id
    pub fn states(&self) -> HashMap<ResourceId, State> {
        self.resources
            .iter()
            .map(|r| (r.resource_id(), r.to_state()))
            .collect()
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// One managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl ResourceState {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            identifier: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::new(&self.resource_type, &self.name)
    }

    fn matches(&self, id: &ResourceId) -> bool {
        self.resource_type == id.resource_type && self.name == id.name
    }

    /// `None` when the state does not exist remotely
    pub fn from_state(state: &State) -> Option<Self> {
        if !state.exists {
            return None;
        }
        let entry = state
            .attributes
            .iter()
            .fold(Self::new(&state.id.resource_type, &state.id.name), |entry, (k, v)| {
                entry.with_attribute(k.clone(), v.to_json())
            });
        Some(match &state.identifier {
            Some(identifier) => entry.with_identifier(identifier.clone()),
            None => entry,
        })
    }

    pub fn to_state(&self) -> State {
        let attributes = self
            .attributes
            .iter()
            .filter_map(|(k, v)| match Value::from_json(v) {
                Ok(value) => value.map(|value| (k.clone(), value)),
                Err(e) => {
                    log::warn!(
                        "Ignoring recorded attribute {} of {}: {}",
                        k,
                        self.resource_id(),
                        e
                    );
                    None
                }
            })
            .collect();
        let state = State::existing(self.resource_id(), attributes);
        match &self.identifier {
            Some(identifier) => state.with_identifier(identifier.clone()),
            None => state,
        }
    }
}
