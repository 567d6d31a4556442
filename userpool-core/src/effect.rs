//! Effect - A single side effect the host will perform through a Provider

use crate::resource::{Resource, ResourceId, State};

/// A side effect, described as a value until the interpreter runs it
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Create(Resource),
    Update {
        id: ResourceId,
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
    },
    /// Delete the existing object, then create it again from `to`
    Replace {
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
    },
    Delete {
        id: ResourceId,
        identifier: String,
    },
}

impl Effect {
    pub fn resource_id(&self) -> &ResourceId {
        match self {
            Effect::Create(resource) => &resource.id,
            Effect::Update { id, .. } => id,
            Effect::Replace { to, .. } => &to.id,
            Effect::Delete { id, .. } => id,
        }
    }

    /// Short verb used in plan output
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::Create(_) => "create",
            Effect::Update { .. } => "update",
            Effect::Replace { .. } => "replace",
            Effect::Delete { .. } => "delete",
        }
    }
}
