//! Declaration file loading and validation

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use userpool_core::resource::{Resource, Value};
use userpool_core::schema::ResourceSchema;

/// Top level of `main.json`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub resources: Vec<ResourceDeclaration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Falls back to the SDK's region chain when absent
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDeclaration {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Declaration {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| format!("Parse error: {}", e))
    }

    /// Declared resources in file order. `null` attributes count as unset;
    /// fractional numbers and `null` list items are rejected.
    pub fn resources(&self) -> Result<Vec<Resource>, String> {
        let mut seen = HashSet::new();
        let mut resources = Vec::with_capacity(self.resources.len());

        for decl in &self.resources {
            let mut resource = Resource::new(&decl.resource_type, &decl.name);
            if !seen.insert(resource.id.clone()) {
                return Err(format!("Duplicate resource: {}", resource.id));
            }
            for (key, value) in &decl.attributes {
                let value = Value::from_json(value)
                    .map_err(|e| format!("{}: attribute '{}': {}", resource.id, key, e))?;
                if let Some(value) = value {
                    resource = resource.with_attribute(key.clone(), value);
                }
            }
            resources.push(resource);
        }

        Ok(resources)
    }
}

/// Check every resource against its schema, collecting all problems
pub fn validate_resources(
    resources: &[Resource],
    schemas: &HashMap<String, ResourceSchema>,
) -> Result<(), String> {
    let mut all_errors = Vec::new();

    for resource in resources {
        match schemas.get(&resource.id.resource_type) {
            Some(schema) => {
                if let Err(errors) = schema.validate(&resource.attributes) {
                    for error in errors {
                        all_errors.push(format!("{}: {}", resource.id, error));
                    }
                }
            }
            None => all_errors.push(format!(
                "{}: unknown resource type {}",
                resource.id, resource.id.resource_type
            )),
        }
    }

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors.join("\n"))
    }
}
