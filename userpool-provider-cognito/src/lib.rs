//! Cognito Provider
//!
//! Manages `cognito.user_pool_client` resources through the Cognito
//! Identity Provider API.
//!
//! ## Module Structure
//!
//! - `schemas` - Attribute schema and value types
//! - `provider` - CognitoProvider lifecycle operations
//! - `api` - Control-plane seam and request/response structs
//! - `sdk` - AWS SDK implementation of the seam
//! - `convert` - Attribute to API field copying
//! - `identifier` - `<user_pool_id>/<client_id>` identifiers

pub mod api;
pub mod convert;
pub mod identifier;
pub mod provider;
pub mod schemas;
pub mod sdk;

#[cfg(test)]
mod fake;

pub use identifier::ClientIdentifier;
pub use provider::CognitoProvider;

use userpool_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use userpool_core::resource::{Resource, ResourceId, State};
use userpool_core::schema::ResourceSchema;

use provider::check_type;
use schemas::user_pool_client::{self, RESOURCE_TYPE};

/// The single resource type this provider handles
pub struct UserPoolClientResourceType;

impl ResourceType for UserPoolClientResourceType {
    fn name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        user_pool_client::schema()
    }
}

impl Provider for CognitoProvider {
    fn name(&self) -> &'static str {
        "cognito"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        vec![Box::new(UserPoolClientResourceType)]
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move {
            check_type(&id)?;
            match identifier {
                Some(identifier) => self.read_client(&id, &identifier).await,
                None => Ok(State::not_found(id)),
            }
        })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move {
            check_type(&resource.id)?;
            self.create_client(&resource).await
        })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        _from: &State,
        to: &Resource,
        changed: &[String],
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let to = to.clone();
        let changed = changed.to_vec();
        Box::pin(async move {
            check_type(&id)?;
            self.update_client(&id, &identifier, &to, &changed).await
        })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move {
            check_type(&id)?;
            self.delete_client(&id, &identifier).await
        })
    }
}
