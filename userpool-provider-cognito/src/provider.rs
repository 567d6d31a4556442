//! Cognito Provider implementation
//!
//! Translates host lifecycle calls for `cognito.user_pool_client` into
//! user pool client API calls and copies the observed client back into
//! state.

use userpool_core::provider::{ProviderError, ProviderResult};
use userpool_core::resource::{Resource, ResourceId, State};
use userpool_core::schema::ResourceSchema;

use crate::api::{ApiError, UserPoolClientApi};
use crate::convert::{attributes_from_description, spec_from_attributes};
use crate::identifier::ClientIdentifier;
use crate::schemas::user_pool_client::{self, RESOURCE_TYPE};
use crate::sdk::SdkUserPoolClientApi;

/// Cognito Provider
pub struct CognitoProvider {
    api: Box<dyn UserPoolClientApi>,
    schema: ResourceSchema,
}

impl CognitoProvider {
    /// Create a new CognitoProvider, optionally pinned to a region
    pub async fn new(region: Option<&str>) -> Self {
        Self::with_api(SdkUserPoolClientApi::new(region).await)
    }

    /// Create with a specific API implementation (for testing)
    pub fn with_api(api: impl UserPoolClientApi + 'static) -> Self {
        Self {
            api: Box::new(api),
            schema: user_pool_client::schema(),
        }
    }

    /// Read a user pool client
    ///
    /// A client the service no longer knows about is reported as not found,
    /// which the host treats as already deleted.
    pub async fn read_client(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let client_id = parse_identifier(id, identifier)?;

        log::debug!("Reading Cognito User Pool Client: {}", client_id);

        match self.api.describe_client(&client_id).await {
            Ok(desc) => {
                let attributes = attributes_from_description(&desc);
                Ok(State::existing(id.clone(), attributes).with_identifier(identifier))
            }
            Err(err) if err.is_not_found() => {
                log::warn!("Cognito User Pool Client {} is already gone", client_id);
                Ok(State::not_found(id.clone()))
            }
            Err(err) => Err(api_error("Failed to read user pool client", err, id)),
        }
    }

    /// Create a user pool client
    pub async fn create_client(&self, resource: &Resource) -> ProviderResult<State> {
        let spec = spec_from_attributes(&resource.attributes, |_| true);

        let user_pool_id = spec.user_pool_id.clone().ok_or_else(|| {
            ProviderError::new("user_pool_id is required").for_resource(resource.id.clone())
        })?;
        if spec.client_name.is_none() {
            return Err(ProviderError::new("name is required").for_resource(resource.id.clone()));
        }

        log::debug!("Creating Cognito User Pool Client: {:?}", spec);

        let desc = self
            .api
            .create_client(spec)
            .await
            .map_err(|e| api_error("Failed to create user pool client", e, &resource.id))?;

        let client_id = desc.client_id.clone().ok_or_else(|| {
            ProviderError::new("User pool client created but no ID returned")
                .for_resource(resource.id.clone())
        })?;

        let identifier = ClientIdentifier::new(user_pool_id, client_id).to_string();
        log::info!("Created Cognito User Pool Client {}", identifier);

        // The client exists from here on, so the identifier must reach the host
        // even when the follow-up describe does not see it yet.
        let created = || {
            State::existing(resource.id.clone(), attributes_from_description(&desc))
                .with_identifier(&identifier)
        };
        match self.read_client(&resource.id, &identifier).await {
            Ok(state) if state.exists => Ok(state),
            Ok(_) => {
                log::warn!(
                    "Cognito User Pool Client {} not visible yet, using create response",
                    identifier
                );
                Ok(created())
            }
            Err(e) => {
                log::warn!(
                    "Re-reading Cognito User Pool Client {} failed, using create response: {}",
                    identifier,
                    e
                );
                Ok(created())
            }
        }
    }

    /// Update a user pool client in place
    ///
    /// Only changed attributes that can be updated are sent; the pool and
    /// client ids come from the identifier.
    pub async fn update_client(
        &self,
        id: &ResourceId,
        identifier: &str,
        to: &Resource,
        changed: &[String],
    ) -> ProviderResult<State> {
        let client_id = parse_identifier(id, identifier)?;

        let spec = spec_from_attributes(&to.attributes, |key| {
            changed.iter().any(|c| c == key) && !self.schema.is_force_new(key)
        });

        log::debug!(
            "Updating Cognito User Pool Client {}: {:?}",
            client_id,
            spec
        );

        self.api
            .update_client(&client_id, spec)
            .await
            .map_err(|e| api_error("Failed to update user pool client", e, id))?;

        self.read_client(id, identifier).await
    }

    /// Delete a user pool client
    pub async fn delete_client(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let client_id = parse_identifier(id, identifier)?;

        log::debug!("Deleting Cognito User Pool Client: {}", client_id);

        self.api
            .delete_client(&client_id)
            .await
            .map_err(|e| api_error("Failed to delete user pool client", e, id))
    }
}

fn parse_identifier(id: &ResourceId, identifier: &str) -> ProviderResult<ClientIdentifier> {
    identifier.parse::<ClientIdentifier>().map_err(|e| {
        ProviderError::new(e.to_string())
            .for_resource(id.clone())
            .with_cause(e)
    })
}

fn api_error(context: &str, err: ApiError, id: &ResourceId) -> ProviderError {
    ProviderError::new(format!("{}: {}", context, err))
        .for_resource(id.clone())
        .with_cause(err)
}

/// Ensure a resource is of the type this provider manages
pub(crate) fn check_type(id: &ResourceId) -> ProviderResult<()> {
    if id.resource_type == RESOURCE_TYPE {
        Ok(())
    } else {
        Err(
            ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
                .for_resource(id.clone()),
        )
    }
}
