//! `UserPoolClientApi` backed by the AWS SDK for Cognito Identity Provider

use aws_config::Region;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::{
    ExplicitAuthFlowsType, OAuthFlowType, UserPoolClientType,
};
use userpool_core::provider::BoxFuture;

use crate::api::{
    ApiError, ApiResult, UserPoolClientApi, UserPoolClientDescription, UserPoolClientSpec,
};
use crate::identifier::ClientIdentifier;

const NOT_FOUND_CODE: &str = "ResourceNotFoundException";

pub struct SdkUserPoolClientApi {
    client: CognitoClient,
}

impl SdkUserPoolClientApi {
    /// Load AWS configuration from the environment.
    ///
    /// An explicit region overrides the default provider chain.
    pub async fn new(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;

        Self::with_client(CognitoClient::new(&config))
    }

    /// Create with a specific client (for custom endpoints)
    pub fn with_client(client: CognitoClient) -> Self {
        Self { client }
    }
}

impl UserPoolClientApi for SdkUserPoolClientApi {
    fn create_client(
        &self,
        spec: UserPoolClientSpec,
    ) -> BoxFuture<'_, ApiResult<UserPoolClientDescription>> {
        Box::pin(async move {
            let output = self
                .client
                .create_user_pool_client()
                .set_user_pool_id(spec.user_pool_id)
                .set_client_name(spec.client_name)
                .set_generate_secret(spec.generate_secret)
                .set_refresh_token_validity(spec.refresh_token_validity)
                .set_explicit_auth_flows(spec.explicit_auth_flows.map(to_auth_flows))
                .set_read_attributes(spec.read_attributes)
                .set_write_attributes(spec.write_attributes)
                .set_allowed_o_auth_flows(spec.allowed_oauth_flows.map(to_oauth_flows))
                .set_allowed_o_auth_flows_user_pool_client(
                    spec.allowed_oauth_flows_user_pool_client,
                )
                .set_allowed_o_auth_scopes(spec.allowed_oauth_scopes)
                .set_callback_urls(spec.callback_urls)
                .set_default_redirect_uri(spec.default_redirect_uri)
                .set_logout_urls(spec.logout_urls)
                .set_supported_identity_providers(spec.supported_identity_providers)
                .send()
                .await
                .map_err(|e| map_sdk_error("CreateUserPoolClient", e))?;

            output
                .user_pool_client()
                .map(description_from_sdk)
                .ok_or_else(|| missing_client("CreateUserPoolClient"))
        })
    }

    fn describe_client(
        &self,
        id: &ClientIdentifier,
    ) -> BoxFuture<'_, ApiResult<UserPoolClientDescription>> {
        let id = id.clone();
        Box::pin(async move {
            let output = self
                .client
                .describe_user_pool_client()
                .user_pool_id(&id.user_pool_id)
                .client_id(&id.client_id)
                .send()
                .await
                .map_err(|e| map_sdk_error("DescribeUserPoolClient", e))?;

            output
                .user_pool_client()
                .map(description_from_sdk)
                .ok_or_else(|| missing_client("DescribeUserPoolClient"))
        })
    }

    fn update_client(
        &self,
        id: &ClientIdentifier,
        spec: UserPoolClientSpec,
    ) -> BoxFuture<'_, ApiResult<()>> {
        let id = id.clone();
        Box::pin(async move {
            self.client
                .update_user_pool_client()
                .user_pool_id(&id.user_pool_id)
                .client_id(&id.client_id)
                .set_client_name(spec.client_name)
                .set_refresh_token_validity(spec.refresh_token_validity)
                .set_explicit_auth_flows(spec.explicit_auth_flows.map(to_auth_flows))
                .set_read_attributes(spec.read_attributes)
                .set_write_attributes(spec.write_attributes)
                .set_allowed_o_auth_flows(spec.allowed_oauth_flows.map(to_oauth_flows))
                .set_allowed_o_auth_flows_user_pool_client(
                    spec.allowed_oauth_flows_user_pool_client,
                )
                .set_allowed_o_auth_scopes(spec.allowed_oauth_scopes)
                .set_callback_urls(spec.callback_urls)
                .set_default_redirect_uri(spec.default_redirect_uri)
                .set_logout_urls(spec.logout_urls)
                .set_supported_identity_providers(spec.supported_identity_providers)
                .send()
                .await
                .map_err(|e| map_sdk_error("UpdateUserPoolClient", e))?;

            Ok(())
        })
    }

    fn delete_client(&self, id: &ClientIdentifier) -> BoxFuture<'_, ApiResult<()>> {
        let id = id.clone();
        Box::pin(async move {
            self.client
                .delete_user_pool_client()
                .user_pool_id(&id.user_pool_id)
                .client_id(&id.client_id)
                .send()
                .await
                .map_err(|e| map_sdk_error("DeleteUserPoolClient", e))?;

            Ok(())
        })
    }
}

fn to_auth_flows(flows: Vec<String>) -> Vec<ExplicitAuthFlowsType> {
    flows
        .iter()
        .map(|f| ExplicitAuthFlowsType::from(f.as_str()))
        .collect()
}

fn to_oauth_flows(flows: Vec<String>) -> Vec<OAuthFlowType> {
    flows
        .iter()
        .map(|f| OAuthFlowType::from(f.as_str()))
        .collect()
}

fn description_from_sdk(client: &UserPoolClientType) -> UserPoolClientDescription {
    UserPoolClientDescription {
        user_pool_id: client.user_pool_id().map(String::from),
        client_id: client.client_id().map(String::from),
        client_name: client.client_name().map(String::from),
        client_secret: client.client_secret().map(String::from),
        refresh_token_validity: Some(client.refresh_token_validity()),
        explicit_auth_flows: client
            .explicit_auth_flows()
            .iter()
            .map(|f| f.as_str().to_string())
            .collect(),
        read_attributes: client.read_attributes().to_vec(),
        write_attributes: client.write_attributes().to_vec(),
        allowed_oauth_flows: client
            .allowed_o_auth_flows()
            .iter()
            .map(|f| f.as_str().to_string())
            .collect(),
        allowed_oauth_flows_user_pool_client: client.allowed_o_auth_flows_user_pool_client(),
        allowed_oauth_scopes: client.allowed_o_auth_scopes().to_vec(),
        callback_urls: client.callback_urls().to_vec(),
        default_redirect_uri: client.default_redirect_uri().map(String::from),
        logout_urls: client.logout_urls().to_vec(),
        supported_identity_providers: client.supported_identity_providers().to_vec(),
    }
}

fn missing_client(operation: &'static str) -> ApiError {
    ApiError::Service {
        operation,
        message: "response did not include a user pool client".to_string(),
        source: None,
    }
}

fn map_sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> ApiError
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    let not_found = err
        .as_service_error()
        .and_then(|e| e.code())
        == Some(NOT_FOUND_CODE);

    if not_found {
        ApiError::NotFound { operation, message }
    } else {
        ApiError::Service {
            operation,
            message,
            source: Some(Box::new(err)),
        }
    }
}
