//! user_pool_client schema definition
//!
//! Maps to the Cognito Identity Provider `UserPoolClientType`.

use userpool_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::types as cognito;

pub const RESOURCE_TYPE: &str = "cognito.user_pool_client";

/// Returns the schema for cognito.user_pool_client
pub fn schema() -> ResourceSchema {
    ResourceSchema::new(RESOURCE_TYPE)
        .with_description("An app client of a Cognito user pool.")
        .attribute(
            AttributeSchema::new("name", cognito::client_name())
                .required()
                .force_new()
                .with_description("The client name.")
                .with_provider_name("ClientName"),
        )
        .attribute(
            AttributeSchema::new("generate_secret", AttributeType::Bool)
                .force_new()
                .with_description("Whether to generate a client secret on creation.")
                .with_provider_name("GenerateSecret"),
        )
        .attribute(
            AttributeSchema::new("user_pool_id", AttributeType::String)
                .required()
                .force_new()
                .with_description("The user pool the client belongs to.")
                .with_provider_name("UserPoolId"),
        )
        .attribute(
            AttributeSchema::new("explicit_auth_flows", cognito::auth_flows())
                .with_description("Authentication flows the client supports.")
                .with_provider_name("ExplicitAuthFlows"),
        )
        .attribute(
            AttributeSchema::new("read_attributes", types::string_list())
                .with_description("User pool attributes the client can read.")
                .with_provider_name("ReadAttributes"),
        )
        .attribute(
            AttributeSchema::new("write_attributes", types::string_list())
                .with_description("User pool attributes the client can write.")
                .with_provider_name("WriteAttributes"),
        )
        .attribute(
            AttributeSchema::new("refresh_token_validity", cognito::refresh_token_validity())
                .with_description("Days after which refresh tokens expire.")
                .with_provider_name("RefreshTokenValidity"),
        )
        .attribute(
            AttributeSchema::new("allowed_oauth_flows", cognito::oauth_flows())
                .with_description("OAuth flows the client may use.")
                .with_provider_name("AllowedOAuthFlows"),
        )
        .attribute(
            AttributeSchema::new("allowed_oauth_flows_user_pool_client", AttributeType::Bool)
                .with_description("Whether the client may follow the OAuth protocol.")
                .with_provider_name("AllowedOAuthFlowsUserPoolClient"),
        )
        .attribute(
            AttributeSchema::new("allowed_oauth_scopes", types::string_list())
                .with_description("OAuth scopes the client may request.")
                .with_provider_name("AllowedOAuthScopes"),
        )
        .attribute(
            AttributeSchema::new("callback_urls", types::string_list())
                .with_description("Allowed redirect URLs after sign-in.")
                .with_provider_name("CallbackURLs"),
        )
        .attribute(
            AttributeSchema::new("default_redirect_uri", AttributeType::String)
                .with_description("Default redirect URI; must be one of callback_urls.")
                .with_provider_name("DefaultRedirectURI"),
        )
        .attribute(
            AttributeSchema::new("logout_urls", types::string_list())
                .with_description("Allowed redirect URLs after sign-out.")
                .with_provider_name("LogoutURLs"),
        )
        .attribute(
            AttributeSchema::new("supported_identity_providers", types::string_list())
                .with_description("Identity providers the client may use.")
                .with_provider_name("SupportedIdentityProviders"),
        )
        .attribute(
            AttributeSchema::new("id", AttributeType::String)
                .computed()
                .with_description("The client id assigned by Cognito.")
                .with_provider_name("ClientId"),
        )
        .attribute(
            AttributeSchema::new("client_secret", AttributeType::String)
                .computed()
                .sensitive()
                .with_description("The client secret, when one was generated.")
                .with_provider_name("ClientSecret"),
        )
}
