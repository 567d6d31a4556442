//! Control-plane operations the adapter consumes
//!
//! `UserPoolClientApi` is the seam between the attribute mapping and the
//! Cognito SDK. Requests and responses are plain structs with the API's
//! field set, so the mapping can be exercised without AWS.

use userpool_core::provider::BoxFuture;

use crate::identifier::ClientIdentifier;

/// Fields sent in a create or update request.
///
/// `None` means "not sent". Lists are sent as given, including empty ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPoolClientSpec {
    pub user_pool_id: Option<String>,
    pub client_name: Option<String>,
    /// Only honoured by create
    pub generate_secret: Option<bool>,
    pub refresh_token_validity: Option<i32>,
    pub explicit_auth_flows: Option<Vec<String>>,
    pub read_attributes: Option<Vec<String>>,
    pub write_attributes: Option<Vec<String>>,
    pub allowed_oauth_flows: Option<Vec<String>>,
    pub allowed_oauth_flows_user_pool_client: Option<bool>,
    pub allowed_oauth_scopes: Option<Vec<String>>,
    pub callback_urls: Option<Vec<String>>,
    pub default_redirect_uri: Option<String>,
    pub logout_urls: Option<Vec<String>>,
    pub supported_identity_providers: Option<Vec<String>>,
}

/// A user pool client as returned by create and describe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPoolClientDescription {
    pub user_pool_id: Option<String>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token_validity: Option<i32>,
    pub explicit_auth_flows: Vec<String>,
    pub read_attributes: Vec<String>,
    pub write_attributes: Vec<String>,
    pub allowed_oauth_flows: Vec<String>,
    pub allowed_oauth_flows_user_pool_client: Option<bool>,
    pub allowed_oauth_scopes: Vec<String>,
    pub callback_urls: Vec<String>,
    pub default_redirect_uri: Option<String>,
    pub logout_urls: Vec<String>,
    pub supported_identity_providers: Vec<String>,
}

/// Error returned by a control-plane call
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service reported `ResourceNotFoundException`
    #[error("{operation}: resource not found: {message}")]
    NotFound {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: {message}")]
    Service {
        operation: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The four client operations of the Cognito Identity Provider API
pub trait UserPoolClientApi: Send + Sync {
    fn create_client(
        &self,
        spec: UserPoolClientSpec,
    ) -> BoxFuture<'_, ApiResult<UserPoolClientDescription>>;

    fn describe_client(
        &self,
        id: &ClientIdentifier,
    ) -> BoxFuture<'_, ApiResult<UserPoolClientDescription>>;

    fn update_client(
        &self,
        id: &ClientIdentifier,
        spec: UserPoolClientSpec,
    ) -> BoxFuture<'_, ApiResult<()>>;

    fn delete_client(&self, id: &ClientIdentifier) -> BoxFuture<'_, ApiResult<()>>;
}
