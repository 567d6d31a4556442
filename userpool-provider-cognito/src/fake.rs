//! In-memory `UserPoolClientApi` used by the adapter tests

use std::collections::HashMap;
use std::sync::Mutex;

use userpool_core::provider::BoxFuture;

use crate::api::{
    ApiError, ApiResult, UserPoolClientApi, UserPoolClientDescription, UserPoolClientSpec,
};
use crate::identifier::ClientIdentifier;

/// A call as seen by the fake service
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(UserPoolClientSpec),
    Describe(ClientIdentifier),
    Update(ClientIdentifier, UserPoolClientSpec),
    Delete(ClientIdentifier),
}

#[derive(Default)]
struct Inner {
    clients: HashMap<(String, String), UserPoolClientDescription>,
    calls: Vec<Call>,
    next_id: u32,
    fail_next: Option<String>,
    describe_failure: Option<DescribeFailure>,
}

#[derive(Clone)]
enum DescribeFailure {
    Service(String),
    NotFound,
}

#[derive(Default)]
pub struct FakeUserPoolClientApi {
    inner: Mutex<Inner>,
}

impl FakeUserPoolClientApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with a service error
    pub fn fail_next(&self, message: &str) {
        self.inner.lock().unwrap().fail_next = Some(message.to_string());
    }

    /// Fail every describe with a service error, as a throttled API would
    pub fn fail_describe(&self, message: &str) {
        self.inner.lock().unwrap().describe_failure =
            Some(DescribeFailure::Service(message.to_string()));
    }

    /// Report every client as missing on describe, as a lagging read would
    pub fn hide_on_describe(&self) {
        self.inner.lock().unwrap().describe_failure = Some(DescribeFailure::NotFound);
    }

    /// Remove a client behind the adapter's back
    pub fn forget(&self, id: &ClientIdentifier) {
        self.inner
            .lock()
            .unwrap()
            .clients
            .remove(&(id.user_pool_id.clone(), id.client_id.clone()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn client_count(&self) -> usize {
        self.inner.lock().unwrap().clients.len()
    }

    fn handle(&self, call: Call) -> ApiResult<Option<UserPoolClientDescription>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call.clone());

        if let Some(message) = inner.fail_next.take() {
            return Err(ApiError::Service {
                operation: "Fake",
                message,
                source: None,
            });
        }

        if let (Call::Describe(id), Some(failure)) = (&call, inner.describe_failure.clone()) {
            return Err(match failure {
                DescribeFailure::Service(message) => ApiError::Service {
                    operation: "DescribeUserPoolClient",
                    message,
                    source: None,
                },
                DescribeFailure::NotFound => not_found("DescribeUserPoolClient", id),
            });
        }

        match call {
            Call::Create(spec) => {
                inner.next_id += 1;
                let client_id = format!("client{}", inner.next_id);
                let pool = spec.user_pool_id.clone().unwrap_or_default();
                let desc = UserPoolClientDescription {
                    user_pool_id: Some(pool.clone()),
                    client_id: Some(client_id.clone()),
                    client_name: spec.client_name.clone(),
                    client_secret: spec
                        .generate_secret
                        .unwrap_or(false)
                        .then(|| format!("secret-{}", client_id)),
                    refresh_token_validity: Some(spec.refresh_token_validity.unwrap_or(30)),
                    allowed_oauth_flows_user_pool_client: Some(
                        spec.allowed_oauth_flows_user_pool_client.unwrap_or(false),
                    ),
                    ..Default::default()
                };
                let desc = apply_spec(desc, &spec);
                inner.clients.insert((pool, client_id), desc.clone());
                Ok(Some(desc))
            }
            Call::Describe(id) => inner
                .clients
                .get(&(id.user_pool_id.clone(), id.client_id.clone()))
                .cloned()
                .map(Some)
                .ok_or_else(|| not_found("DescribeUserPoolClient", &id)),
            Call::Update(id, spec) => {
                let key = (id.user_pool_id.clone(), id.client_id.clone());
                let current = inner
                    .clients
                    .remove(&key)
                    .ok_or_else(|| not_found("UpdateUserPoolClient", &id))?;
                inner.clients.insert(key, apply_spec(current, &spec));
                Ok(None)
            }
            Call::Delete(id) => inner
                .clients
                .remove(&(id.user_pool_id.clone(), id.client_id.clone()))
                .map(|_| None)
                .ok_or_else(|| not_found("DeleteUserPoolClient", &id)),
        }
    }
}

fn not_found(operation: &'static str, id: &ClientIdentifier) -> ApiError {
    ApiError::NotFound {
        operation,
        message: format!("User pool client {} does not exist.", id.client_id),
    }
}

fn apply_spec(
    mut desc: UserPoolClientDescription,
    spec: &UserPoolClientSpec,
) -> UserPoolClientDescription {
    if let Some(v) = &spec.client_name {
        desc.client_name = Some(v.clone());
    }
    if let Some(v) = spec.refresh_token_validity {
        desc.refresh_token_validity = Some(v);
    }
    if let Some(v) = spec.allowed_oauth_flows_user_pool_client {
        desc.allowed_oauth_flows_user_pool_client = Some(v);
    }
    if let Some(v) = &spec.default_redirect_uri {
        desc.default_redirect_uri = Some(v.clone());
    }
    let lists = [
        (&spec.explicit_auth_flows, &mut desc.explicit_auth_flows),
        (&spec.read_attributes, &mut desc.read_attributes),
        (&spec.write_attributes, &mut desc.write_attributes),
        (&spec.allowed_oauth_flows, &mut desc.allowed_oauth_flows),
        (&spec.allowed_oauth_scopes, &mut desc.allowed_oauth_scopes),
        (&spec.callback_urls, &mut desc.callback_urls),
        (&spec.logout_urls, &mut desc.logout_urls),
        (
            &spec.supported_identity_providers,
            &mut desc.supported_identity_providers,
        ),
    ];
    for (from, to) in lists {
        if let Some(items) = from {
            *to = items.clone();
        }
    }
    desc
}

impl UserPoolClientApi for FakeUserPoolClientApi {
    fn create_client(
        &self,
        spec: UserPoolClientSpec,
    ) -> BoxFuture<'_, ApiResult<UserPoolClientDescription>> {
        let result = self
            .handle(Call::Create(spec))
            .map(Option::unwrap_or_default);
        Box::pin(async move { result })
    }

    fn describe_client(
        &self,
        id: &ClientIdentifier,
    ) -> BoxFuture<'_, ApiResult<UserPoolClientDescription>> {
        let result = self
            .handle(Call::Describe(id.clone()))
            .map(Option::unwrap_or_default);
        Box::pin(async move { result })
    }

    fn update_client(
        &self,
        id: &ClientIdentifier,
        spec: UserPoolClientSpec,
    ) -> BoxFuture<'_, ApiResult<()>> {
        let result = self.handle(Call::Update(id.clone(), spec)).map(|_| ());
        Box::pin(async move { result })
    }

    fn delete_client(&self, id: &ClientIdentifier) -> BoxFuture<'_, ApiResult<()>> {
        let result = self.handle(Call::Delete(id.clone())).map(|_| ());
        Box::pin(async move { result })
    }
}

/// Lets a test keep a handle on the fake after handing it to the provider
impl UserPoolClientApi for std::sync::Arc<FakeUserPoolClientApi> {
    fn create_client(
        &self,
        spec: UserPoolClientSpec,
    ) -> BoxFuture<'_, ApiResult<UserPoolClientDescription>> {
        (**self).create_client(spec)
    }

    fn describe_client(
        &self,
        id: &ClientIdentifier,
    ) -> BoxFuture<'_, ApiResult<UserPoolClientDescription>> {
        (**self).describe_client(id)
    }

    fn update_client(
        &self,
        id: &ClientIdentifier,
        spec: UserPoolClientSpec,
    ) -> BoxFuture<'_, ApiResult<()>> {
        (**self).update_client(id, spec)
    }

    fn delete_client(&self, id: &ClientIdentifier) -> BoxFuture<'_, ApiResult<()>> {
        (**self).delete_client(id)
    }
}
