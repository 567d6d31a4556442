//! Field copying between declared attributes and API structs

use std::collections::HashMap;

use userpool_core::resource::Value;

use crate::api::{UserPoolClientDescription, UserPoolClientSpec};

/// Build a request from declared attributes.
///
/// Only attributes for which `include` returns true are copied; everything
/// else stays unsent.
pub fn spec_from_attributes(
    attributes: &HashMap<String, Value>,
    include: impl Fn(&str) -> bool,
) -> UserPoolClientSpec {
    let get = |key: &str| {
        if include(key) {
            attributes.get(key)
        } else {
            None
        }
    };

    UserPoolClientSpec {
        user_pool_id: get("user_pool_id").and_then(as_string),
        client_name: get("name").and_then(as_string),
        generate_secret: get("generate_secret").and_then(as_bool),
        refresh_token_validity: get("refresh_token_validity").and_then(as_i32),
        explicit_auth_flows: get("explicit_auth_flows").and_then(as_string_list),
        read_attributes: get("read_attributes").and_then(as_string_list),
        write_attributes: get("write_attributes").and_then(as_string_list),
        allowed_oauth_flows: get("allowed_oauth_flows").and_then(as_string_list),
        allowed_oauth_flows_user_pool_client: get("allowed_oauth_flows_user_pool_client")
            .and_then(as_bool),
        allowed_oauth_scopes: get("allowed_oauth_scopes").and_then(as_string_list),
        callback_urls: get("callback_urls").and_then(as_string_list),
        default_redirect_uri: get("default_redirect_uri").and_then(as_string),
        logout_urls: get("logout_urls").and_then(as_string_list),
        supported_identity_providers: get("supported_identity_providers")
            .and_then(as_string_list),
    }
}

/// Copy every returned field into state attributes.
///
/// Empty lists are left out. `generate_secret` is not returned by the API
/// and is derived from whether a secret exists.
pub fn attributes_from_description(desc: &UserPoolClientDescription) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();

    insert_string(&mut attributes, "id", &desc.client_id);
    insert_string(&mut attributes, "name", &desc.client_name);
    insert_string(&mut attributes, "user_pool_id", &desc.user_pool_id);
    insert_string(&mut attributes, "client_secret", &desc.client_secret);
    insert_string(
        &mut attributes,
        "default_redirect_uri",
        &desc.default_redirect_uri,
    );

    attributes.insert(
        "generate_secret".to_string(),
        Value::Bool(desc.client_secret.is_some()),
    );

    if let Some(days) = desc.refresh_token_validity {
        attributes.insert(
            "refresh_token_validity".to_string(),
            Value::Int(i64::from(days)),
        );
    }
    if let Some(enabled) = desc.allowed_oauth_flows_user_pool_client {
        attributes.insert(
            "allowed_oauth_flows_user_pool_client".to_string(),
            Value::Bool(enabled),
        );
    }

    insert_list(&mut attributes, "explicit_auth_flows", &desc.explicit_auth_flows);
    insert_list(&mut attributes, "read_attributes", &desc.read_attributes);
    insert_list(&mut attributes, "write_attributes", &desc.write_attributes);
    insert_list(&mut attributes, "allowed_oauth_flows", &desc.allowed_oauth_flows);
    insert_list(&mut attributes, "allowed_oauth_scopes", &desc.allowed_oauth_scopes);
    insert_list(&mut attributes, "callback_urls", &desc.callback_urls);
    insert_list(&mut attributes, "logout_urls", &desc.logout_urls);
    insert_list(
        &mut attributes,
        "supported_identity_providers",
        &desc.supported_identity_providers,
    );

    attributes
}

fn insert_string(attributes: &mut HashMap<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        attributes.insert(key.to_string(), Value::String(v.clone()));
    }
}

fn insert_list(attributes: &mut HashMap<String, Value>, key: &str, items: &[String]) {
    if !items.is_empty() {
        attributes.insert(
            key.to_string(),
            Value::List(items.iter().map(|s| Value::String(s.clone())).collect()),
        );
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Int(n) => i32::try_from(*n).ok(),
        _ => None,
    }
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::List(items) => Some(items.iter().filter_map(as_string).collect()),
        _ => None,
    }
}
