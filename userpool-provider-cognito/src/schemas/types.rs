//! Cognito-specific type definitions

use std::sync::LazyLock;

use regex::Regex;
use userpool_core::resource::Value;
use userpool_core::schema::{AttributeType, types};

/// Explicit authentication flows accepted by the API
pub const AUTH_FLOWS: &[&str] = &[
    "ADMIN_NO_SRP_AUTH",
    "CUSTOM_AUTH_FLOW_ONLY",
    "USER_PASSWORD_AUTH",
    "ALLOW_ADMIN_USER_PASSWORD_AUTH",
    "ALLOW_CUSTOM_AUTH",
    "ALLOW_USER_PASSWORD_AUTH",
    "ALLOW_USER_SRP_AUTH",
    "ALLOW_REFRESH_TOKEN_AUTH",
];

/// OAuth flows a client may be allowed to use
pub const OAUTH_FLOWS: &[&str] = &["code", "implicit", "client_credentials"];

/// Refresh token validity is given in days
pub const MAX_REFRESH_TOKEN_VALIDITY_DAYS: i64 = 3650;

const MAX_CLIENT_NAME_LEN: usize = 128;

static CLIENT_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s+=,.@-]+$").expect("client name pattern is valid"));

/// List of explicit auth flows
pub fn auth_flows() -> AttributeType {
    types::enum_list(AUTH_FLOWS)
}

/// List of OAuth flows
pub fn oauth_flows() -> AttributeType {
    types::enum_list(OAUTH_FLOWS)
}

/// Refresh token validity in days (0..=3650)
pub fn refresh_token_validity() -> AttributeType {
    AttributeType::Custom {
        name: "RefreshTokenValidity".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(days) if (0..=MAX_REFRESH_TOKEN_VALIDITY_DAYS).contains(days) => Ok(()),
            Value::Int(days) => Err(format!(
                "refresh_token_validity must be between 0 and {} days, got {}",
                MAX_REFRESH_TOKEN_VALIDITY_DAYS, days
            )),
            _ => Err("Expected integer".to_string()),
        },
    }
}

/// Client name: 1-128 characters of `[\w\s+=,.@-]`
pub fn client_name() -> AttributeType {
    AttributeType::Custom {
        name: "ClientName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_client_name(s),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// Validate a user pool client name
pub fn validate_client_name(name: &str) -> Result<(), String> {
    if name.chars().count() > MAX_CLIENT_NAME_LEN {
        return Err(format!(
            "Client name must be at most {} characters, got {}",
            MAX_CLIENT_NAME_LEN,
            name.chars().count()
        ));
    }
    if !CLIENT_NAME_PATTERN.is_match(name) {
        return Err(format!(
            "Invalid client name '{}': allowed characters are letters, digits, whitespace and +=,.@-",
            name
        ));
    }
    Ok(())
}
