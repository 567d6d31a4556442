//! Cognito resource schema definitions

pub mod types;
pub mod user_pool_client;

use userpool_core::schema::ResourceSchema;

/// Returns all Cognito schemas
pub fn all_schemas() -> Vec<ResourceSchema> {
    vec![user_pool_client::schema()]
}
