//! Host-side identifier of a created user pool client
//!
//! Every describe, update and delete call needs both the user pool id and
//! the client id, so the identifier stored by the host carries both as
//! `<user_pool_id>/<client_id>`.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("Invalid identifier '{0}': expected <user_pool_id>/<client_id>")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentifier {
    pub user_pool_id: String,
    pub client_id: String,
}

impl ClientIdentifier {
    pub fn new(user_pool_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
        }
    }
}

impl fmt::Display for ClientIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_pool_id, self.client_id)
    }
}

impl FromStr for ClientIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((pool, client))
                if !pool.is_empty() && !client.is_empty() && !client.contains('/') =>
            {
                Ok(Self::new(pool, client))
            }
            _ => Err(IdentifierError::Malformed(s.to_string())),
        }
    }
}
