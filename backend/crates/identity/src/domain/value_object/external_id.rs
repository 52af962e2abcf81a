//! External Identity Value Object
//!
//! Subject identifier asserted by the federated identity provider.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const EXTERNAL_ID_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let id = raw.as_ref().trim();
        if id.is_empty() {
            return Err(AppError::bad_request("Provider identity is required"));
        }
        if id.len() > EXTERNAL_ID_MAX_LENGTH {
            return Err(AppError::bad_request("Provider identity is too long"));
        }
        Ok(Self(id.to_string()))
    }

    pub fn from_db(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
