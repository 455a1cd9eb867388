use super::SyncDateTime;
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are considered expired this long before their actual expiry.
const EXPIRY_DELTA_SECONDS: i64 = 10;

/// Access credential issued by the identity provider.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expiry: SyncDateTime,
    /// JWT carrying the identity claims of the user. Sent to the usage API.
    #[serde(default)]
    pub id_token: String,
}

impl Token {
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: SyncDateTime) -> bool {
        !self.access_token.is_empty()
            && self.expiry - TimeDelta::seconds(EXPIRY_DELTA_SECONDS) > now
    }
}

// Keep the secrets out of the logs.
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token_type", &self.token_type)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expiry", &self.expiry)
            .finish()
    }
}
