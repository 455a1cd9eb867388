use super::auth::{AuthError, Authenticator};
use crate::datamodel::Token;
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;

const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Talks to the Cognito user pool of the usage API through its JSON protocol.
#[derive(Debug, Clone)]
pub struct CognitoAuthenticator {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: Option<String>,
    expires_in: Option<i64>,
    id_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
}

impl CognitoAuthenticator {
    pub fn new(http: reqwest::Client, region: &str, client_id: &str) -> Self {
        Self::with_endpoint(
            http,
            &format!("https://cognito-idp.{}.amazonaws.com/", region),
            client_id,
        )
    }

    pub fn with_endpoint(http: reqwest::Client, endpoint: &str, client_id: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            client_id: client_id.to_string(),
        }
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        parameters: serde_json::Value,
    ) -> Result<Token, AuthError> {
        // Expiry is counted from the moment the request is sent.
        let now = Utc::now();
        let body = json!({
            "AuthFlow": flow,
            "ClientId": self.client_id,
            "AuthParameters": parameters,
        });
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", INITIATE_AUTH_TARGET)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let answer: InitiateAuthResponse = response.json().await?;
        if let Some(challenge) = answer.challenge_name {
            return Err(AuthError::UnsupportedChallenge(challenge));
        }
        let result = answer
            .authentication_result
            .ok_or(AuthError::MissingField("AuthenticationResult"))?;

        Ok(Token {
            access_token: result
                .access_token
                .ok_or(AuthError::MissingField("AccessToken"))?,
            token_type: result.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: result.refresh_token,
            expiry: now + TimeDelta::seconds(result.expires_in.unwrap_or_default()),
            id_token: result.id_token.ok_or(AuthError::MissingField("IdToken"))?,
        })
    }
}

#[async_trait]
impl Authenticator for CognitoAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Token, AuthError> {
        self.initiate_auth(
            "USER_PASSWORD_AUTH",
            json!({ "USERNAME": username, "PASSWORD": password }),
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Token, AuthError> {
        self.initiate_auth(
            "REFRESH_TOKEN_AUTH",
            json!({ "REFRESH_TOKEN": refresh_token }),
        )
        .await
    }
}
