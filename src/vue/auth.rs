use crate::atom::Atom;
use crate::datamodel::Token;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Unsupported authentication challenge: {0}")]
    UnsupportedChallenge(String),

    #[error("Identity provider answer is missing {0}")]
    MissingField(&'static str),

    #[error("Token is expired and no username/password is configured")]
    MissingCredentials,

    #[error("Refresh failed: {0}")]
    Refresh(Box<AuthError>),

    #[error("Authentication failed: {0}")]
    Authenticate(Box<AuthError>),
}

/// Supplies a non-expired token for outgoing requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<Token, AuthError>;
}

/// The two ways to obtain a fresh token from the identity provider.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Token, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<Token, AuthError>;
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

pub type TokenCell = Atom<Option<Token>>;

/// Keeps the current token in a shared [`Atom`] and renews it when it expires.
///
/// A refresh is attempted first when the held token carries a refresh token,
/// otherwise the configured credentials are used. Renewals are serialized so
/// concurrent callers do not hit the identity provider twice.
pub struct CachedTokenSource<A> {
    authenticator: A,
    token: Arc<TokenCell>,
    credentials: Option<Credentials>,
    renew_lock: Mutex<()>,
}

impl<A: Authenticator> CachedTokenSource<A> {
    pub fn new(authenticator: A, token: Arc<TokenCell>, credentials: Option<Credentials>) -> Self {
        Self {
            authenticator,
            token,
            credentials,
            renew_lock: Mutex::new(()),
        }
    }

    pub fn token_cell(&self) -> Arc<TokenCell> {
        self.token.clone()
    }

    async fn renew(&self, current: Option<Token>) -> Result<Token, AuthError> {
        if let Some(refresh_token) = current.as_ref().and_then(|t| t.refresh_token.clone()) {
            debug!("Refreshing expired token");
            let mut token = self
                .authenticator
                .refresh(&refresh_token)
                .await
                .map_err(|e| AuthError::Refresh(Box::new(e)))?;
            // Refresh answers don't always carry a new refresh token.
            if token.refresh_token.is_none() {
                token.refresh_token = Some(refresh_token);
            }
            return Ok(token);
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(AuthError::MissingCredentials)?;
        info!("Authenticating as {}", credentials.username);
        self.authenticator
            .authenticate(&credentials.username, &credentials.password)
            .await
            .map_err(|e| AuthError::Authenticate(Box::new(e)))
    }
}

#[async_trait]
impl<A: Authenticator> TokenProvider for CachedTokenSource<A> {
    async fn token(&self) -> Result<Token, AuthError> {
        let _guard = self.renew_lock.lock().await;

        let current = self.token.load();
        if let Some(token) = current.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.clone());
        }

        let token = self.renew(current).await?;
        self.token.reset(Some(token.clone()));
        Ok(token)
    }
}
