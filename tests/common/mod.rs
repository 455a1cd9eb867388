#![allow(dead_code)]

use anyhow::Result;
use axum::Router;
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use vuesync::atom::Atom;
use vuesync::datamodel::{SyncDateTime, SyncDateTimeExt, Token};
use vuesync::vue::auth::TokenCell;

pub mod cognito;
pub mod http;
pub mod logs;
pub mod victoria_metrics;
pub mod vue_api;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}/", address))
}

/// 2024-01-01T00:00:00Z plus `minutes`.
pub fn minutes_after_new_year(minutes: i64) -> SyncDateTime {
    SyncDateTime::from_unix_seconds_i64(1_704_067_200).unwrap() + TimeDelta::minutes(minutes)
}

pub fn valid_token(name: &str) -> Token {
    Token {
        access_token: format!("access-{}", name),
        token_type: "Bearer".to_string(),
        refresh_token: Some(format!("refresh-{}", name)),
        expiry: Utc::now() + TimeDelta::hours(1),
        id_token: format!("id-{}", name),
    }
}

pub fn token_cell(token: Option<Token>) -> Arc<TokenCell> {
    Arc::new(Atom::new(token))
}
