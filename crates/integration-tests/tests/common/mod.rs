//! Shared helpers for the integration suites: a pre-seeded store, the
//! vote-token codec under a fixed passphrase, and (with `web-axum`) a
//! fully wired router plus a JSON request shim.

// Not every suite touches every helper.
#![allow(dead_code)]

use std::sync::Arc;

use secrecy::SecretString;

use auth_adapters::AeadVoteTokens;
use domains::{NewUser, UserStore};
use storage_adapters::SqliteStore;

#[cfg(feature = "web-axum")]
pub use web::*;

pub const PASSPHRASE: &str = "integration-test-passphrase";

pub const ADMIN: i64 = 1;
pub const ALICE: i64 = 2;
pub const BOB: i64 = 3;

/// Fresh single-connection in-memory database with admin, alice, and bob
/// registered in that order (ids 1..3).
pub async fn seeded_store() -> Arc<SqliteStore> {
    let store = Arc::new(SqliteStore::connect("sqlite::memory:", 1).await.unwrap());
    for name in ["admin", "alice", "bob"] {
        UserStore::insert(
            store.as_ref(),
            NewUser {
                username: name.to_string(),
                active: true,
                email: None,
            },
        )
        .await
        .unwrap();
    }
    store
}

pub fn codec() -> AeadVoteTokens {
    AeadVoteTokens::new(&SecretString::from(PASSPHRASE))
}

#[cfg(feature = "web-axum")]
mod web {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use api_adapters::{router, AppState};
    use storage_adapters::SqliteStore;

    use super::{codec, seeded_store, ADMIN};

    /// Full stack wired over SQLite with voter matching on.
    pub async fn test_app() -> (Router, Arc<SqliteStore>) {
        let store = seeded_store().await;
        let state = AppState::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(codec()),
            ADMIN,
            true,
        );
        (router(state), store)
    }

    /// Helper to make JSON requests.
    pub async fn json_request(
        router: &Router,
        method: &str,
        uri: &str,
        viewer: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = viewer {
            builder = builder.header("x-user-id", user_id.to_string());
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&value).unwrap())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn submit(router: &Router, viewer: i64, title: &str) -> i64 {
        let (status, body) = json_request(
            router,
            "POST",
            "/entries",
            Some(viewer),
            Some(serde_json::json!({ "title": title, "body": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    pub async fn comment(router: &Router, viewer: i64, parent_id: i64, text: &str) -> i64 {
        let (status, body) = json_request(
            router,
            "POST",
            &format!("/entries/{parent_id}/comments"),
            Some(viewer),
            Some(serde_json::json!({ "body": text })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    /// Pulls the viewer's minted token for one entry out of a listing response.
    pub async fn listing_token(router: &Router, viewer: i64, entry_id: i64) -> String {
        let (status, body) = json_request(router, "GET", "/entries", Some(viewer), None).await;
        assert_eq!(status, StatusCode::OK);
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|item| item["id"].as_i64() == Some(entry_id))
            .and_then(|item| item["vote_tok"].as_str())
            .expect("listing row should carry a vote token")
            .to_string()
    }
}
