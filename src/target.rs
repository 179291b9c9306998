/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! In-memory `/users` CRUD service, the same surface the container and serverless deployments
//! expose, so that load tests can be exercised locally.

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{collections::BTreeMap, fmt, sync::Arc, time::Instant};
use tokio::{net::TcpListener, sync::RwLock};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub school: String,
    pub color: String,
    pub age: String,
    pub family: String,
    pub company: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<BTreeMap<String, UserRecord>>>,
}
impl UserStore {
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    pub async fn all(&self) -> Vec<UserRecord> {
        self.users.read().await.values().cloned().collect()
    }

    pub async fn upsert(&self, user: UserRecord) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn remove(&self, id: &str) -> Option<UserRecord> {
        self.users.write().await.remove(id)
    }
}

#[derive(Debug)]
pub enum ServerError {
    InvalidBody(JsonRejection),
    InvalidId,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidBody(rejection) => rejection.status(),
            ServerError::InvalidId => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_message(&self) -> String {
        match self {
            ServerError::InvalidBody(rejection) => {
                format!("failed to decode request body: {}", rejection.body_text())
            }
            ServerError::InvalidId => "invalid user id".to_string(),
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error_message())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({"error": self.error_message()})),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidBody(rejection)
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_users(State(store): State<UserStore>) -> Json<Vec<UserRecord>> {
    Json(store.all().await)
}

async fn create_user(
    State(store): State<UserStore>,
    payload: Result<Json<UserRecord>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(mut user) = payload?;
    if user.id.is_empty() {
        user.id = nanoid::nanoid!();
    }

    store.upsert(user).await;
    Ok(StatusCode::CREATED)
}

async fn update_user(
    State(store): State<UserStore>,
    Path(id): Path<String>,
    payload: Result<Json<UserRecord>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    if id.trim().is_empty() {
        return Err(ServerError::InvalidId);
    }

    let Json(mut user) = payload?;
    user.id = id;

    store.upsert(user).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(State(store): State<UserStore>, Path(id): Path<String>) -> StatusCode {
    // deleting an unknown user still succeeds
    store.remove(&id).await;
    StatusCode::OK
}

async fn log_request_time(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "handled request"
    );
    response
}

pub fn create_app(store: UserStore) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .with_state(store)
        .layer(middleware::from_fn(log_request_time))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_origin(Any),
        )
}

/// Serves the users API on an already bound listener until `shutdown` is cancelled.
pub async fn serve_on(
    listener: TcpListener,
    store: UserStore,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Serving users API on {}", addr);

    axum::serve(listener, create_app(store))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Users API stopped unexpectedly")
}

pub async fn serve(bind: &str, shutdown: CancellationToken) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Unable to bind {}", bind))?;
    serve_on(listener, UserStore::default(), shutdown).await
}
