//! In-process stand-in for the rule artifact repository

use crate::repository::{RepositorySettings, ARTIFACT_SERVICE_PATH};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fake Nexus answering resolve requests by artifact id
///
/// * [`FakeRepository::MISSING`] - 404
/// * [`FakeRepository::BROKEN`] - 500 with body `boom`
/// * anything else - 200
#[derive(Clone)]
pub struct FakeRepository {
    port: u16,
    hits: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl FakeRepository {
    pub const MISSING: &'static str = "missing-rules";
    pub const BROKEN: &'static str = "broken-rules";

    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let repository = Self {
            port,
            hits: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route(&format!("/{}/resolve", ARTIFACT_SERVICE_PATH), get(resolve))
            .with_state(repository.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        repository
    }

    /// Settings pointing at a port nothing listens on
    pub async fn unreachable_settings() -> RepositorySettings {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        RepositorySettings::new("127.0.0.1", port)
    }

    pub fn settings(&self) -> RepositorySettings {
        RepositorySettings::new("127.0.0.1", self.port)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.queries.lock().unwrap().last().cloned()
    }
}

async fn resolve(
    State(repository): State<FakeRepository>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    repository.hits.fetch_add(1, Ordering::SeqCst);
    let artifact = query.get("a").cloned().unwrap_or_default();
    repository.queries.lock().unwrap().push(query);

    match artifact.as_str() {
        FakeRepository::MISSING => (StatusCode::NOT_FOUND, String::new()),
        FakeRepository::BROKEN => (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
        _ => (StatusCode::OK, "<artifact-resolution/>".to_string()),
    }
}
