//! In-process Docker Registry V2 stand-in for tests.
//!
//! Serves canned responses keyed by method and path (including the query
//! string) and records every request it receives.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::ACCEPT;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub accept: Option<String>,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: String,
}

#[derive(Clone, Default)]
struct FakeState {
    routes: Arc<HashMap<(String, String), CannedResponse>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Route table built before the server starts.
#[derive(Default)]
pub struct FakeRegistry {
    routes: HashMap<(String, String), CannedResponse>,
}

impl FakeRegistry {
    /// A registry that answers `GET /v2/` with 200.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.route("GET", "/v2/", StatusCode::OK, "{}");
        registry
    }

    pub fn route(&mut self, method: &str, path: &str, status: StatusCode, body: &str) -> &mut Self {
        self.routes.insert(
            (method.to_string(), path.to_string()),
            CannedResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn catalog(&mut self, repositories: &[&str]) -> &mut Self {
        let body = json!({ "repositories": repositories }).to_string();
        self.route("GET", "/v2/_catalog?n=99999", StatusCode::OK, &body)
    }

    pub fn tags(&mut self, repository: &str, tags: &[&str]) -> &mut Self {
        let body = json!({ "name": repository, "tags": tags }).to_string();
        let path = format!("/v2/{}/tags/list", repository);
        self.route("GET", &path, StatusCode::OK, &body)
    }

    /// Register the manifest and config blob for a tag, and accept its deletion.
    pub fn image(
        &mut self,
        repository: &str,
        tag: &str,
        manifest_digest: &str,
        created: DateTime<Utc>,
    ) -> &mut Self {
        let config_digest = format!("sha256:config-{}-{}", repository.replace('/', "-"), tag);
        let manifest = json!({
            "schemaVersion": 2,
            "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
            "config": {
                "mediaType": "application/vnd.docker.container.image.v1+json",
                "size": 1470,
                "digest": config_digest,
            },
            "layers": [],
        });
        self.routes.insert(
            (
                "GET".to_string(),
                format!("/v2/{}/manifests/{}", repository, tag),
            ),
            CannedResponse {
                status: StatusCode::OK,
                headers: vec![(
                    "Docker-Content-Digest".to_string(),
                    manifest_digest.to_string(),
                )],
                body: manifest.to_string(),
            },
        );

        let blob = json!({ "architecture": "amd64", "created": created.to_rfc3339() }).to_string();
        self.route(
            "GET",
            &format!("/v2/{}/blobs/{}", repository, config_digest),
            StatusCode::OK,
            &blob,
        );
        self.route(
            "DELETE",
            &format!("/v2/{}/manifests/{}", repository, manifest_digest),
            StatusCode::ACCEPTED,
            "",
        )
    }

    pub async fn start(&self) -> RunningRegistry {
        let state = FakeState {
            routes: Arc::new(self.routes.clone()),
            requests: Arc::default(),
        };
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr: SocketAddr = listener.local_addr().expect("listener addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake registry");
        });

        RunningRegistry {
            base_url: format!("http://{addr}"),
            state,
            _handle: handle,
        }
    }
}

pub struct RunningRegistry {
    pub base_url: String,
    state: FakeState,
    _handle: tokio::task::JoinHandle<()>,
}

impl RunningRegistry {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests rendered as "METHOD /path" for compact assertions.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "DELETE")
            .map(|r| r.path)
            .collect()
    }
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);
    format!("http://{addr}")
}

async fn handle(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        accept: headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    match state.routes.get(&(method.to_string(), path)) {
        Some(canned) => {
            let mut builder = Response::builder().status(canned.status);
            for (name, value) in &canned.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.body(Body::from(canned.body.clone())).unwrap()
        }
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from(r#"{"errors":[{"code":"NAME_UNKNOWN"}]}"#))
            .unwrap(),
    }
}
