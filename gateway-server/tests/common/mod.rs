//! Common test utilities and fixtures.

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use gateway_core::domain::program::Program;
use gateway_server::auth::TokenTable;
use gateway_server::config::ApiToken;
use gateway_server::repository::MemoryProgramRepository;
use gateway_server::storage::FilesystemStorage;
use gateway_server::{AppState, Pagination, create_router};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const FIXTURE_PROGRAM_ID: &str = "1a7947f9-6ae8-4e3d-ac1e-e7d608deec82";
pub const TEST_USER: &str = "test_user";
pub const TEST_TOKEN: &str = "test-user-token";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a server with one fixture program owned by `test_user`.
    pub async fn new() -> Self {
        Self::with_pagination(Pagination::default()).await
    }

    pub async fn with_pagination(pagination: Pagination) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage = FilesystemStorage::new(temp_dir.path().join("artifacts"))
            .await
            .expect("Failed to create artifact storage");

        let tokens = TokenTable::new(&[ApiToken {
            username: TEST_USER.to_string(),
            token: TEST_TOKEN.to_string(),
        }]);

        let state = AppState::new(
            Arc::new(MemoryProgramRepository::new()),
            Arc::new(storage),
            tokens,
            pagination,
        );

        let server = Self {
            router: create_router(state.clone(), 1024 * 1024),
            state,
            temp_dir,
        };
        server.insert_fixture_program().await;
        server
    }

    async fn insert_fixture_program(&self) {
        let id = Uuid::parse_str(FIXTURE_PROGRAM_ID).unwrap();
        let program = Program {
            id,
            title: "Fixture program".to_string(),
            description: Some("Loaded before every test".to_string()),
            entrypoint: "main.py".to_string(),
            working_dir: "./".to_string(),
            version: "0.0.1".to_string(),
            artifact: Program::artifact_key(id),
            dependencies: vec![],
            env_vars: BTreeMap::new(),
            arguments: BTreeMap::new(),
            tags: vec!["fixture".to_string()],
            public: true,
            owner: TEST_USER.to_string(),
            created_at: Utc::now() - chrono::Duration::days(1),
        };

        self.state
            .artifacts
            .put(&program.artifact, Bytes::from(artifact_tar()))
            .await
            .expect("Failed to store fixture artifact");
        self.state
            .programs
            .insert(&program)
            .await
            .expect("Failed to insert fixture program");
    }

    pub async fn program_count(&self) -> u64 {
        self.state.programs.count().await.unwrap()
    }

    /// Send a request and collect the raw response body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    /// Send a JSON (or bodiless) request and decode the JSON response.
    pub async fn json_request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        auth_token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = auth_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let (status, bytes) = self.send(builder.body(body).unwrap()).await;
        (status, decode_json(&bytes))
    }

    /// POST a multipart form.
    pub async fn multipart_request(
        &self,
        uri: &str,
        form: MultipartBody,
        auth_token: Option<&str>,
    ) -> (StatusCode, Bytes) {
        let (content_type, body) = form.finish();
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", content_type);

        if let Some(token) = auth_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

#[allow(dead_code)]
pub fn decode_json(bytes: &[u8]) -> serde_json::Value {
    if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap_or(serde_json::Value::Null)
    }
}

/// Failed field names of a validation response, in response order.
#[allow(dead_code)]
pub fn failed_fields(bytes: &[u8]) -> Vec<String> {
    let errors: gateway_core::dto::errors::FieldErrors =
        serde_json::from_slice(bytes).expect("Response is not a field error map");
    errors.fields().map(str::to_string).collect()
}

/// A small valid tar archive.
#[allow(dead_code)]
pub fn artifact_tar() -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    let content = b"print('hello')\n";
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "program.py", &content[..])
        .unwrap();
    builder.into_inner().unwrap()
}

/// Hand-built multipart/form-data body.
#[allow(dead_code)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("gateway-test-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                self.boundary, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Content-Type header value and encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// The multipart fields of a complete, valid program.
#[allow(dead_code)]
pub fn program_form() -> MultipartBody {
    MultipartBody::new()
        .text("title", "Awesome program")
        .text("description", "Awesome program description")
        .text("entrypoint", "program.py")
        .text("working_dir", "./")
        .text("version", "0.0.1")
        .text("public", "True")
}
