#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use csr_tracker_server::{
    config::{AdminSeed, Config},
    db::{self, DbPool},
    routes,
    state::AppState,
};

pub const ADMIN_EMAIL: &str = "admin@demo.com";
pub const ADMIN_PASSWORD: &str = "password123";
pub const JWT_SECRET: &str = "test_secret_key_for_the_csr_tracker";

const BOUNDARY: &str = "csr-test-boundary";

/// Application router over a fresh database in a temp directory, with a logged-in admin token
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub pool: DbPool,
    token: String,
    dir: TempDir,
}

/// Multipart file part
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("csr.db").display());

        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            database_url: database_url.clone(),
            database_max_connections: 5,
            jwt_secret: JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
            upload_dir: dir.path().join("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            admin: AdminSeed {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                name: "Administrator".to_string(),
            },
        };

        let pool = db::init_db_pool(&database_url, 5)
            .await
            .expect("failed to create test database");
        db::seed_admin(&pool, &config.admin)
            .await
            .expect("failed to seed admin");

        let state = AppState::new(config, pool.clone());
        state.uploads.ensure_dir().await.expect("upload dir");

        let mut app = Self {
            router: routes::app(state.clone()),
            state,
            pool,
            token: String::new(),
            dir,
        };

        let response = app
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "seeded admin should log in");
        let body = response_json(response).await;
        app.token = body["token"].as_str().expect("token in login response").to_string();

        app
    }

    /// Bearer token for the seeded admin
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    /// Number of files currently in the upload directory
    pub fn stored_upload_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir()).expect("upload dir").count()
    }

    /// Send a request with an optional JSON body and bearer token
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.router.clone().oneshot(request).await.expect("router response")
    }

    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(&self.token)).await
    }

    /// Send an authenticated multipart form
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<FilePart<'_>>,
    ) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, file)))
            .expect("request");

        self.router.clone().oneshot(request).await.expect("router response")
    }

    /// POST a JSON body and return the parsed response, asserting the status
    pub async fn post_json(&self, uri: &str, body: Value, expected: StatusCode) -> Value {
        let response = self.request_authenticated(Method::POST, uri, Some(body)).await;
        assert_eq!(response.status(), expected, "POST {uri}");
        response_json(response).await
    }

    pub async fn get_json(&self, uri: &str) -> Value {
        let response = self.request_authenticated(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        response_json(response).await
    }

    /// Create a stakeholder through the API and return its id
    pub async fn create_stakeholder(&self, name: &str, branch: &str, default_quantity: i64) -> i64 {
        let body = self
            .post_json(
                "/api/routines/stakeholders",
                json!({
                    "institution_name": name,
                    "branch": branch,
                    "default_quantity": default_quantity,
                    "is_active": true,
                }),
                StatusCode::CREATED,
            )
            .await;
        body["id"].as_i64().expect("stakeholder id")
    }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                file.field, file.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("response body")
        .to_bytes()
        .to_vec()
}

pub async fn response_json(response: Response) -> Value {
    serde_json::from_slice(&response_bytes(response).await).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    String::from_utf8(response_bytes(response).await).expect("utf-8 response")
}
