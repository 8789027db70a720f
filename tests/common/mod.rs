//! Common test utilities for E2E tests

#![allow(dead_code)]

use lendauth::{AppState, config};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "test-token-secret-at-least-32-bytes!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a test server backed by SQLite
    pub async fn new() -> Self {
        Self::with_backend(config::StorageBackend::Sqlite).await
    }

    /// Create a test server backed by the given storage backend
    pub async fn with_backend(backend: config::StorageBackend) -> Self {
        // Create temporary directory for test storage
        let temp_dir = TempDir::new().unwrap();

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                cors_origin: "http://localhost:3000".to_string(),
            },
            storage: config::StorageConfig {
                backend,
                sqlite_path: temp_dir.path().join("test.db"),
                json_dir: temp_dir.path().join("json"),
            },
            auth: config::AuthConfig {
                token_secret: TEST_SECRET.to_string(),
                token_ttl_seconds: 3600,
                sweep_interval_seconds: 0,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = lendauth::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST /register and return the response
    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/register"))
            .json(&json!({
                "email": email,
                "password": password,
                "firstname": "A",
                "lastname": "B",
            }))
            .send()
            .await
            .unwrap()
    }

    /// POST /login and return the response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Register and log in, returning the issued token
    pub async fn register_and_login(&self, email: &str, password: &str) -> String {
        assert_eq!(self.register(email, password).await.status(), 200);
        let response = self.login(email, password).await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// GET `path` with a bearer token
    pub async fn get_with_token(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .unwrap()
    }

    /// POST /logout with a bearer token
    pub async fn logout(&self, token: &str) -> reqwest::Response {
        self.client
            .post(self.url("/logout"))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .unwrap()
    }
}
