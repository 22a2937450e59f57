//! Common test utilities for E2E tests

#![allow(dead_code)]

use hackatweet::{AppState, config};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// Credentials returned by signup
pub struct TestUser {
    pub username: String,
    pub token: String,
    pub user_id: String,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            database: config::DatabaseConfig {
                url: format!("sqlite://{}?mode=rwc", db_path.display()),
                max_connections: 5,
            },
            accounts: config::AccountsConfig {
                default_avatar: config::DEFAULT_AVATAR_URL.to_string(),
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

        let app = hackatweet::build_router(state.clone());

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

    /// Sign up `username` with a fixed password
    pub async fn signup(&self, username: &str) -> TestUser {
        let response = self
            .client
            .post(self.url("/users/signup"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        TestUser {
            username: username.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
            user_id: body["userId"].as_str().unwrap().to_string(),
        }
    }

    /// Post a tweet and return its JSON
    pub async fn post_tweet(&self, token: &str, content: &str) -> Value {
        let response = self
            .client
            .post(self.url("/tweets"))
            .json(&json!({ "content": content, "token": token }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        body["tweet"].clone()
    }

    /// GET `path` and return status plus JSON body
    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}
