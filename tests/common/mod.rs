use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

use personnel::config::{Config, LetterConfig};
use personnel::letters::{LetterError, PdfConverter};

pub const ADMIN_EMAIL: &str = "admin@test.com";
pub const ADMIN_PASSWORD: &str = "password123";

pub const COVER_LETTER: &str = "<p>{{ today }}</p>\n<p>Sehr geehrte(r) {{ employee.first_name }} {{ employee.last_name }},</p>\n<p>Abteilung {{ department.name }}</p>";

/// Returns a minimal PDF wrapping the HTML it was given, or fails on demand.
pub struct StubPdf {
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl PdfConverter for StubPdf {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, LetterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LetterError::PdfRender("stub converter failure".to_string()));
        }
        let mut pdf = b"%PDF-1.4\n".to_vec();
        pdf.extend_from_slice(html.as_bytes());
        Ok(pdf)
    }
}

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: std::net::SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub pdf: Arc<StubPdf>,
    pub letters_dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/register"))
            .json(&json!({
                "email": email,
                "username": email.split('@').next().unwrap(),
                "first_name": "Ada",
                "last_name": "Admin",
                "password": password,
            }))
            .send()
            .await
            .expect("register request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Register the bootstrap superuser, return its access token.
    pub async fn bootstrap(&self) -> String {
        let (body, status) = self.register(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::CREATED, "bootstrap register failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Create a plain account as superuser and log in as it.
    pub async fn create_account(&self, token: &str, email: &str) -> (Value, String) {
        let (account, status) = self
            .post_auth(
                "/api/v1/accounts",
                token,
                &json!({
                    "email": email,
                    "username": email.split('@').next().unwrap(),
                    "first_name": "Bea",
                    "last_name": "Basic",
                    "password": "password456",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create account failed: {account}");
        let (login, status) = self.login(email, "password456").await;
        assert_eq!(status, StatusCode::OK, "login failed: {login}");
        (account, login["access_token"].as_str().unwrap().to_string())
    }

    pub async fn create_department(&self, token: &str, name: &str, interval: i32) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/v1/departments",
                token,
                &json!({ "name": name, "reminder_interval": interval }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create department failed: {body}");
        body
    }

    pub fn employee_body(employee_id: &str, department_id: &str) -> Value {
        json!({
            "employee_id": employee_id,
            "first_name": "Anna",
            "last_name": "Berg",
            "gender": "female",
            "date_of_birth": "12.04.1985",
            "date_of_entry": "01.01.2015",
            "department_id": department_id,
        })
    }

    pub async fn create_employee(&self, token: &str, employee_id: &str, department_id: &str) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/v1/employees",
                token,
                &Self::employee_body(employee_id, department_id),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create employee failed: {body}");
        body
    }

    pub async fn create_appointment(&self, token: &str, employee_id: &str, date: &str) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/v1/appointments",
                token,
                &json!({ "employee_id": employee_id, "date": date }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create appointment failed: {body}");
        body
    }

    pub async fn employee(&self, token: &str, id: &str) -> Value {
        let (body, status) = self.get_auth(&format!("/api/v1/employees/{id}"), token).await;
        assert_eq!(status, StatusCode::OK, "get employee failed: {body}");
        body
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_raw(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed")
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database and a working PDF stub.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_pdf(false).await
}

pub async fn spawn_app_with_pdf(fail: bool) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let db_name = format!("personnel_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let letters_dir = tempfile::tempdir().expect("Failed to create letters dir");
    let template_path = letters_dir.path().join("cover_letter.html");
    std::fs::write(&template_path, COVER_LETTER).expect("Failed to write cover letter");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        cors_origins: vec![],
        letters: LetterConfig {
            template_path,
            pdf_command: vec!["false".to_string()],
            pdf_timeout: Duration::from_secs(5),
        },
    };

    let pdf = Arc::new(StubPdf {
        fail,
        calls: AtomicUsize::new(0),
    });
    let app = personnel::build_app_with(pool.clone(), config, pdf.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
        pdf,
        letters_dir,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
