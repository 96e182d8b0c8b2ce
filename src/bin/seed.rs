use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use personnel::mock::{MockGenerator, MOCK_DEPARTMENTS};

const USAGE: &str = "
Usage:
    seed [verbose] <mock_1> [<mock_2> ...]

Options:
    mock-departments     Create the mock departments.
    mock-employees       Create mock employees spread over the existing departments.
    help                 Show this help page.

    verbose              Log every response body.

Environment:
    PERSONNEL_BASE_URL       default http://127.0.0.1:8000
    PERSONNEL_SEED_EMAIL     account used to log in
    PERSONNEL_SEED_PASSWORD
    PERSONNEL_SEED_EMPLOYEES number of employees to create, default 20
";

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct DepartmentRef {
    id: Uuid,
    name: String,
}

#[derive(Deserialize)]
struct EmployeeRef {
    employee_id: String,
}

struct Seeder {
    client: Client,
    base_url: String,
    token: String,
    verbose: bool,
}

impl Seeder {
    async fn login(base_url: String, verbose: bool) -> Result<Self> {
        let email = std::env::var("PERSONNEL_SEED_EMAIL").context("PERSONNEL_SEED_EMAIL is not set")?;
        let password =
            std::env::var("PERSONNEL_SEED_PASSWORD").context("PERSONNEL_SEED_PASSWORD is not set")?;

        let client = Client::new();
        let response = client
            .post(format!("{base_url}/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("login request failed")?;
        if !response.status().is_success() {
            bail!("login as {email} failed with {}", response.status());
        }
        let login: LoginResponse = response.json().await?;

        Ok(Self {
            client,
            base_url,
            token: login.access_token,
            verbose,
        })
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<StatusCode> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if self.verbose {
            tracing::info!("POST {path} -> {status}: {text}");
        }
        if status.is_server_error() {
            bail!("POST {path} failed with {status}: {text}");
        }
        Ok(status)
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn mock_departments(&self) -> Result<()> {
        let mut mock = MockGenerator::from_entropy(1);
        for _ in MOCK_DEPARTMENTS {
            let department = mock.next_department();
            let status = self
                .post("/api/v1/departments", &serde_json::to_value(&department)?)
                .await?;
            if status == StatusCode::CREATED {
                tracing::info!("Created department {}", department.name);
            } else {
                tracing::warn!("Department {} not created ({status})", department.name);
            }
        }
        Ok(())
    }

    async fn mock_employees(&self, count: usize) -> Result<()> {
        let departments: Vec<DepartmentRef> = self.get("/api/v1/departments").await?;
        if departments.is_empty() {
            bail!("no departments exist yet, run mock-departments first");
        }

        let existing: Vec<EmployeeRef> = self.get("/api/v1/employees").await?;
        let first_number = existing
            .iter()
            .filter_map(|e| e.employee_id.strip_prefix('E')?.parse::<u32>().ok())
            .max()
            .map_or(1, |n| n + 1);

        let mut mock = MockGenerator::from_entropy(first_number);
        for i in 0..count {
            let department = &departments[i % departments.len()];
            let employee = mock.next_employee(department.id);
            let status = self
                .post("/api/v1/employees", &serde_json::to_value(&employee)?)
                .await?;
            if status == StatusCode::CREATED {
                tracing::info!(
                    "Created employee {} {} in {}",
                    employee.employee_id,
                    employee.last_name,
                    department.name
                );
            } else {
                tracing::warn!("Employee {} not created ({status})", employee.employee_id);
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut options: Vec<String> = std::env::args().skip(1).collect();
    if options.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }

    let verbose = options.iter().any(|o| o == "verbose");
    options.retain(|o| o != "verbose");

    if let Some(unknown) = options
        .iter()
        .find(|o| !matches!(o.as_str(), "mock-departments" | "mock-employees" | "help"))
    {
        eprintln!("Unknown mock option {unknown}\n{USAGE}");
        std::process::exit(1);
    }
    if options.iter().any(|o| o == "help") {
        println!("{USAGE}");
        options.retain(|o| o != "help");
        if options.is_empty() {
            return Ok(());
        }
    }

    let base_url = std::env::var("PERSONNEL_BASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
        .trim_end_matches('/')
        .to_string();
    let employee_count: usize = std::env::var("PERSONNEL_SEED_EMPLOYEES")
        .unwrap_or_else(|_| "20".to_string())
        .parse()
        .context("Invalid PERSONNEL_SEED_EMPLOYEES")?;

    let seeder = Seeder::login(base_url, verbose).await?;
    for option in &options {
        match option.as_str() {
            "mock-departments" => seeder.mock_departments().await?,
            "mock-employees" => seeder.mock_employees(employee_count).await?,
            _ => {}
        }
    }
    Ok(())
}
