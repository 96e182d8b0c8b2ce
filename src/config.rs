use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub letters: LetterConfig,
}

#[derive(Debug, Clone)]
pub struct LetterConfig {
    /// Raw cover-letter template file.
    pub template_path: PathBuf,
    /// Converter program followed by its arguments. Reads HTML on stdin, writes PDF on stdout.
    pub pdf_command: Vec<String>,
    pub pdf_timeout: Duration,
}

impl Default for LetterConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("letters/cover_letter.html"),
            pdf_command: split_command(DEFAULT_PDF_COMMAND),
            pdf_timeout: Duration::from_secs(30),
        }
    }
}

const DEFAULT_PDF_COMMAND: &str = "wkhtmltopdf --quiet - -";

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("PERSONNEL_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PERSONNEL_HOST: {e}"))?;

        let port: u16 = env_or("PERSONNEL_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid PERSONNEL_PORT: {e}"))?;

        let max_body_size: usize = env_or("PERSONNEL_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid PERSONNEL_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("PERSONNEL_LOG_LEVEL", "info");

        let cors_origins: Vec<String> = env_or("PERSONNEL_CORS_ORIGINS", "")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let pdf_command = split_command(&env_or("PERSONNEL_PDF_COMMAND", DEFAULT_PDF_COMMAND));
        if pdf_command.is_empty() {
            return Err("PERSONNEL_PDF_COMMAND must not be empty".to_string());
        }

        let pdf_timeout_secs: u64 = env_or("PERSONNEL_PDF_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid PERSONNEL_PDF_TIMEOUT_SECS: {e}"))?;

        let letters = LetterConfig {
            template_path: PathBuf::from(env_or(
                "PERSONNEL_TEMPLATE_PATH",
                "letters/cover_letter.html",
            )),
            pdf_command,
            pdf_timeout: Duration::from_secs(pdf_timeout_secs),
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            max_body_size,
            log_level,
            cors_origins,
            letters,
        })
    }
}

fn split_command(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
