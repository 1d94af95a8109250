use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base used to derive public object URLs. Defaults to `s3_endpoint`.
    pub s3_public_url: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub endpoints: ApiEndpoints,
    pub upstream_timeout: Duration,
    pub pdf_text_extraction: PdfTextExtraction,
    pub port: u16,
    pub rust_log: String,
}

/// Base URLs of the two upstream API families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub job_search_api: String,
    pub resume_api: String,
}

impl ApiEndpoints {
    pub fn new(job_search_api: &str, resume_api: &str) -> Self {
        Self {
            job_search_api: normalize_base_url(job_search_api),
            resume_api: normalize_base_url(resume_api),
        }
    }

    /// Routes both API families through a local development proxy.
    pub fn with_proxy(self, proxy: Option<&str>) -> Self {
        match proxy.map(str::trim).filter(|p| !p.is_empty()) {
            Some(proxy) => Self::new(proxy, proxy),
            None => self,
        }
    }
}

/// Where PDF text extraction runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PdfTextExtraction {
    /// Upstream `/extract-text` endpoint on the resume API.
    #[default]
    Remote,
    /// In-process via `pdf-extract`.
    Local,
}

impl FromStr for PdfTextExtraction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => bail!("PDF_TEXT_EXTRACTION must be 'remote' or 'local', got '{other}'"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_endpoint = require_env("S3_ENDPOINT")?;
        let endpoints = ApiEndpoints::new(
            &require_env("JOB_SEARCH_API_URL")?,
            &require_env("RESUME_API_URL")?,
        )
        .with_proxy(std::env::var("UPSTREAM_PROXY_URL").ok().as_deref());

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_public_url: std::env::var("S3_PUBLIC_URL")
                .map(|url| normalize_base_url(&url))
                .unwrap_or_else(|_| normalize_base_url(&s3_endpoint)),
            s3_endpoint,
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            endpoints,
            upstream_timeout: Duration::from_secs(
                std::env::var("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse::<u64>()
                    .context("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            pdf_text_extraction: std::env::var("PDF_TEXT_EXTRACTION")
                .map(|v| v.parse())
                .unwrap_or(Ok(PdfTextExtraction::Remote))?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
