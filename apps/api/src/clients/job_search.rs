use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ensure_success, ClientError, JobBoard, JobListing, JobSearchQuery, ParsedJob};

const PARSE_URL_PATH: &str = "/parse-job-url";
const SEARCH_PATH: &str = "/search";

/// Client for the job-search API.
#[derive(Clone)]
pub struct JobSearchClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs: Vec<JobListing>,
}

impl JobSearchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn search_params(query: &JobSearchQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("query", query.query.trim().to_string())];
    if let Some(location) = query.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        params.push(("location", location.to_string()));
    }
    params.push(("page", query.page.max(1).to_string()));
    params
}

#[async_trait]
impl JobBoard for JobSearchClient {
    async fn parse_job_url(&self, url: &str) -> Result<ParsedJob, ClientError> {
        let form = Form::new().text("url", url.to_string());
        let response = self
            .client
            .post(format!("{}{}", self.base_url, PARSE_URL_PATH))
            .multipart(form)
            .send()
            .await?;
        let parsed = ensure_success(response).await?.json::<ParsedJob>().await?;

        debug!(
            "Parsed job URL {url}: title={:?} company={:?}",
            parsed.title, parsed.company
        );
        Ok(parsed)
    }

    async fn search_jobs(&self, query: &JobSearchQuery) -> Result<Vec<JobListing>, ClientError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .query(&search_params(query))
            .send()
            .await?;
        let body = ensure_success(response).await?.json::<SearchResponse>().await?;
        Ok(body.jobs)
    }
}
