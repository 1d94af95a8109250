mod applications;
mod chat;
mod clients;
mod config;
mod db;
mod documents;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::applications::repository::PgApplicationRepository;
use crate::clients::{JobSearchClient, LocalPdfTextExtractor, ResumeApiClient, TextExtractor};
use crate::config::{Config, PdfTextExtraction};
use crate::db::{create_pool, run_migrations};
use crate::documents::cover_letters::PgCoverLetterRepository;
use crate::documents::resumes::{PgResumeRepository, ResumeStore};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3ObjectStorage;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.rust_log);

    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    let state = build_state(&config, db).await?;
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise this crate logs at `default_level`.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={default_level}", env!("CARGO_CRATE_NAME")))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wires every port to its production backend.
async fn build_state(config: &Config, db: PgPool) -> Result<AppState> {
    let storage = Arc::new(S3ObjectStorage::new(
        s3_client(config).await,
        config.s3_bucket.clone(),
        config.s3_public_url.clone(),
    ));
    info!("Object storage: bucket {} at {}", config.s3_bucket, config.s3_endpoint);

    let resume_api = Arc::new(ResumeApiClient::new(
        &config.endpoints.resume_api,
        config.upstream_timeout,
    )?);
    let job_board = Arc::new(JobSearchClient::new(
        &config.endpoints.job_search_api,
        config.upstream_timeout,
    )?);
    info!(
        "Upstream APIs: resume {} / job search {} (timeout {:?})",
        config.endpoints.resume_api, config.endpoints.job_search_api, config.upstream_timeout
    );

    let text_extractor: Arc<dyn TextExtractor> = match config.pdf_text_extraction {
        PdfTextExtraction::Remote => resume_api.clone() as Arc<dyn TextExtractor>,
        PdfTextExtraction::Local => Arc::new(LocalPdfTextExtractor),
    };
    info!("PDF text extraction: {:?}", config.pdf_text_extraction);

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("Resume assistant model: {}", llm_client::MODEL);

    Ok(AppState {
        resumes: ResumeStore::new(
            Arc::new(PgResumeRepository::new(db.clone())),
            storage,
            resume_api.clone(),
        ),
        cover_letters: Arc::new(PgCoverLetterRepository::new(db.clone())),
        applications: Arc::new(PgApplicationRepository::new(db)),
        optimizer: resume_api.clone(),
        cover_letter_generator: resume_api,
        job_board,
        text_extractor,
        llm: Arc::new(llm),
    })
}

/// S3 client for MinIO (local) or AWS (production), path-style addressing.
async fn s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "jobtrail-env",
    );

    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
