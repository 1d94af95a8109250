//! Object storage for resume binaries.
//!
//! One bucket, paths of the form `resumes/{owner_id}/{uuid}-{filename}`.
//! Public URLs are derived deterministically from the path, so they stay
//! valid for as long as the referencing row exists.

pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

pub use s3::S3ObjectStorage;

const FALLBACK_FILENAME: &str = "resume.pdf";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write object '{path}': {message}")]
    Write { path: String, message: String },

    #[error("failed to read object '{path}': {message}")]
    Read { path: String, message: String },

    #[error("failed to delete object '{path}': {message}")]
    Delete { path: String, message: String },
}

/// Binary object store. `AppState` carries an `Arc<dyn ObjectStorage>`.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, path: &str, body: Bytes, content_type: &str) -> Result<(), StorageError>;

    async fn get(&self, path: &str) -> Result<Bytes, StorageError>;

    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Publicly dereferenceable URL for `path`.
    fn public_url(&self, path: &str) -> String;
}

/// Builds a fresh, unique object path for an uploaded resume.
pub fn resume_object_path(owner_id: Uuid, filename: &str) -> String {
    format!(
        "resumes/{}/{}-{}",
        owner_id,
        Uuid::new_v4(),
        sanitize_filename(filename)
    )
}

/// Reduces a client-supplied filename to a single safe path segment.
fn sanitize_filename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_control() || c == ':' { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Last segment of an object path, used as the filename when a stored
/// resume is sent back upstream.
pub fn filename_from_path(path: &str) -> &str {
    let segment = path.rsplit('/').next().unwrap_or(path);
    // strip the "{uuid}-" prefix written by `resume_object_path`
    match (segment.get(..36), segment.get(36..37), segment.get(37..)) {
        (Some(id), Some("-"), Some(rest)) if !rest.is_empty() && Uuid::parse_str(id).is_ok() => {
            rest
        }
        _ => segment,
    }
}
