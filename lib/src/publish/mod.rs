//! Publishing a built site to object storage behind a CDN.

#[cfg(feature = "s3")]
mod s3;

#[cfg(feature = "s3")]
pub use s3::S3Sink;

use std::path::Path;

use crate::error::{Result, Chainable};
use crate::fstree::FsTree;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A destination for a built site.
pub trait PublishSink {
    /// Stores the file at `path` in `bucket` under `key`.
    fn put_object(&self, bucket: &str, key: &str, path: &Path, content_type: &str) -> Result<()>;

    /// Finds a distribution with an origin whose domain is `origin_domain`.
    fn find_distribution(&self, origin_domain: &str) -> Result<Option<String>>;

    /// Creates a distribution serving `bucket` from `origin_domain`,
    /// returning its id.
    fn create_distribution(&self, bucket: &str, origin_domain: &str) -> Result<String>;
}

impl<T: PublishSink + ?Sized> PublishSink for &T {
    fn put_object(&self, bucket: &str, key: &str, path: &Path, content_type: &str) -> Result<()> {
        (**self).put_object(bucket, key, path, content_type)
    }

    fn find_distribution(&self, origin_domain: &str) -> Result<Option<String>> {
        (**self).find_distribution(origin_domain)
    }

    fn create_distribution(&self, bucket: &str, origin_domain: &str) -> Result<String> {
        (**self).create_distribution(bucket, origin_domain)
    }
}

/// The domain a CDN origin uses to reach `bucket`.
pub fn origin_domain(bucket: &str) -> String {
    format!("{bucket}.s3.amazonaws.com")
}

/// The content type for `path`, guessed from its extension. Text types are
/// labeled UTF-8.
pub fn content_type(path: &Path) -> String {
    match mime_guess::from_path(path).first_raw() {
        Some(essence) if essence.starts_with("text/") => format!("{essence}; charset=utf-8"),
        Some(essence) => essence.to_string(),
        None => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

/// Uploads every file under `local_dir` to `bucket`, keyed by its
/// `/`-separated path relative to `local_dir`. Returns the keys uploaded.
pub fn upload<S: PublishSink>(sink: S, local_dir: &Path, bucket: &str) -> Result<Vec<String>> {
    tracing::info!("starting deployment to bucket {bucket}");

    let tree = FsTree::build(local_dir)?;
    let mut keys = vec![];
    for entry in tree.files() {
        let key = entry.relative_key();
        let content_type = content_type(&entry.path);
        sink.put_object(bucket, &key, &entry.path, &content_type).chain_with(|| error! {
            "failed to upload file",
            "path" => entry.path.display(),
            "destination" => format!("s3://{bucket}/{key}"),
        })?;

        tracing::info!("uploaded {key} to s3://{bucket}/{key}");
        keys.push(key);
    }

    tracing::info!(objects = keys.len(), "deployment complete");
    Ok(keys)
}

/// Returns the id of the distribution fronting `bucket`, creating one if none
/// exists yet.
pub fn ensure_distribution<S: PublishSink>(sink: S, bucket: &str) -> Result<String> {
    let origin = origin_domain(bucket);
    if let Some(id) = sink.find_distribution(&origin)? {
        tracing::info!("distribution for bucket {bucket} already exists with id {id}");
        return Ok(id);
    }

    let id = sink.create_distribution(bucket, &origin)
        .chain_with(|| error!("failed to create distribution", "bucket" => bucket))?;

    tracing::info!("created distribution {id} for bucket {bucket}");
    Ok(id)
}
