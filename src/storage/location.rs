//! Storage locations (S3, GCS, Azure, local filesystem)

use crate::config::Credentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use datafusion::prelude::SessionContext;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A base location in object storage, parsed from a URL or local path
#[derive(Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base URL, always ending in `/`
    url: Url,
    /// Base path within the store
    prefix: ObjectPath,
}

impl fmt::Debug for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageLocation")
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl StorageLocation {
    /// Parse a location URL
    ///
    /// Supported formats:
    /// - `s3://bucket/path/`, `s3a://bucket/path/`, `s3n://bucket/path/` - AWS S3
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `file:///local/path/`, `/local/path/` or `./path/` - Local filesystem
    ///
    /// Local directories must already exist; see [`Self::parse_or_create`].
    pub fn parse(url: &str, credentials: Option<&Credentials>) -> Result<Self> {
        Self::parse_inner(url, credentials, false)
    }

    /// Parse a location URL, creating local directories as needed
    pub fn parse_or_create(url: &str, credentials: Option<&Credentials>) -> Result<Self> {
        Self::parse_inner(url, credentials, true)
    }

    /// Wrap an existing object store under `url` (for example `memory://input/`)
    pub fn from_store(store: Arc<dyn ObjectStore>, url: &str) -> Result<Self> {
        Self::new(store, directory_url(url)?)
    }

    fn new(store: Arc<dyn ObjectStore>, url: Url) -> Result<Self> {
        let prefix = ObjectPath::from_url_path(url.path())
            .map_err(|e| Error::config(format!("Invalid path in {url}: {e}")))?;
        Ok(Self { store, url, prefix })
    }

    fn parse_inner(url: &str, credentials: Option<&Credentials>, create: bool) -> Result<Self> {
        let scheme = url.split_once("://").map(|(s, _)| s.to_ascii_lowercase());
        match scheme.as_deref() {
            Some("s3" | "s3a" | "s3n") => Self::parse_s3(url, credentials),
            Some("gs") => Self::parse_gcs(url),
            Some("az") => Self::parse_azure(url),
            Some("file") | None => Self::parse_local(url, create),
            Some(other) => Err(Error::config(format!(
                "Unsupported storage scheme '{other}' in {url}"
            ))),
        }
    }

    /// Parse an S3 URL using explicit credentials
    fn parse_s3(url: &str, credentials: Option<&Credentials>) -> Result<Self> {
        let credentials =
            credentials.ok_or_else(|| Error::config_missing("AWS", "AWS_ACCESS_KEY_ID"))?;
        let url = directory_url(url)?;
        let bucket = bucket_of(&url)?;

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_access_key_id(&credentials.access_key_id)
            .with_secret_access_key(&credentials.secret_access_key)
            .with_region(credentials.region_or_default());

        if let Some(endpoint) = &credentials.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create S3 client: {e}")))?;

        Self::new(Arc::new(store), url)
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let url = directory_url(url)?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket_of(&url)?)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Self::new(Arc::new(store), url)
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let url = directory_url(url)?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(bucket_of(&url)?)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Self::new(Arc::new(store), url)
    }

    /// Parse local filesystem path
    fn parse_local(path: &str, create: bool) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        if create {
            std::fs::create_dir_all(path)
                .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;
        } else if !std::path::Path::new(path).is_dir() {
            return Err(Error::source_read(path, "directory does not exist"));
        }

        let absolute = std::fs::canonicalize(path)
            .map_err(|e| Error::config(format!("Failed to resolve {path}: {e}")))?;
        let url = Url::from_directory_path(&absolute)
            .map_err(|()| Error::config(format!("Not an absolute path: {}", absolute.display())))?;

        Self::new(Arc::new(LocalFileSystem::new()), url)
    }

    /// Base URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL of a path relative to this location, trailing `/` preserved
    pub fn url_of(&self, relative: &str) -> String {
        format!("{}{}", self.url, relative.trim_start_matches('/'))
    }

    /// Make this location's store resolvable by `ctx`
    pub fn register(&self, ctx: &SessionContext) {
        ctx.register_object_store(&self.url, Arc::clone(&self.store));
    }

    /// Resolve a path relative to this location
    fn object_path(&self, relative: &str) -> ObjectPath {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.prefix.clone(), |path, segment| path.child(segment))
    }

    /// Strip this location's prefix from an object path
    fn relative_of(&self, path: &ObjectPath) -> String {
        match path.prefix_match(&self.prefix) {
            Some(parts) => parts
                .map(|part| part.as_ref().to_string())
                .collect::<Vec<_>>()
                .join("/"),
            None => path.to_string(),
        }
    }

    /// List all objects below a relative directory, as relative paths sorted
    /// lexically
    pub async fn list(&self, relative_dir: &str) -> Result<Vec<String>> {
        let dir = self.object_path(relative_dir);
        let mut paths: Vec<String> = self
            .store
            .list(Some(&dir))
            .map_ok(|meta| self.relative_of(&meta.location))
            .try_collect()
            .await?;
        paths.sort();
        Ok(paths)
    }

    /// Whether any object exists below a relative directory
    pub async fn has_objects(&self, relative_dir: &str) -> Result<bool> {
        let dir = self.object_path(relative_dir);
        match self.store.list(Some(&dir)).next().await {
            None => Ok(false),
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(e.into()),
        }
    }

    /// Write bytes to an object, returning its URL
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(relative);
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::write(self.url_of(relative), e.to_string()))?;
        Ok(self.url_of(relative))
    }

    /// Delete every object below a relative directory, returning the count
    ///
    /// Deletes the listed locations as returned by the store, so names the
    /// store re-encodes on listing are still removed.
    pub async fn delete_prefix(&self, relative_dir: &str) -> Result<usize> {
        let dir = self.object_path(relative_dir);
        let locations: Vec<ObjectPath> = self
            .store
            .list(Some(&dir))
            .map_ok(|m| m.location)
            .try_collect()
            .await
            .map_err(|e| Error::write(self.url_of(relative_dir), e.to_string()))?;

        for location in &locations {
            if let Err(e) = self.store.delete(location).await {
                let url = self.url_of(&self.relative_of(location));
                return Err(Error::write(url, e.to_string()));
            }
        }
        Ok(locations.len())
    }
}

/// Parse `url` and make sure its path ends in `/`
fn directory_url(url: &str) -> Result<Url> {
    let mut parsed =
        Url::parse(url).map_err(|e| Error::config(format!("Invalid URL {url}: {e}")))?;
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}

/// Bucket or container name of a cloud URL
fn bucket_of(url: &Url) -> Result<&str> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::config(format!("URL has no bucket: {url}")))
}
