//! Where geometry documents come from.
//!
//! A `GeometrySource` resolves one document per region id. Two
//! implementations are provided:
//! - `HttpGeometrySource`: `<base><id><suffix>` over HTTP(S)
//! - `FilesystemGeometrySource`: the same naming scheme in a local directory

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use formats::{DocumentError, GeometryDocument};
use foundation::RegionId;

/// Upstream GeoJSON files, one per province.
pub const DEFAULT_GEOJSON_BASE_URL: &str =
    "https://raw.githubusercontent.com/alvarezgarcia/provincias-argentinas-geojson/refs/heads/master/";

pub const DEFAULT_DOCUMENT_SUFFIX: &str = ".json";

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The server answered with a non-success status.
    Status(u16),
    Transport,
    Io,
    Document,
}

/// One region's document could not be retrieved or decoded.
#[derive(Debug)]
pub struct FetchError {
    pub region: RegionId,
    pub location: String,
    pub kind: FetchErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to load {} from {}: {}",
            self.region, self.location, self.message
        )
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl FetchError {
    pub fn new(
        region: &RegionId,
        location: impl Into<String>,
        kind: FetchErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            region: region.clone(),
            location: location.into(),
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    fn document(region: &RegionId, location: &str, err: DocumentError) -> Self {
        Self::new(
            region,
            location,
            FetchErrorKind::Document,
            format!("invalid document: {err}"),
        )
        .with_source(err)
    }
}

/// Trait for geometry document providers.
///
/// Implementations must be `Send + Sync` so a loader can drive several
/// fetches at once. Methods return boxed futures for dyn-compatibility.
pub trait GeometrySource: Send + Sync {
    /// Human-readable location of the document for `region`.
    fn location(&self, region: &RegionId) -> String;

    /// Retrieve and decode the document for `region`. Exactly one attempt.
    fn fetch<'a>(
        &'a self,
        region: &'a RegionId,
    ) -> BoxFuture<'a, Result<GeometryDocument, FetchError>>;
}

impl<T: GeometrySource + ?Sized> GeometrySource for Box<T> {
    fn location(&self, region: &RegionId) -> String {
        (**self).location(region)
    }

    fn fetch<'a>(
        &'a self,
        region: &'a RegionId,
    ) -> BoxFuture<'a, Result<GeometryDocument, FetchError>> {
        (**self).fetch(region)
    }
}

/// HTTP-based source: `GET <base_url><region id><suffix>`.
pub struct HttpGeometrySource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGeometrySource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpGeometrySource {
    fn default() -> Self {
        Self::new(DEFAULT_GEOJSON_BASE_URL)
    }
}

impl GeometrySource for HttpGeometrySource {
    fn location(&self, region: &RegionId) -> String {
        format!("{}{region}{DEFAULT_DOCUMENT_SUFFIX}", self.base_url)
    }

    fn fetch<'a>(
        &'a self,
        region: &'a RegionId,
    ) -> BoxFuture<'a, Result<GeometryDocument, FetchError>> {
        let url = self.location(region);
        Box::pin(async move {
            let resp = self
                .client
                .get(&url)
                .header(reqwest::header::CACHE_CONTROL, "no-store")
                .send()
                .await
                .map_err(|e| {
                    FetchError::new(region, &url, FetchErrorKind::Transport, "HTTP request failed")
                        .with_source(e)
                })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::new(
                    region,
                    &url,
                    FetchErrorKind::Status(status.as_u16()),
                    format!("HTTP error: {status}"),
                ));
            }

            let bytes = resp.bytes().await.map_err(|e| {
                FetchError::new(
                    region,
                    &url,
                    FetchErrorKind::Transport,
                    "failed to read response",
                )
                .with_source(e)
            })?;

            GeometryDocument::from_geojson_slice(&bytes)
                .map_err(|e| FetchError::document(region, &url, e))
        })
    }
}

/// Filesystem-based source: `<root>/<region id><suffix>`.
pub struct FilesystemGeometrySource {
    root: PathBuf,
}

impl FilesystemGeometrySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, region: &RegionId) -> PathBuf {
        self.root.join(format!("{region}{DEFAULT_DOCUMENT_SUFFIX}"))
    }
}

impl GeometrySource for FilesystemGeometrySource {
    fn location(&self, region: &RegionId) -> String {
        self.path_for(region).display().to_string()
    }

    fn fetch<'a>(
        &'a self,
        region: &'a RegionId,
    ) -> BoxFuture<'a, Result<GeometryDocument, FetchError>> {
        let path = self.path_for(region);
        Box::pin(async move {
            let location = path.display().to_string();
            let data = tokio::fs::read(&path).await.map_err(|e| {
                FetchError::new(
                    region,
                    &location,
                    FetchErrorKind::Io,
                    format!("failed to read document: {e}"),
                )
                .with_source(e)
            })?;
            GeometryDocument::from_geojson_slice(&data)
                .map_err(|e| FetchError::document(region, &location, e))
        })
    }
}
