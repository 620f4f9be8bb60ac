use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use url::Url;

use super::locator::AssetLocator;
use crate::config::AssetConfig;
use crate::error::AssetLoadError;
use crate::models::{Asset, AssetKind, FileAsset, PhotoAsset};

const MAX_REDIRECTS: usize = 3;
const FALLBACK_FILE_NAME: &str = "attachment";

/// Raw bytes plus whatever metadata the source gave us
struct Fetched {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

/// Fetches attachments from URLs or local paths and turns them into [`Asset`]s.
///
/// Cheap to clone; clones share one HTTP connection pool.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    client: reqwest::Client,
    config: AssetConfig,
}

impl AssetLoader {
    pub fn new(config: AssetConfig) -> Result<Self, AssetLoadError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AssetLoadError::AssetUnreachable(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Reject locators this loader will never fetch, without doing any I/O
    pub fn check_locator(&self, locator: &AssetLocator) -> Result<(), AssetLoadError> {
        match locator {
            AssetLocator::Remote(url)
                if url.scheme() != "https" && !self.config.allow_insecure_http =>
            {
                Err(AssetLoadError::InvalidLocator(
                    "Only HTTPS URLs are supported".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Fetch and decode the asset at `locator` as `kind`, bounded by the configured timeout
    pub async fn load(
        &self,
        kind: AssetKind,
        locator: &AssetLocator,
    ) -> Result<Asset, AssetLoadError> {
        if !kind.expects_asset() {
            return Err(AssetLoadError::NoAttachmentExpected);
        }
        self.check_locator(locator)?;

        match tokio::time::timeout(self.config.timeout, self.load_inner(kind, locator)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(locator = %locator, timeout = ?self.config.timeout, "Asset load timed out");
                Err(AssetLoadError::Timeout(self.config.timeout))
            }
        }
    }

    async fn load_inner(
        &self,
        kind: AssetKind,
        locator: &AssetLocator,
    ) -> Result<Asset, AssetLoadError> {
        let fetched = match locator {
            AssetLocator::Remote(url) => self.fetch_remote(url).await?,
            AssetLocator::Local(path) => self.read_local(path).await?,
        };
        debug!(locator = %locator, size = fetched.bytes.len(), "Asset fetched");

        match kind {
            AssetKind::Photo => decode_photo(locator.clone(), fetched.bytes).await,
            AssetKind::File => {
                let file_name = locator
                    .file_name()
                    .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
                Ok(Asset::File(FileAsset::new(
                    locator.clone(),
                    file_name,
                    fetched.content_type,
                    fetched.bytes,
                )))
            }
            AssetKind::None => Err(AssetLoadError::NoAttachmentExpected),
        }
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Fetched, AssetLoadError> {
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(AssetLoadError::AssetUnreachable(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let limit = self.config.max_asset_bytes;
        if let Some(size) = response.content_length() {
            if size > limit {
                return Err(AssetLoadError::AssetTooLarge { size, limit });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        // Content-Length can be missing or wrong, so count as we go
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.request_error(e))? {
            let size = (bytes.len() + chunk.len()) as u64;
            if size > limit {
                return Err(AssetLoadError::AssetTooLarge { size, limit });
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(Fetched {
            bytes,
            content_type,
        })
    }

    async fn read_local(&self, path: &Path) -> Result<Fetched, AssetLoadError> {
        let unreachable =
            |e: std::io::Error| AssetLoadError::AssetUnreachable(format!("{}: {}", path.display(), e));

        let metadata = tokio::fs::metadata(path).await.map_err(unreachable)?;
        if !metadata.is_file() {
            return Err(AssetLoadError::AssetUnreachable(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let limit = self.config.max_asset_bytes;
        if metadata.len() > limit {
            return Err(AssetLoadError::AssetTooLarge {
                size: metadata.len(),
                limit,
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(unreachable)?;
        Ok(Fetched {
            bytes,
            content_type: None,
        })
    }

    fn request_error(&self, e: reqwest::Error) -> AssetLoadError {
        if e.is_timeout() {
            AssetLoadError::Timeout(self.config.timeout)
        } else {
            AssetLoadError::AssetUnreachable(e.to_string())
        }
    }
}

/// Decoding is CPU bound, keep it off the async workers
async fn decode_photo(source: AssetLocator, bytes: Vec<u8>) -> Result<Asset, AssetLoadError> {
    let decoded = tokio::task::spawn_blocking(move || {
        let format = image::guess_format(&bytes)
            .map_err(|e| AssetLoadError::AssetDecodeError(format!("unrecognized image data: {}", e)))?;
        let image = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| AssetLoadError::AssetDecodeError(e.to_string()))?;
        Ok::<_, AssetLoadError>((format, image.to_rgba8()))
    })
    .await
    .map_err(|e| AssetLoadError::AssetDecodeError(format!("decoder task failed: {}", e)))??;

    let (format, pixels) = decoded;
    Ok(Asset::Photo(PhotoAsset::new(source, format, pixels)))
}
