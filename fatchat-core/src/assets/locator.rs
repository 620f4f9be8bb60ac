use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::error::AssetLoadError;

/// Where an attachment lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocator {
    /// `http://` or `https://` URL
    Remote(Url),
    /// Filesystem path, given directly or as a `file://` URL
    Local(PathBuf),
}

impl AssetLocator {
    pub fn parse(input: &str) -> Result<Self, AssetLoadError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AssetLoadError::InvalidLocator("locator is empty".to_string()));
        }

        match Url::parse(trimmed) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(AssetLocator::Remote(url)),
                "file" => url.to_file_path().map(AssetLocator::Local).map_err(|_| {
                    AssetLoadError::InvalidLocator(format!("{trimmed} is not a local file path"))
                }),
                // Windows drive letters parse as one-letter schemes
                scheme if scheme.len() == 1 => Ok(AssetLocator::Local(PathBuf::from(trimmed))),
                other => Err(AssetLoadError::InvalidLocator(format!(
                    "unsupported scheme `{other}`"
                ))),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(AssetLocator::Local(PathBuf::from(trimmed)))
            }
            Err(e) => Err(AssetLoadError::InvalidLocator(format!("{trimmed}: {e}"))),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, AssetLocator::Remote(_))
    }

    /// Last path segment, used as the display name of file attachments
    pub fn file_name(&self) -> Option<String> {
        match self {
            AssetLocator::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string()),
            AssetLocator::Local(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
        }
    }
}

impl FromStr for AssetLocator {
    type Err = AssetLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetLocator::parse(s)
    }
}

impl fmt::Display for AssetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLocator::Remote(url) => write!(f, "{}", url),
            AssetLocator::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
