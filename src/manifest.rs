use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default manifest name written by the external scanner.
pub const MANIFEST_FILE: &str = "gallery-data.json";

/// Message shown in place of the gallery when the manifest cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Could not load gallery data - run scan.py first.";

/// One date and its images, in manifest order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GalleryEntry {
    pub date: String,
    pub images: Vec<String>,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where the manifest comes from: a local file or an HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    File(PathBuf),
    Url(String),
}

impl ManifestSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            ManifestSource::Url(s.to_string())
        } else {
            ManifestSource::File(PathBuf::from(s))
        }
    }

    /// Directory a rendered page should sit next to, if the source is local.
    pub fn parent_dir(&self) -> Option<&Path> {
        match self {
            ManifestSource::File(p) => p.parent(),
            ManifestSource::Url(_) => None,
        }
    }

    /// Fetch and parse the manifest. URL sources get a fresh cache-busting
    /// parameter on every call.
    pub fn load(&self) -> Result<Vec<GalleryEntry>, LoadError> {
        match self {
            ManifestSource::File(path) => {
                let body = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                parse_manifest(&body)
            }
            ManifestSource::Url(url) => {
                let target = cache_busted(url, chrono::Utc::now().timestamp_millis());
                tracing::debug!(url = %target, "fetching manifest");
                let resp = reqwest::blocking::get(&target).map_err(|source| LoadError::Http {
                    url: url.clone(),
                    source,
                })?;
                if !resp.status().is_success() {
                    return Err(LoadError::Status {
                        url: url.clone(),
                        status: resp.status().as_u16(),
                    });
                }
                let body = resp.text().map_err(|source| LoadError::Http {
                    url: url.clone(),
                    source,
                })?;
                parse_manifest(&body)
            }
        }
    }
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestSource::File(p) => write!(f, "{}", p.display()),
            ManifestSource::Url(u) => f.write_str(u),
        }
    }
}

/// Append a cache-defeating parameter to `url`.
pub fn cache_busted(url: &str, nonce: i64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{nonce}")
}

pub fn parse_manifest(body: &str) -> Result<Vec<GalleryEntry>, LoadError> {
    Ok(serde_json::from_str(body)?)
}
