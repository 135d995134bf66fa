//! Href classification and byte-range size probes
//!
//! Hrefs may be local paths, `file://` URLs, HTTP(S) URLs or cloud object
//! URLs. GDAL reaches remote files through its `/vsi*` virtual file systems;
//! sizes of HTTP files come from a one-byte range request.

use crate::data_source::SizeProbe;
use reqwest::header::{HeaderName, CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use std::{fs, path::PathBuf};
use tracing::debug;
use url::Url;

/// Where an href points to
#[derive(Debug, Clone, PartialEq)]
pub enum HrefLocation {
    /// Local filesystem path
    Local(PathBuf),
    /// HTTP(S) URL
    Http(String),
    /// Object store URL (`s3://`, `gs://`, `az://`)
    Cloud { scheme: String, bucket: String, key: String },
}

impl HrefLocation {
    pub fn parse(href: &str) -> Self {
        match Url::parse(href) {
            // single letter schemes are Windows drive letters
            Ok(url) if url.scheme().len() > 1 => match url.scheme() {
                "http" | "https" => HrefLocation::Http(href.to_string()),
                "file" => url
                    .to_file_path()
                    .map(HrefLocation::Local)
                    .unwrap_or_else(|_| HrefLocation::Local(PathBuf::from(url.path()))),
                scheme => HrefLocation::Cloud {
                    scheme: scheme.to_string(),
                    bucket: url.host_str().unwrap_or_default().to_string(),
                    key: url.path().trim_start_matches('/').to_string(),
                },
            },
            _ => HrefLocation::Local(PathBuf::from(href)),
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, HrefLocation::Local(_))
    }

    /// Path GDAL can open for this location
    pub fn gdal_path(&self) -> String {
        match self {
            HrefLocation::Local(path) => path.to_string_lossy().to_string(),
            HrefLocation::Http(url) => format!("/vsicurl/{}", url),
            HrefLocation::Cloud { scheme, bucket, key } => {
                let vsi = match scheme.as_str() {
                    "s3" => "vsis3",
                    "gs" => "vsigs",
                    "az" | "abfs" => "vsiaz",
                    other => other,
                };
                format!("/{}/{}/{}", vsi, bucket, key)
            }
        }
    }
}

/// Path GDAL can open for `href`
pub fn gdal_path(href: &str) -> String {
    HrefLocation::parse(href).gdal_path()
}

/// Total length from a `Content-Range` header value such as `bytes 0-0/1234`
pub fn content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

/// [`SizeProbe`] for local files and HTTP(S) URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct HrefSizeProbe;

impl SizeProbe for HrefSizeProbe {
    fn size(&self, href: &str) -> Option<u64> {
        let result = match HrefLocation::parse(href) {
            HrefLocation::Local(path) => fs::metadata(&path).map(|m| m.len()).map_err(|e| e.to_string()),
            HrefLocation::Http(url) => probe_http_size(&url),
            HrefLocation::Cloud { scheme, .. } => Err(format!("no size probe for '{}' URLs", scheme)),
        };

        match result {
            Ok(size) => Some(size),
            Err(e) => {
                debug!("size of {} unavailable: {}", href, e);
                None
            }
        }
    }
}

fn probe_http_size(url: &str) -> Result<u64, String> {
    let client = reqwest::blocking::Client::builder()
        .build()
        .map_err(|e| e.to_string())?;
    let response = client
        .get(url)
        .header(RANGE, "bytes=0-0")
        .send()
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("HTTP status {}", response.status()));
    }

    let header = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    // a server that ignores the range answers 200 with the full length
    if let Some(total) = header(CONTENT_RANGE).as_deref().and_then(content_range_total) {
        return Ok(total);
    }
    header(CONTENT_LENGTH)
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| "response carries neither Content-Range nor Content-Length".to_string())
}
