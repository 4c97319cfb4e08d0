//! Object storage upload.
//!
//! [`CosUploader`] PUTs files through the S3-compatible API of Tencent COS,
//! signing each request with AWS Signature Version 4.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::StorageConfig;
use crate::error::UploadError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Characters left unescaped in a key segment.
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Public object URL.
    pub url: String,
    /// Object key.
    pub key: String,
}

/// A place card images can be uploaded to.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `path` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the store rejects it.
    async fn put_file(&self, path: &Path, key: &str) -> Result<UploadResult, UploadError>;
}

/// MIME type for an image path, by extension.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac(key: &[u8], data: &str) -> Result<Vec<u8>, UploadError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| UploadError::Signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Access keys and region used to sign requests.
#[derive(Clone)]
pub struct Credentials {
    secret_id: String,
    secret_key: String,
    region: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

impl Credentials {
    /// Create credentials.
    #[must_use]
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            region: region.into(),
        }
    }

    /// `Authorization` header value for an unsigned-query PUT.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Signing`] if an HMAC key is rejected.
    pub fn authorize_put(
        &self,
        host: &str,
        canonical_uri: &str,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<String, UploadError> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let canonical_request = format!(
            "PUT\n{canonical_uri}\n\nhost:{host}\nx-amz-content-sha256:{payload_hash}\n\
             x-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{payload_hash}"
        );
        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let k_date = hmac(format!("AWS4{}", self.secret_key).as_bytes(), &date)?;
        let k_region = hmac(&k_date, &self.region)?;
        let k_service = hmac(&k_region, SERVICE)?;
        let k_signing = hmac(&k_service, "aws4_request")?;
        let signature = hex::encode(hmac(&k_signing, &string_to_sign)?);

        Ok(format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            self.secret_id
        ))
    }
}

/// Uploader for Tencent COS (or any S3-compatible store).
#[derive(Debug, Clone)]
pub struct CosUploader {
    http: Client,
    credentials: Credentials,
    bucket: String,
    region: String,
    endpoint: Option<Url>,
    missing: Option<&'static str>,
}

impl CosUploader {
    /// Create an uploader from configuration.
    ///
    /// Missing settings are only logged here. [`ObjectStore::put_file`]
    /// reports them, so a compile fails at the upload stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &StorageConfig) -> Result<Self, UploadError> {
        let missing = config.missing();
        if !missing.is_empty() {
            warn!(?missing, "Object storage is not fully configured");
        }
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        let region = value(&config.region);

        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(|e| Url::parse(e.trim_end_matches('/')))
            .transpose()
            .map_err(|e| UploadError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .user_agent(concat!("card-compiler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            credentials: Credentials::new(
                value(&config.secret_id),
                value(&config.secret_key),
                region.clone(),
            ),
            bucket: value(&config.bucket),
            region,
            endpoint,
            missing: missing.first().copied(),
        })
    }

    /// Escaped request path for `key`.
    fn canonical_uri(&self, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        if let Some(endpoint) = &self.endpoint {
            let base = endpoint.path().trim_end_matches('/');
            format!("{base}/{}/{encoded}", self.bucket)
        } else {
            format!("/{encoded}")
        }
    }

    /// Public URL of the object stored under `key`.
    ///
    /// Virtual-host style by default, path style when an endpoint is set.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidUrl`] if the result does not parse.
    pub fn object_url(&self, key: &str) -> Result<Url, UploadError> {
        let path = self.canonical_uri(key);
        let raw = if let Some(endpoint) = &self.endpoint {
            let mut origin = endpoint.origin().ascii_serialization();
            origin.push_str(&path);
            origin
        } else {
            format!(
                "https://{}.cos.{}.myqcloud.com{path}",
                self.bucket, self.region
            )
        };
        Url::parse(&raw).map_err(|e| UploadError::InvalidUrl(e.to_string()))
    }
}

fn host_header(url: &Url) -> Result<String, UploadError> {
    let host = url
        .host_str()
        .ok_or_else(|| UploadError::InvalidUrl(format!("{url} has no host")))?;
    Ok(url
        .port()
        .map_or_else(|| host.to_string(), |port| format!("{host}:{port}")))
}

#[async_trait]
impl ObjectStore for CosUploader {
    async fn put_file(&self, path: &Path, key: &str) -> Result<UploadResult, UploadError> {
        if let Some(name) = self.missing {
            return Err(UploadError::NotConfigured(name));
        }
        let body = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: PathBuf::from(path),
            source,
        })?;

        let url = self.object_url(key)?;
        let host = host_header(&url)?;
        let payload_hash = sha256_hex(&body);
        let now = Utc::now();
        let authorization =
            self.credentials
                .authorize_put(&host, &self.canonical_uri(key), &payload_hash, now)?;

        debug!(%url, bytes = body.len(), "Uploading object");
        let response = self
            .http
            .put(url.clone())
            .header(HOST, host)
            .header(CONTENT_TYPE, content_type_for(path))
            .header("x-amz-content-sha256", payload_hash)
            .header("x-amz-date", now.format("%Y%m%dT%H%M%SZ").to_string())
            .header(AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(%url, key, "Uploaded object");
        Ok(UploadResult {
            url: url.to_string(),
            key: key.to_string(),
        })
    }
}
