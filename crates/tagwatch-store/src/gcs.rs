//! Google Cloud Storage version source
//!
//! Reads objects through the JSON API media endpoint:
//!
//! ```text
//! GET {endpoint}/storage/v1/b/{bucket}/o/{object}?alt=media
//! ```

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;

use crate::token::{EMULATOR_HOST_ENV, TokenSource};
use crate::{Error, Result, VersionSource};

/// Public Cloud Storage endpoint
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Connection options for [`GcsVersionSource`].
#[derive(Debug, Clone)]
pub struct GcsOptions {
    /// Base URL of the JSON API
    pub endpoint: String,
    /// Project billed for requester-pays buckets
    pub project: Option<String>,
    /// Bearer token source
    pub tokens: TokenSource,
    /// Whole-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for GcsOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project: None,
            tokens: TokenSource::MetadataServer,
            timeout: None,
        }
    }
}

impl GcsOptions {
    /// Options derived from the process environment.
    ///
    /// Honors `STORAGE_EMULATOR_HOST` the same way Google's client
    /// libraries do.
    pub fn from_env(project: Option<String>) -> Self {
        let endpoint = std::env::var(EMULATOR_HOST_ENV)
            .ok()
            .filter(|host| !host.trim().is_empty())
            .map(|host| emulator_endpoint(&host))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Self {
            endpoint,
            project,
            tokens: TokenSource::from_env(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

fn emulator_endpoint(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Reads version markers from Cloud Storage buckets.
pub struct GcsVersionSource {
    client: Client,
    options: GcsOptions,
}

impl GcsVersionSource {
    /// Create a source with its own blocking HTTP client.
    pub fn new(options: GcsOptions) -> Result<Self> {
        // reqwest's blocking client defaults to a 30s timeout; unset means none
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self { client, options })
    }

    /// Build the media download URL for an object.
    ///
    /// Bucket and object names are percent-encoded as single path segments,
    /// so object names containing `/` stay one segment.
    pub fn object_url(&self, bucket: &str, object: &str) -> Result<Url> {
        object_url(&self.options.endpoint, bucket, object)
    }
}

pub(crate) fn object_url(endpoint: &str, bucket: &str, object: &str) -> Result<Url> {
    let invalid = || Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
    };

    let mut url = Url::parse(endpoint).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(["storage", "v1", "b", bucket, "o", object]);
    url.query_pairs_mut().append_pair("alt", "media");
    Ok(url)
}

impl VersionSource for GcsVersionSource {
    fn read(&self, bucket: &str, object: &str) -> Result<Vec<u8>> {
        let url = self.object_url(bucket, object)?;
        tracing::debug!(bucket = %bucket, object = %object, "Reading version marker");

        let mut request = self.client.get(url);
        if let Some(token) = self.options.tokens.token(&self.client)? {
            request = request.bearer_auth(token);
        }
        if let Some(project) = &self.options.project {
            request = request.header("x-goog-user-project", project);
        }

        let response = request.send()?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Status {
                bucket: bucket.to_string(),
                object: object.to_string(),
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let bytes = response.bytes()?;
        tracing::debug!(bucket = %bucket, object = %object, len = bytes.len(), "Read version marker");
        Ok(bytes.to_vec())
    }
}
