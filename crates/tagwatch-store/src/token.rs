//! Access tokens for the Cloud Storage JSON API

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable holding a pre-minted OAuth2 access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Environment variable pointing the client at a storage emulator
pub const EMULATOR_HOST_ENV: &str = "STORAGE_EMULATOR_HOST";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Where bearer tokens for blob store requests come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// No `Authorization` header (public buckets, emulators)
    Anonymous,
    /// A fixed token supplied by the operator
    Static(String),
    /// The GCE/GKE metadata server of the instance we run on
    MetadataServer,
}

impl TokenSource {
    /// Pick a token source from the process environment.
    ///
    /// An emulator never needs credentials; an explicit token wins over the
    /// metadata server.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if non_empty(EMULATOR_HOST_ENV).is_some() {
            return TokenSource::Anonymous;
        }
        match non_empty(ACCESS_TOKEN_ENV) {
            Some(token) => TokenSource::Static(token.trim().to_string()),
            None => TokenSource::MetadataServer,
        }
    }

    /// Resolve a bearer token, or `None` for anonymous access.
    pub fn token(&self, client: &Client) -> Result<Option<String>> {
        match self {
            TokenSource::Anonymous => Ok(None),
            TokenSource::Static(token) => Ok(Some(token.clone())),
            TokenSource::MetadataServer => {
                tracing::debug!("Requesting access token from metadata server");
                let response = client
                    .get(METADATA_TOKEN_URL)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .map_err(|e| Error::Token {
                        message: format!("metadata server unreachable: {e}"),
                    })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Token {
                        message: format!("metadata server returned {status}"),
                    });
                }

                let token: MetadataToken = response.json().map_err(|e| Error::Token {
                    message: format!("malformed metadata token response: {e}"),
                })?;
                Ok(Some(token.access_token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_metadata_server() {
        assert_eq!(TokenSource::from_lookup(lookup(&[])), TokenSource::MetadataServer);
    }

    #[test]
    fn test_static_token_from_env() {
        let source = TokenSource::from_lookup(lookup(&[(ACCESS_TOKEN_ENV, " ya29.token\n")]));
        assert_eq!(source, TokenSource::Static("ya29.token".into()));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let source = TokenSource::from_lookup(lookup(&[(ACCESS_TOKEN_ENV, "  ")]));
        assert_eq!(source, TokenSource::MetadataServer);
    }

    #[test]
    fn test_emulator_is_anonymous() {
        let source = TokenSource::from_lookup(lookup(&[
            (EMULATOR_HOST_ENV, "localhost:9023"),
            (ACCESS_TOKEN_ENV, "ya29.token"),
        ]));
        assert_eq!(source, TokenSource::Anonymous);
    }

    #[test]
    fn test_anonymous_and_static_resolve_without_network() {
        let client = Client::new();
        assert_eq!(TokenSource::Anonymous.token(&client).unwrap(), None);
        assert_eq!(
            TokenSource::Static("abc".into()).token(&client).unwrap(),
            Some("abc".to_string())
        );
    }
}
