//! Document references: the validated input to every extraction.

use crate::error::ExtractError;
use reqwest::Url;
use std::fmt;

/// A validated URL plus an optional credential for gated documents.
///
/// Construct with [`DocumentReference::parse`]; validation failures are the
/// only errors that bypass the strategy chain entirely.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentReference {
    url: Url,
    credential: Option<String>,
}

impl DocumentReference {
    /// Validate `input` as an absolute HTTP/HTTPS URL with a host.
    ///
    /// A blank credential is treated as no credential.
    pub fn parse(input: &str, credential: Option<&str>) -> Result<Self, ExtractError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid(input, "reference is empty"));
        }

        let url = Url::parse(trimmed).map_err(|e| invalid(input, &e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(invalid(input, &format!("unsupported scheme '{other}'")));
            }
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid(input, "URL has no host"));
        }

        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self { url, credential })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Lower-cased host, without a leading `www.`.
    pub fn host(&self) -> String {
        let host = self.url.host_str().unwrap_or_default().to_ascii_lowercase();
        host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
    }
}

impl fmt::Debug for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentReference")
            .field("url", &self.url.as_str())
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn invalid(input: &str, reason: &str) -> ExtractError {
    ExtractError::InvalidReference {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
