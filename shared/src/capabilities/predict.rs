use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;

use crate::model::ImageFile;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid URL '{url}': {reason}")]
    Invalid { url: String, reason: String },
}

/// Endpoint of the prediction service.
///
/// Plain http is allowed and loopback hosts are expected: the service
/// usually runs next to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    scheme: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, UrlError> {
        let url = url.into();
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(UrlError::Invalid {
                url: String::new(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        if trimmed.len() > MAX_URL_LENGTH {
            return Err(UrlError::Invalid {
                url: Self::truncate_url(trimmed),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let parsed = Url::parse(trimmed).map_err(|e| UrlError::Invalid {
            url: Self::truncate_url(trimmed),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(UrlError::Invalid {
                url: Self::truncate_url(trimmed),
                reason: format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            });
        }

        let host = match parsed.host_str() {
            Some(host) => host.to_lowercase(),
            None => {
                return Err(UrlError::Invalid {
                    url: Self::truncate_url(trimmed),
                    reason: "URL must have a host".to_string(),
                })
            }
        };

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(UrlError::Invalid {
                url: Self::truncate_url(trimmed),
                reason: "credentials in URL are not allowed".to_string(),
            });
        }

        Ok(Self {
            url: parsed.to_string(),
            scheme,
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn truncate_url(url: &str) -> String {
        match url.char_indices().nth(100) {
            Some((cut, _)) => format!("{}...", &url[..cut]),
            None => url.to_string(),
        }
    }
}

impl Default for ValidatedUrl {
    /// The locally hosted service, `DEFAULT_PREDICT_ENDPOINT`.
    fn default() -> Self {
        Self {
            url: crate::DEFAULT_PREDICT_ENDPOINT.to_string(),
            scheme: "http".to_string(),
            host: "localhost".to_string(),
        }
    }
}

impl std::fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// A single multipart POST carrying one file part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictOperation {
    pub endpoint: String,
    pub field: String,
    pub file: ImageFile,
}

impl Operation for PredictOperation {
    type Output = PredictOutcome;
}

/// What came back over the wire. The status is informational only;
/// the body alone decides between a prediction and an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    #[serde(with = "serde_bytes")]
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

pub type PredictOutcome = Result<HttpReply, TransportError>;

#[derive(Capability)]
pub struct Predict<Ev> {
    context: CapabilityContext<PredictOperation, Ev>,
}

impl<Ev> Predict<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<PredictOperation, Ev>) -> Self {
        Self { context }
    }

    /// Uploads `file` under `field` and hands the outcome to `make_event`.
    pub fn submit<F>(&self, endpoint: &ValidatedUrl, field: &str, file: ImageFile, make_event: F)
    where
        F: FnOnce(PredictOutcome) -> Ev + Send + 'static,
    {
        let operation = PredictOperation {
            endpoint: endpoint.as_str().to_string(),
            field: field.to_string(),
            file,
        };

        let ctx = self.context.clone();
        self.context.spawn(async move {
            let outcome = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(outcome));
        });
    }
}
