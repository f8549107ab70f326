use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use crate::capabilities::{HttpReply, PredictOperation, PredictOutcome, TransportError};

use super::{ShellConfig, ShellError};

/// Performs the upload described by a [`PredictOperation`].
///
/// Every failure is folded into the outcome; the core decides what the
/// user sees.
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn submit(&self, operation: &PredictOperation) -> PredictOutcome;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ShellConfig) -> Result<Self, ShellError> {
        Self::with_timeout(config.timeout)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, ShellError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PredictionTransport for HttpTransport {
    #[instrument(
        skip(self, operation),
        fields(endpoint = %operation.endpoint, size_bytes = operation.file.len())
    )]
    async fn submit(&self, operation: &PredictOperation) -> PredictOutcome {
        let part = Part::bytes(operation.file.bytes.clone())
            .file_name(operation.file.name.clone())
            .mime_str(&operation.file.content_type)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part(operation.field.clone(), part);

        let response = self
            .client
            .post(&operation.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;
        debug!(status, body_bytes = body.len(), "prediction service responded");

        Ok(HttpReply::new(status, body.to_vec()))
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() || error.is_request() {
        TransportError::Network(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}
