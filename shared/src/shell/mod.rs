//! Native shell: drives the core from Rust and talks to the prediction
//! service over HTTP.
//!
//! Mobile and web shells do the same job in their own languages; this one
//! backs the `breed-predict` binary and the end-to-end tests.

mod preview;
mod transport;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crux_core::Core;
use thiserror::Error;
use tracing::{debug, warn};

use crate::capabilities::{AlertOperation, PreviewOperation, UrlError, ValidatedUrl};
use crate::{App, Capabilities, Effect, Event, ViewModel};

pub use self::preview::{load_image, PreviewRegistry};
pub use self::transport::{HttpTransport, PredictionTransport};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a supported image", .0.display())]
    NotAnImage(PathBuf),

    #[error("cannot create a preview for {}", .0.display())]
    Preview(PathBuf),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] UrlError),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Default)]
pub struct ShellConfig {
    pub endpoint: ValidatedUrl,
    /// Transport-level timeout. The core itself never times out.
    pub timeout: Option<Duration>,
}

impl ShellConfig {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, ShellError> {
        Ok(Self {
            endpoint: ValidatedUrl::new(endpoint)?,
            timeout,
        })
    }
}

pub struct NativeShell<T> {
    core: Core<Effect, App>,
    transport: T,
    previews: PreviewRegistry,
    notices: Vec<String>,
    renders: usize,
}

impl<T: PredictionTransport> NativeShell<T> {
    pub fn new(transport: T) -> Self {
        Self {
            core: Core::new::<Capabilities>(),
            transport,
            previews: PreviewRegistry::new(),
            notices: Vec::new(),
            renders: 0,
        }
    }

    pub async fn configure(&mut self, config: &ShellConfig) {
        self.dispatch(Event::EndpointConfigured {
            url: config.endpoint.as_str().to_string(),
        })
        .await;
    }

    /// The file-picker path: read, acquire a preview, hand both to the core.
    pub async fn select_image(&mut self, path: &Path) -> Result<(), ShellError> {
        let file = load_image(path).await?;
        let preview = self.previews.acquire(path)?;
        self.dispatch(Event::image_selected(file, preview)).await;
        Ok(())
    }

    pub async fn predict(&mut self) {
        self.dispatch(Event::PredictRequested).await;
    }

    pub async fn teardown(&mut self) {
        self.dispatch(Event::Teardown).await;
    }

    /// Processes one event and every effect that follows from it.
    pub async fn dispatch(&mut self, event: Event) {
        debug!(event = event.name(), "dispatching");
        let mut queue: VecDeque<Effect> = self.core.process_event(event).into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Render(_) => self.renders += 1,

                Effect::Predict(mut request) => {
                    let outcome = self.transport.submit(&request.operation).await;
                    queue.extend(self.core.resolve(&mut request, outcome));
                }

                Effect::Preview(request) => match &request.operation {
                    PreviewOperation::Release { handle } => {
                        self.previews.release(handle);
                    }
                },

                Effect::Alert(request) => match &request.operation {
                    AlertOperation::Notice { message } => {
                        warn!(%message, "notice");
                        self.notices.push(message.clone());
                    }
                },
            }
        }
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn renders(&self) -> usize {
        self.renders
    }
}
