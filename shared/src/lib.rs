#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]

pub mod capabilities;
pub mod event;
pub mod model;
pub mod report;

#[cfg(not(target_arch = "wasm32"))]
pub mod shell;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::{Event, ImagePick};
pub use model::{ImageFile, Model, Phase, Prediction, PreviewHandle};

pub const DEFAULT_PREDICT_ENDPOINT: &str = "http://localhost:5000/predict";
pub const IMAGE_FIELD_NAME: &str = "image";
pub const ACCEPTED_MEDIA: &str = "image/*";
pub const NO_SUMMARY_FALLBACK: &str = "No summary available.";
pub const NO_IMAGE_NOTICE: &str = "Please upload an image.";
pub const TITLE: &str = "Cow/Buffalo Breed Predictor";
pub const SUMMARY_HEADING: &str = "Breed Information";
pub const PREDICT_LABEL: &str = "Predict";
pub const PREDICTING_LABEL: &str = "Predicting...";

/// Why a submitted prediction ended in `Failed`. Displays as the bare
/// description; the view adds the `Error: ` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PredictError {
    /// The service answered but reported an error of its own.
    #[error("{0}")]
    Service(String),

    /// The request never produced a usable body: network failure,
    /// non-JSON reply, or a body missing required fields.
    #[error("{0}")]
    Transport(String),
}

impl PredictError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Service(_) => ErrorKind::Service,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }
}

impl From<capabilities::TransportError> for PredictError {
    fn from(e: capabilities::TransportError) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Raised before any request is made; surfaced as a blocking notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please upload an image.")]
    NoImageSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Service,
    Transport,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    Loading,
    Success,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewView {
    pub handle: String,
    pub file_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub title: String,
    pub accept: String,
    pub predict_button: ButtonView,
    pub preview: Option<PreviewView>,
    pub status: Status,
    pub error_kind: Option<ErrorKind>,
    /// Preformatted block: the four-line report or `Error: ...`.
    pub result_text: String,
    pub show_breed_info: bool,
    pub summary_heading: String,
    pub summary_items: Vec<String>,
}

pub mod app {
    use tracing::{debug, info, warn};

    use super::*;
    use crate::capabilities::{PredictOutcome, ValidatedUrl};
    use crate::model::{Phase, RequestId, SelectedImage, Selection};
    use crate::report;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn select_image(pick: ImagePick, model: &mut Model, caps: &Capabilities) {
            let ImagePick { file, preview } = pick;
            let id = model.next_image_id();

            debug!(
                image = %id,
                name = %file.name,
                content_type = %file.content_type,
                size_bytes = file.len(),
                "image selected"
            );

            let replaced = model.selection.replace(Selection {
                image: SelectedImage { id, file },
                preview,
            });

            if let Some(old) = replaced {
                debug!(image = %old.image.id, "releasing superseded preview");
                caps.preview.release(old.preview);
            }

            // An outstanding request keeps the trigger locked until it resolves.
            if !model.phase.is_loading() {
                model.phase = Phase::Idle;
            }
        }

        fn request_prediction(model: &mut Model, caps: &Capabilities) {
            if model.phase.is_loading() {
                warn!("prediction already in flight, ignoring trigger");
                return;
            }

            let Some(image) = model.selected_image().cloned() else {
                info!("predict requested without an image");
                caps.alert.notice(InputError::NoImageSelected.to_string());
                return;
            };

            let request = model.next_request_id();
            model.phase = Phase::Loading {
                request,
                image: image.id,
            };

            info!(
                request = %request,
                image = %image.id,
                endpoint = %model.endpoint,
                size_bytes = image.file.len(),
                "submitting image for prediction"
            );

            caps.predict.submit(
                &model.endpoint,
                IMAGE_FIELD_NAME,
                image.file,
                move |outcome| Event::PredictionReturned {
                    request,
                    outcome: Box::new(outcome),
                },
            );
        }

        fn resolve_prediction(request: RequestId, outcome: PredictOutcome, model: &mut Model) {
            let Phase::Loading {
                request: pending,
                image,
            } = model.phase
            else {
                warn!(request = %request, "prediction returned with nothing in flight");
                return;
            };

            if pending != request {
                warn!(request = %request, pending = %pending, "ignoring unexpected prediction");
                return;
            }

            if model.selected_image().map(|s| s.id) != Some(image) {
                debug!(request = %request, image = %image, "image replaced while loading, discarding outcome");
                model.phase = Phase::Idle;
                return;
            }

            let result = outcome
                .map_err(PredictError::from)
                .and_then(|reply| {
                    debug!(
                        request = %request,
                        status = reply.status,
                        success = reply.is_success(),
                        "prediction service replied"
                    );
                    report::parse_reply(&reply)
                });

            model.phase = match result {
                Ok(prediction) => {
                    info!(
                        request = %request,
                        animal = %prediction.animal,
                        breed = %prediction.breed,
                        "prediction succeeded"
                    );
                    Phase::Success(Box::new(report::into_report(prediction)))
                }
                Err(error) => {
                    warn!(request = %request, kind = ?error.kind(), %error, "prediction failed");
                    Phase::Failed(error)
                }
            };
        }

        fn configure_endpoint(url: &str, model: &mut Model) {
            match ValidatedUrl::new(url) {
                Ok(endpoint) => {
                    info!(endpoint = %endpoint, "prediction endpoint configured");
                    model.endpoint = endpoint;
                }
                Err(e) => warn!(error = %e, "rejected endpoint, keeping {}", model.endpoint),
            }
        }

        fn teardown(model: &mut Model, caps: &Capabilities) {
            if let Some(old) = model.selection.take() {
                caps.preview.release(old.preview);
            }
            model.phase = Phase::Idle;
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(event = event.name(), phase = model.phase.name(), "update");

            match event {
                // Nothing was picked: leave everything as it is.
                Event::ImageSelected(None) => return,

                Event::ImageSelected(Some(pick)) => Self::select_image(*pick, model, caps),

                Event::PredictRequested => Self::request_prediction(model, caps),

                Event::PredictionReturned { request, outcome } => {
                    Self::resolve_prediction(request, *outcome, model);
                }

                Event::EndpointConfigured { url } => Self::configure_endpoint(&url, model),

                Event::Teardown => Self::teardown(model, caps),
            }

            caps.render.render();
        }

        fn view(&self, model: &Model) -> ViewModel {
            let loading = model.phase.is_loading();

            let (status, error_kind, result_text, summary_items) = match &model.phase {
                Phase::Idle => (Status::Idle, None, String::new(), Vec::new()),
                Phase::Loading { .. } => (Status::Loading, None, String::new(), Vec::new()),
                Phase::Success(report) => (
                    Status::Success,
                    None,
                    report::format_report(&report.prediction),
                    report::summary_bullets(&report.summary),
                ),
                Phase::Failed(error) => (
                    Status::Failed,
                    Some(error.kind()),
                    report::error_report(error),
                    Vec::new(),
                ),
            };

            ViewModel {
                title: TITLE.to_string(),
                accept: ACCEPTED_MEDIA.to_string(),
                predict_button: ButtonView {
                    label: if loading { PREDICTING_LABEL } else { PREDICT_LABEL }.to_string(),
                    enabled: !loading,
                },
                preview: model.selection.as_ref().map(|s| PreviewView {
                    handle: s.preview.as_str().to_string(),
                    file_name: s.image.file.name.clone(),
                }),
                status,
                error_kind,
                show_breed_info: !result_text.is_empty(),
                result_text,
                summary_heading: SUMMARY_HEADING.to_string(),
                summary_items,
            }
        }
    }
}
