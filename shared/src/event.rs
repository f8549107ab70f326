use serde::{Deserialize, Serialize};

use crate::capabilities::PredictOutcome;
use crate::model::{ImageFile, PreviewHandle, RequestId};

/// A file chosen in the picker plus the preview the shell made for it.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ImagePick {
    pub file: ImageFile,
    pub preview: PreviewHandle,
}

impl ImagePick {
    pub fn new(file: ImageFile, preview: PreviewHandle) -> Self {
        Self { file, preview }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub enum Event {
    /// `None` when the picker was dismissed without a file.
    ImageSelected(Option<Box<ImagePick>>),
    PredictRequested,
    EndpointConfigured {
        url: String,
    },
    Teardown,

    // Capability responses (internal, never sent by a shell)
    #[serde(skip)]
    PredictionReturned {
        request: RequestId,
        outcome: Box<PredictOutcome>,
    },
}

impl Event {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ImageSelected(_) => "image_selected",
            Self::PredictRequested => "predict_requested",
            Self::EndpointConfigured { .. } => "endpoint_configured",
            Self::Teardown => "teardown",
            Self::PredictionReturned { .. } => "prediction_returned",
        }
    }

    pub fn image_selected(file: ImageFile, preview: PreviewHandle) -> Self {
        Self::ImageSelected(Some(Box::new(ImagePick::new(file, preview))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 64,
            "Event enum is {} bytes, box more variants",
            size
        );
    }

    #[test]
    fn shell_events_round_trip_through_json() {
        let event = Event::image_selected(
            ImageFile::new("buffalo.png", "image/png", vec![1, 2, 3]),
            PreviewHandle::new("blob:preview-1"),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(Event::PredictRequested.name(), "predict_requested");
        assert_eq!(Event::ImageSelected(None).name(), "image_selected");
    }
}
