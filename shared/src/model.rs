use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::ValidatedUrl;
use crate::PredictError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A picked file exactly as the shell read it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Keep raw bytes out of logs and panics.
impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Shell-owned preview resource (an object URL, a temp path...).
///
/// Deliberately not `Clone`: the only way to give it up is to hand it to
/// the preview capability, which consumes it.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub id: ImageId,
    pub file: ImageFile,
}

/// An image and its preview. They are replaced and dropped together.
#[derive(Debug)]
pub struct Selection {
    pub image: SelectedImage,
    pub preview: PreviewHandle,
}

/// Success body of the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub animal: String,
    pub breed: String,
    pub confidence: f64,
    pub animal_confidence: f64,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReport {
    pub prediction: Prediction,
    /// Summary text with the fallback already applied.
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading {
        request: RequestId,
        image: ImageId,
    },
    Success(Box<PredictionReport>),
    Failed(PredictError),
}

impl Phase {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Success(_) => "success",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
pub struct Model {
    pub endpoint: ValidatedUrl,
    pub selection: Option<Selection>,
    pub phase: Phase,
    next_image: u64,
    next_request: u64,
}

impl Model {
    pub fn new(endpoint: ValidatedUrl) -> Self {
        Self {
            endpoint,
            selection: None,
            phase: Phase::Idle,
            next_image: 1,
            next_request: 1,
        }
    }

    pub fn next_image_id(&mut self) -> ImageId {
        let id = ImageId(self.next_image);
        self.next_image += 1;
        id
    }

    pub fn next_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        id
    }

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.selection.as_ref().map(|s| &s.image)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ValidatedUrl::default())
    }
}
