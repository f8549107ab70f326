mod alert;
mod predict;
mod preview;

pub use self::alert::{Alert, AlertOperation};
pub use self::predict::{
    HttpReply, Predict, PredictOperation, PredictOutcome, TransportError, UrlError, ValidatedUrl,
    MAX_URL_LENGTH,
};
pub use self::preview::{Preview, PreviewOperation};

// Crux's built-in Render capability covers view updates as-is.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub predict: Predict<Event>,
    pub preview: Preview<Event>,
    pub alert: Alert<Event>,
    pub render: Render<Event>,
}
