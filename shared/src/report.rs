//! Mapping from the prediction service's reply to display text.
//!
//! Everything here is pure: no capabilities, no model access.

use serde::Deserialize;
use serde_json::Value;

use crate::capabilities::HttpReply;
use crate::model::{Prediction, PredictionReport};
use crate::{PredictError, NO_SUMMARY_FALLBACK};

/// Decides between a prediction and an error purely from the body.
///
/// The HTTP status is not consulted: the service reports its own
/// failures as `{"error": ...}` (or `{"detail": ...}` when the request is
/// rejected before reaching the model).
pub fn parse_reply(reply: &HttpReply) -> Result<Prediction, PredictError> {
    let value: Value = serde_json::from_slice(&reply.body)
        .map_err(|e| PredictError::Transport(e.to_string()))?;

    if let Some(message) = service_error(&value) {
        return Err(PredictError::Service(message));
    }

    Prediction::deserialize(&value).map_err(|e| {
        match value.get("detail") {
            None | Some(Value::Null) => PredictError::Transport(e.to_string()),
            Some(Value::String(detail)) => PredictError::Service(detail.clone()),
            Some(other) => PredictError::Service(other.to_string()),
        }
    })
}

// Falsy values (null, false, 0, "") do not count as an error.
fn service_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

pub fn into_report(prediction: Prediction) -> PredictionReport {
    let summary = summary_or_fallback(prediction.summary.as_deref());
    PredictionReport {
        prediction,
        summary,
    }
}

pub fn summary_or_fallback(summary: Option<&str>) -> String {
    match summary {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_SUMMARY_FALLBACK.to_string(),
    }
}

/// Two decimal places, with exact midpoints rounded away from zero.
pub fn format_percent(fraction: f64) -> String {
    let percent = fraction * 100.0;
    // A binary value sits exactly halfway between two hundredths only when
    // it is an odd multiple of 1/8; `{:.2}` would round those to even.
    let eighths = percent.abs() * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        return format!("{:.2}%", (percent * 100.0).round() / 100.0);
    }
    format!("{percent:.2}%")
}

pub fn format_report(prediction: &Prediction) -> String {
    format!(
        "Animal: {}\nBreed: {}\nBreed Confidence: {}\nAnimal Confidence: {}",
        prediction.animal,
        prediction.breed,
        format_percent(prediction.confidence),
        format_percent(prediction.animal_confidence),
    )
}

pub fn error_report(error: &PredictError) -> String {
    format!("Error: {error}")
}

/// Splits a `*`-delimited summary into trimmed, non-empty bullet points.
pub fn summary_bullets(summary: &str) -> Vec<String> {
    summary
        .split('*')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
