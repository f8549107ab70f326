use crux_core::testing::AppTester;
use crux_core::Request;
use proptest::prelude::*;
use shared::capabilities::{
    AlertOperation, HttpReply, PredictOperation, PreviewOperation, TransportError,
};
use shared::{App, Effect, Event, ImageFile, Model, Phase, PreviewHandle, Status};

const COW_REPLY: &str = r#"{"animal":"Cow","breed":"Jersey","confidence":0.8765,"animal_confidence":0.9321,"summary":"*Gentle*Good milk yield"}"#;

fn pick(name: &str, preview: &str) -> Event {
    Event::image_selected(
        ImageFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]),
        PreviewHandle::new(preview),
    )
}

fn predict_request(effects: Vec<Effect>) -> Request<PredictOperation> {
    effects
        .into_iter()
        .find_map(|e| match e {
            Effect::Predict(request) => Some(request),
            _ => None,
        })
        .expect("expected a predict effect")
}

fn released(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Preview(request) => match &request.operation {
                PreviewOperation::Release { handle } => Some(handle.clone()),
            },
            _ => None,
        })
        .collect()
}

/// Resolves the outstanding upload and feeds the resulting events back in.
fn complete(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    request: &mut Request<PredictOperation>,
    outcome: Result<HttpReply, TransportError>,
) {
    let update = app.resolve(request, outcome).expect("request should resolve");
    for event in update.events {
        app.update(event, model);
    }
}

#[test]
fn successful_prediction_renders_report_and_bullets() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let update = app.update(Event::PredictRequested, &mut model);
    assert!(model.phase.is_loading());

    let view = app.view(&model);
    assert_eq!(view.status, Status::Loading);
    assert_eq!(view.predict_button.label, "Predicting...");
    assert!(!view.predict_button.enabled);
    assert!(view.result_text.is_empty());

    let mut request = predict_request(update.effects);
    assert_eq!(request.operation.endpoint, "http://localhost:5000/predict");
    assert_eq!(request.operation.field, "image");
    assert_eq!(request.operation.file.name, "cow.jpg");
    assert_eq!(request.operation.file.content_type, "image/jpeg");

    complete(
        &app,
        &mut model,
        &mut request,
        Ok(HttpReply::new(200, COW_REPLY.as_bytes().to_vec())),
    );

    assert!(!model.phase.is_loading());
    let view = app.view(&model);
    assert_eq!(view.status, Status::Success);
    assert_eq!(
        view.result_text,
        "Animal: Cow\nBreed: Jersey\nBreed Confidence: 87.65%\nAnimal Confidence: 93.21%"
    );
    assert_eq!(view.summary_items, vec!["Gentle", "Good milk yield"]);
    assert!(view.show_breed_info);
    assert_eq!(view.predict_button.label, "Predict");
    assert!(view.predict_button.enabled);
}

#[test]
fn missing_summary_uses_fallback() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("buffalo.jpg", "blob:1"), &mut model);
    let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    complete(
        &app,
        &mut model,
        &mut request,
        Ok(HttpReply::new(
            200,
            br#"{"animal":"buffalo","breed":"Toda","confidence":0.61,"animal_confidence":0.12}"#
                .to_vec(),
        )),
    );

    assert_eq!(app.view(&model).summary_items, vec!["No summary available."]);
}

#[test]
fn service_error_is_shown_inline() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("blurry.jpg", "blob:1"), &mut model);
    let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    complete(
        &app,
        &mut model,
        &mut request,
        Ok(HttpReply::new(200, br#"{"error":"no animal detected"}"#.to_vec())),
    );

    let view = app.view(&model);
    assert_eq!(view.status, Status::Failed);
    assert_eq!(view.result_text, "Error: no animal detected");
    assert!(view.summary_items.is_empty());
    assert!(view.show_breed_info);
}

#[test]
fn transport_failure_is_shown_inline() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    complete(
        &app,
        &mut model,
        &mut request,
        Err(TransportError::Network("Network request failed".into())),
    );

    let view = app.view(&model);
    assert_eq!(view.status, Status::Failed);
    assert_eq!(view.result_text, "Error: Network request failed");
    assert!(view.summary_items.is_empty());
    assert!(!model.phase.is_loading());
}

#[test]
fn malformed_body_fails_without_leaving_loading() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    complete(
        &app,
        &mut model,
        &mut request,
        Ok(HttpReply::new(500, b"Internal Server Error".to_vec())),
    );

    assert!(matches!(model.phase, Phase::Failed(_)));
    assert!(app.view(&model).result_text.starts_with("Error: "));
}

#[test]
fn predict_without_image_only_raises_notice() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::PredictRequested, &mut model);

    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Predict(_))));
    let notice = update.effects.iter().find_map(|e| match e {
        Effect::Alert(request) => match &request.operation {
            AlertOperation::Notice { message } => Some(message.clone()),
        },
        _ => None,
    });
    assert_eq!(notice.as_deref(), Some("Please upload an image."));
    assert_eq!(model.phase, Phase::Idle);
}

#[test]
fn predict_without_image_keeps_previous_result() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    complete(
        &app,
        &mut model,
        &mut request,
        Ok(HttpReply::new(200, COW_REPLY.as_bytes().to_vec())),
    );
    let before = app.view(&model);

    // Nothing selected any more, but the last result is still on screen.
    model.selection = None;
    let update = app.update(Event::PredictRequested, &mut model);

    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Predict(_))));
    let after = app.view(&model);
    assert_eq!(after.result_text, before.result_text);
    assert_eq!(after.summary_items, before.summary_items);
}

#[test]
fn new_selection_clears_result_and_releases_old_preview() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    complete(
        &app,
        &mut model,
        &mut request,
        Ok(HttpReply::new(200, COW_REPLY.as_bytes().to_vec())),
    );
    assert_eq!(app.view(&model).status, Status::Success);

    let update = app.update(pick("buffalo.jpg", "blob:2"), &mut model);

    assert_eq!(released(&update.effects), vec!["blob:1"]);
    let view = app.view(&model);
    assert_eq!(view.status, Status::Idle);
    assert!(view.result_text.is_empty());
    assert!(view.summary_items.is_empty());
    assert!(!view.show_breed_info);
    let preview = view.preview.expect("preview should be shown");
    assert_eq!(preview.handle, "blob:2");
    assert_eq!(preview.file_name, "buffalo.jpg");
}

#[test]
fn first_selection_releases_nothing() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(pick("cow.jpg", "blob:1"), &mut model);

    assert!(released(&update.effects).is_empty());
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
}

#[test]
fn empty_pick_is_ignored() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let update = app.update(Event::ImageSelected(None), &mut model);

    assert!(update.effects.is_empty());
    assert_eq!(app.view(&model).preview.unwrap().handle, "blob:1");
}

#[test]
fn second_trigger_while_loading_is_ignored() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);

    let update = app.update(Event::PredictRequested, &mut model);
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Predict(_))));

    complete(
        &app,
        &mut model,
        &mut request,
        Ok(HttpReply::new(200, COW_REPLY.as_bytes().to_vec())),
    );
    assert_eq!(app.view(&model).status, Status::Success);
}

#[test]
fn reselecting_while_loading_discards_stale_outcome() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);

    let update = app.update(pick("buffalo.jpg", "blob:2"), &mut model);
    assert_eq!(released(&update.effects), vec!["blob:1"]);
    assert!(model.phase.is_loading(), "request is still outstanding");
    assert!(!app.view(&model).predict_button.enabled);

    complete(
        &app,
        &mut model,
        &mut request,
        Ok(HttpReply::new(200, COW_REPLY.as_bytes().to_vec())),
    );

    let view = app.view(&model);
    assert_eq!(view.status, Status::Idle);
    assert!(view.result_text.is_empty());
    assert!(view.predict_button.enabled);
}

#[test]
fn retry_after_failure_submits_again() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let mut first = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    complete(&app, &mut model, &mut first, Err(TransportError::Timeout));
    assert_eq!(app.view(&model).result_text, "Error: request timed out");

    let mut second = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    assert_eq!(app.view(&model).status, Status::Loading);
    assert!(app.view(&model).result_text.is_empty());

    complete(
        &app,
        &mut model,
        &mut second,
        Ok(HttpReply::new(200, COW_REPLY.as_bytes().to_vec())),
    );
    assert_eq!(app.view(&model).status, Status::Success);
}

#[test]
fn teardown_releases_preview() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let update = app.update(Event::Teardown, &mut model);

    assert_eq!(released(&update.effects), vec!["blob:1"]);
    assert!(model.selection.is_none());
    assert!(app.view(&model).preview.is_none());
}

#[test]
fn endpoint_can_be_reconfigured() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::EndpointConfigured {
            url: "http://127.0.0.1:8000/predict".into(),
        },
        &mut model,
    );
    app.update(
        Event::EndpointConfigured {
            url: "ftp://nope".into(),
        },
        &mut model,
    );
    assert_eq!(model.endpoint.as_str(), "http://127.0.0.1:8000/predict");

    app.update(pick("cow.jpg", "blob:1"), &mut model);
    let request = predict_request(app.update(Event::PredictRequested, &mut model).effects);
    assert_eq!(request.operation.endpoint, "http://127.0.0.1:8000/predict");
}

#[test]
fn idle_view_matches_fresh_component() {
    let app = AppTester::<App, Effect>::default();
    let model = Model::default();

    let view = app.view(&model);
    assert_eq!(view.title, "Cow/Buffalo Breed Predictor");
    assert_eq!(view.accept, "image/*");
    assert_eq!(view.summary_heading, "Breed Information");
    assert_eq!(view.status, Status::Idle);
    assert!(view.preview.is_none());
    assert!(view.predict_button.enabled);
    assert!(!view.show_breed_info);
}

fn reply_body() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 0..64),
        Just(COW_REPLY.as_bytes().to_vec()),
        ".*".prop_map(String::into_bytes),
        (".*", any::<bool>()).prop_map(|(text, as_detail)| {
            let key = if as_detail { "detail" } else { "error" };
            serde_json::json!({ key: text }).to_string().into_bytes()
        }),
    ]
}

fn any_outcome() -> impl Strategy<Value = Result<HttpReply, TransportError>> {
    prop_oneof![
        (any::<u16>(), reply_body()).prop_map(|(status, body)| Ok(HttpReply::new(status, body))),
        ".*".prop_map(|m| Err(TransportError::Network(m))),
        Just(Err(TransportError::Timeout)),
        ".*".prop_map(|m| Err(TransportError::InvalidRequest(m))),
        ".*".prop_map(|m| Err(TransportError::Other(m))),
    ]
}

proptest! {
    #[test]
    fn every_outcome_clears_loading(outcome in any_outcome()) {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();

        app.update(pick("cow.jpg", "blob:1"), &mut model);
        let mut request = predict_request(app.update(Event::PredictRequested, &mut model).effects);
        prop_assert!(model.phase.is_loading());

        complete(&app, &mut model, &mut request, outcome);

        prop_assert!(!model.phase.is_loading());
        let view = app.view(&model);
        prop_assert_ne!(view.status, Status::Loading);
        prop_assert!(view.predict_button.enabled);
        prop_assert!(matches!(view.status, Status::Success | Status::Failed));
    }
}
