//! Batch isolation and option pass-through, exercised with stand-in codecs

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use toon_gateway::conversion::limits::DEFAULT_BODY_LIMIT;
use toon_gateway::conversion::{encode_batch, Codec, ConversionOptions};
use toon_gateway::{build_router, AppState, ToonError, ToonResult};

/// Rejects any item that is an object with `"bad": true`
struct PickyCodec;

impl Codec for PickyCodec {
    fn encode(&self, data: &Value, _options: &ConversionOptions) -> ToonResult<String> {
        if data.get("bad") == Some(&Value::Bool(true)) {
            return Err(ToonError::encode("item rejected"));
        }
        Ok(format!("ok:{}", data))
    }

    fn decode(&self, _toon: &str, _options: &ConversionOptions) -> ToonResult<Value> {
        Err(ToonError::parse(1, "not supported"))
    }
}

/// Records every options bag it is handed
#[derive(Default)]
struct RecordingCodec {
    seen: Mutex<Vec<ConversionOptions>>,
}

impl Codec for RecordingCodec {
    fn encode(&self, _data: &Value, options: &ConversionOptions) -> ToonResult<String> {
        self.seen.lock().unwrap().push(options.clone());
        Ok(String::new())
    }

    fn decode(&self, _toon: &str, options: &ConversionOptions) -> ToonResult<Value> {
        self.seen.lock().unwrap().push(options.clone());
        Ok(json!({}))
    }
}

async fn post(codec: Arc<dyn Codec>, path: &str, body: Value) -> (StatusCode, Value) {
    let app = build_router(AppState::new(codec), DEFAULT_BODY_LIMIT);
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_one_bad_item_does_not_affect_siblings() {
    let items = json!([{"id": 0}, {"id": 1, "bad": true}, {"id": 2}, {"id": 3}]);
    let (status, body) = post(
        Arc::new(PickyCodec),
        "/encode-batch",
        json!({"items": items}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 4);
    assert_eq!(body["failed"], 1);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result["index"], i);
        if i == 1 {
            assert_eq!(result["success"], false);
            assert_eq!(result["error"], "TOON encoding error: item rejected");
            assert!(result.get("toon").is_none());
        } else {
            assert_eq!(result["success"], true);
            assert_eq!(result["toon"], format!("ok:{}", items[i]));
            assert!(result.get("error").is_none());
        }
    }
}

#[tokio::test]
async fn test_every_item_failing_still_succeeds_overall() {
    let (status, body) = post(
        Arc::new(PickyCodec),
        "/encode-batch",
        json!({"items": [{"bad": true}, {"bad": true}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 2);
    assert_eq!(body["failed"], 2);
}

#[tokio::test]
async fn test_empty_batch() {
    let (status, body) = post(Arc::new(PickyCodec), "/encode-batch", json!({"items": []})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "total": 0, "failed": 0, "results": []})
    );
}

#[tokio::test]
async fn test_options_reach_the_codec_unchanged() {
    let codec = Arc::new(RecordingCodec::default());
    let options = json!({"delimiter": "|", "custom": {"nested": [1, 2]}});

    let (status, _) = post(
        codec.clone(),
        "/encode-batch",
        json!({"items": [1, 2, 3], "options": options}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let seen = codec.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    for bag in seen.iter() {
        assert_eq!(serde_json::to_value(bag).unwrap(), options);
    }
}

#[tokio::test]
async fn test_absent_options_are_the_empty_bag() {
    let codec = Arc::new(RecordingCodec::default());

    post(codec.clone(), "/encode", json!({"data": 1})).await;
    post(codec.clone(), "/encode", json!({"data": 1, "options": null})).await;
    post(codec.clone(), "/decode", json!({"toon": "a: 1"})).await;

    let seen = codec.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(ConversionOptions::is_empty));
}

#[tokio::test]
async fn test_validation_runs_before_the_codec() {
    let codec = Arc::new(RecordingCodec::default());

    post(codec.clone(), "/encode", json!({})).await;
    post(codec.clone(), "/decode", json!({"toon": ""})).await;
    post(codec.clone(), "/encode-batch", json!({"items": "nope"})).await;
    post(codec.clone(), "/encode-advanced", json!({"indent": 2})).await;

    assert!(codec.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_single_encode_failure_is_a_400() {
    let (status, body) = post(
        Arc::new(PickyCodec),
        "/encode",
        json!({"data": {"bad": true}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "error": "TOON encoding error: item rejected",
            "details": "Failed to encode data to TOON format"
        })
    );
}

#[test]
fn test_library_batch_keeps_index_alignment() {
    let items: Vec<Value> = (0..10)
        .map(|i| if i % 3 == 0 { json!({"bad": true}) } else { json!(i) })
        .collect();

    let outcome = encode_batch(&PickyCodec, &items, &ConversionOptions::new());
    assert_eq!(outcome.total, 10);
    assert_eq!(outcome.failed, 4);
    assert_eq!(outcome.succeeded(), 6);
    for (i, result) in outcome.results.iter().enumerate() {
        assert_eq!(result.index, i);
        assert_eq!(result.success, i % 3 != 0);
    }
}
