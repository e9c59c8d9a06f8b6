//! Integration tests for the HTTP surface.
//!
//! Requests are routed through `handle_request` directly, without binding a
//! socket.

mod common;

use std::sync::Arc;

use cocoscan::server::{handle_request, MAX_BODY_BYTES};
use common::*;
use hyper::{Body, Method, Request, StatusCode};
use serde_json::{json, Value};

async fn send(pipeline: &Arc<ScanPipeline>, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = handle_request(req, Arc::clone(pipeline)).await?;
    let status = response.status();
    assert_eq!(
        response.headers().get("access-control-allow-origin").map(|v| v.as_bytes()),
        Some(&b"*"[..])
    );

    let body = hyper::body::to_bytes(response.into_body()).await?;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)?
    };
    Ok((status, value))
}

fn predict_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let pipeline = Arc::new(ScanPipeline::new());
    let req = Request::builder().method(Method::GET).uri("/health").body(Body::empty())?;

    let (status, body) = send(&pipeline, req).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["genericModel"], false);
    assert_eq!(body["customModel"], false);
    Ok(())
}

#[tokio::test]
async fn test_predict_cocolumber() -> anyhow::Result<()> {
    // 1. Service with a generic classifier that sees a tree trunk
    let pipeline = Arc::new(
        ScanPipeline::new()
            .with_generic_classifier(Arc::new(FakeClassifier::new(&[
                ("trunk", 0.64),
                ("fence", 0.2),
                ("barn", 0.1),
                ("shed", 0.05),
            ]))),
    );

    // 2. Post a brown log silhouette as a data URL
    let image = data_url_png(&rect_on(WHITE, WOOD_BROWN, 90, 20, 40, 180));
    let (status, body) = send(&pipeline, predict_request(json!({ "image": image }))).await?;

    // 3. Verify the response shape
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detectedClass"], "cocolumber");
    assert_eq!(body["confidence"], 64);
    assert_eq!(body["detectionMethod"], "mobilenet");
    assert_eq!(body["height"], "3.6");
    assert_eq!(body["width"], "80");
    assert_eq!(body["diameter"], "80");
    assert_eq!(body["quality"], "Premium");
    assert_eq!(body["qualityScore"], 90);
    assert!(body["estimatedLumber"].as_str().is_some());
    assert!(body.get("error").is_none());

    let raw = body["rawPredictions"].as_array().expect("rawPredictions should be an array");
    assert_eq!(raw.len(), 3);
    assert_eq!(raw[0]["class"], "trunk");
    Ok(())
}

#[tokio::test]
async fn test_predict_human() -> anyhow::Result<()> {
    let pipeline = Arc::new(
        ScanPipeline::new().with_generic_classifier(Arc::new(FakeClassifier::new(&[("person", 0.5), ("log", 0.1)]))),
    );

    let image = base64_png(&plank_stack(8));
    let (status, body) = send(&pipeline, predict_request(json!({ "image": image }))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detectedClass"], "human");
    assert_eq!(body["confidence"], 50);
    assert_eq!(body["detectionMethod"], "none");
    assert!(body.get("height").is_none());
    assert!(body.get("estimatedLumber").is_none());
    Ok(())
}

#[tokio::test]
async fn test_predict_rejection_carries_error() -> anyhow::Result<()> {
    let pipeline = Arc::new(ScanPipeline::new());

    let image = base64_png(&solid(SKY_BLUE));
    let (status, body) = send(&pipeline, predict_request(json!({ "image": image }))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detectedClass"], "not_cocolumber");
    assert_eq!(body["confidence"], 0);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("No cocolumber detected")));
    assert!(body.get("quality").is_none());
    Ok(())
}

#[tokio::test]
async fn test_predict_missing_image_is_bad_request() -> anyhow::Result<()> {
    let pipeline = Arc::new(ScanPipeline::new());

    for body in [json!({}), json!({ "image": "" }), json!({ "picture": "abc" })] {
        let (status, response) = send(&pipeline, predict_request(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "No image data provided");
    }

    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .body(Body::from("not json"))?;
    let (status, _) = send(&pipeline, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_predict_undecodable_image_is_bad_request() -> anyhow::Result<()> {
    let pipeline = Arc::new(ScanPipeline::new());

    let (status, body) = send(&pipeline, predict_request(json!({ "image": "aGVsbG8gd29ybGQ=" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("decode")));
    Ok(())
}

#[tokio::test]
async fn test_routing() -> anyhow::Result<()> {
    let pipeline = Arc::new(ScanPipeline::new());

    let req = Request::builder().method(Method::GET).uri("/nope").body(Body::empty())?;
    let (status, _) = send(&pipeline, req).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = Request::builder().method(Method::GET).uri("/predict").body(Body::empty())?;
    let (status, _) = send(&pipeline, req).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let req = Request::builder().method(Method::OPTIONS).uri("/predict").body(Body::empty())?;
    let (status, body) = send(&pipeline, req).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    Ok(())
}

#[tokio::test]
async fn test_declared_oversized_body_is_rejected() -> anyhow::Result<()> {
    // The declared length alone is enough to refuse the upload
    let pipeline = Arc::new(ScanPipeline::new());
    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header("content-type", "application/json")
        .header("content-length", (MAX_BODY_BYTES + 1).to_string())
        .body(Body::from("{}"))?;

    let (status, body) = send(&pipeline, req).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn test_streamed_oversized_body_is_rejected() -> anyhow::Result<()> {
    // No content-length header; the cap applies while reading
    let pipeline = Arc::new(ScanPipeline::new());
    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .body(Body::from(vec![b' '; MAX_BODY_BYTES + 1]))?;

    let (status, _) = send(&pipeline, req).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}
