use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::HttpBody;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH,
    CONTENT_TYPE,
};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use log::{error, info, warn};
use serde::Serialize;

use crate::error::ScanError;
use crate::pipeline::ScanPipeline;
use crate::wire::{ErrorResponse, HealthResponse, PredictRequest, PredictionResponse, SERVICE_NAME};

/// Largest `/predict` body accepted, in bytes
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    let (status, payload) = match serde_json::to_vec(body) {
        Ok(payload) => (status, payload),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{{\"error\":\"Failed to encode response: {}\"}}", e).into_bytes(),
        ),
    };

    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response<Body> {
    json_response(status, &ErrorResponse { error: message.into() })
}

fn with_cors(mut response: Response<Body>) -> Response<Body> {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    response
}

fn health(pipeline: &ScanPipeline) -> Response<Body> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            status: "healthy",
            service: SERVICE_NAME,
            generic_model: pipeline.has_generic_classifier(),
            custom_model: pipeline.has_custom_classifier(),
        },
    )
}

fn payload_too_large() -> Response<Body> {
    error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!("Request body exceeds {} bytes", MAX_BODY_BYTES),
    )
}

/// Collect the body, stopping as soon as it passes `MAX_BODY_BYTES`
async fn read_body(req: Request<Body>) -> Result<Vec<u8>, Response<Body>> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > MAX_BODY_BYTES as u64) {
        return Err(payload_too_large());
    }

    let mut body = req.into_body();
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Failed to read request body: {}", e)))?;
        if buf.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(payload_too_large());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn predict(req: Request<Body>, pipeline: Arc<ScanPipeline>) -> Response<Body> {
    let body = match read_body(req).await {
        Ok(body) => body,
        Err(response) => {
            warn!("Rejected request body");
            return response;
        }
    };

    let image = match serde_json::from_slice::<PredictRequest>(&body) {
        Ok(PredictRequest { image: Some(image) }) if !image.trim().is_empty() => image,
        Ok(_) | Err(_) => return error_response(StatusCode::BAD_REQUEST, "No image data provided"),
    };

    // Image work is CPU bound; keep it off the reactor threads
    let outcome = tokio::task::spawn_blocking(move || pipeline.scan_base64(&image)).await;

    match outcome {
        Ok(Ok(result)) => json_response(StatusCode::OK, &PredictionResponse::from(&result)),
        Ok(Err(e)) => {
            match &e {
                ScanError::InvalidInput(_) => warn!("Rejected request: {}", e),
                ScanError::Internal(_) => error!("Error in prediction: {:#}", e),
            }
            let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, e.to_string())
        }
        Err(e) => {
            error!("Prediction task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Route one request; never fails, errors become JSON bodies
pub async fn handle_request(req: Request<Body>, pipeline: Arc<ScanPipeline>) -> Result<Response<Body>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/health") => health(&pipeline),
        (&Method::POST, "/predict") => predict(req, pipeline).await,
        (&Method::OPTIONS, _) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::NO_CONTENT;
            response
        }
        (_, "/health") | (_, "/predict") => error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
        _ => error_response(StatusCode::NOT_FOUND, "Not found"),
    };

    Ok(with_cors(response))
}

/// Serve until Ctrl-C
pub async fn serve(addr: SocketAddr, pipeline: ScanPipeline) -> anyhow::Result<()> {
    let pipeline = Arc::new(pipeline);

    let make_svc = make_service_fn(move |_| {
        let pipeline = Arc::clone(&pipeline);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle_request(req, Arc::clone(&pipeline))))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?
        .serve(make_svc);

    info!("Cocolumber detection service listening on http://{}", server.local_addr());

    server
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
