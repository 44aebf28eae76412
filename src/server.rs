//! HTTP endpoint exposing phrase generation at `POST /api/generate`.

use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};

use crate::context::GeneratorSource;
use crate::error::SlideError;
use crate::gateway::{generate_phrases, GenerationRequest};

/// Shared per-worker state.
pub struct AppState {
    /// Where each request gets its generator.
    pub source: GeneratorSource,
    /// Resolved model identifier.
    pub model: String,
}

/// Register the endpoint.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/generate")
            .route(web::post().to(generate))
            .default_service(web::to(method_not_allowed)),
    );
}

fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}

fn internal_error(error: &SlideError) -> HttpResponse {
    tracing::error!(error = %error, "generate request failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

async fn method_not_allowed() -> HttpResponse {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn generate(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    // Unparsable bodies are treated like empty ones.
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let Some(style) =
        payload.get("systemPrompt").and_then(Value::as_str).filter(|s| !s.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Missing systemPrompt");
    };
    let topic = payload.get("prompt").and_then(Value::as_str).map(str::to_string);

    let request = match GenerationRequest::new(style, topic) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let generator = match state.source.resolve() {
        Ok(generator) => generator,
        Err(e @ SlideError::MissingApiKey { .. }) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
        Err(e) => return internal_error(&e),
    };

    match generate_phrases(generator.as_ref(), &state.model, &request).await {
        Ok(phrases) => HttpResponse::Ok().json(json!({ "phrases": phrases.into_vec() })),
        Err(e) if e.is_upstream() => {
            tracing::error!(error = %e, "Gemini request failed");
            HttpResponse::BadGateway().json(json!({
                "error": "Gemini API error",
                "detail": e.upstream_detail().unwrap_or_default(),
            }))
        }
        Err(e) => internal_error(&e),
    }
}

fn format_bind_error(error: &std::io::Error, bind: &str) -> SlideError {
    if error.kind() == std::io::ErrorKind::AddrInUse {
        SlideError::Config(format!("{bind} is already in use; pass --bind or set [server] bind"))
    } else {
        SlideError::Config(format!("Failed to bind to {bind}: {error}"))
    }
}

/// Serve until interrupted.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(bind: &str, state: AppState) -> Result<(), SlideError> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new().app_data(state.clone()).wrap(Logger::default()).configure(routes)
    })
    .bind(bind)
    .map_err(|e| format_bind_error(&e, bind))?
    .run();

    tracing::info!(bind = %bind, "listening on http://{bind}/api/generate");
    server.await?;
    tracing::info!("server stopped");
    Ok(())
}
