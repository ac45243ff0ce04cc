use std::sync::Arc;

use actix_cors::Cors;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::config::CorsSettings;
use crate::error::ServiceError;
use crate::models::{HealthResponse, ObesityRiskRequest};
use crate::predictor::RiskPredictor;

/// Shared by every worker; nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<RiskPredictor>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource(["/predict_obesity_risk/", "/predict_obesity_risk"])
                .route(web::post().to(predict_obesity_risk)),
        )
        .service(web::resource("/health").route(web::get().to(health)));
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

/// Missing or mistyped fields are a 422; anything that is not even JSON is a 400.
fn handle_json_payload_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!(path = req.path(), error = %err, "rejected payload");

    let (kind, status) = match &err {
        JsonPayloadError::Deserialize(e) if e.is_data() => {
            ("validation_error", StatusCode::UNPROCESSABLE_ENTITY)
        }
        _ => ("invalid_json", StatusCode::BAD_REQUEST),
    };

    ServiceError::Validation {
        kind,
        message: err.to_string(),
        status,
    }
    .into()
}

pub fn cors(settings: &CorsSettings) -> Cors {
    if settings.is_permissive() {
        return Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();
    }

    settings
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

pub async fn predict_obesity_risk(
    state: web::Data<AppState>,
    payload: web::Json<ObesityRiskRequest>,
) -> Result<HttpResponse, ServiceError> {
    let request_id = Uuid::new_v4();
    let request = payload.into_inner();
    tracing::info!(%request_id, payload = ?request, "received payload");

    let predictor = Arc::clone(&state.predictor);
    let outcome = web::block(move || predictor.handle(&request))
        .await
        .map_err(|e| {
            tracing::error!(%request_id, error = %e, "prediction task failed");
            ServiceError::Internal(e.to_string())
        })?;

    match outcome {
        Ok(response) => {
            tracing::info!(%request_id, ?response, "sending response");
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            tracing::error!(%request_id, error = %e, "prediction failed");
            Err(e.into())
        }
    }
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: state.predictor.classifier_name().to_string(),
        categories: state.predictor.category_count(),
    })
}
