use actix_web::{middleware, web, App, HttpServer};
use obesity_risk::config::Settings;
use obesity_risk::handlers::{self, AppState};
use obesity_risk::{load_predictor, telemetry};
use std::sync::Arc;
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    telemetry::init(&settings.logging);
    info!("Starting obesity risk prediction service...");

    let predictor = load_predictor(&settings.artifacts).map_err(|e| {
        error!(error = %e, "failed to load model artifacts");
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    info!(
        classifier = predictor.classifier_name(),
        categories = predictor.category_count(),
        "model artifacts loaded"
    );

    if settings.cors.is_permissive() {
        warn!("CORS allows any origin; set cors.allowed_origins to restrict it");
    }

    let state = AppState {
        predictor: Arc::new(predictor),
    };
    let cors_settings = settings.cors.clone();

    let (host, port) = (settings.server.host.clone(), settings.server.port);
    info!("Server running at http://{}:{}", host, port);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(handlers::cors(&cors_settings))
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    });

    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server.bind((host, port))?.run().await
}
