//! HTTP API server for cosmos-rs
//!
//! Routes are thin adapters over the telemetry store, the anomaly detector
//! and the weather service.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::{
    config::CosmosConfig,
    error::{Error, Result},
    monitoring::{
        Analysis, AnalysisResult, AnomalyAlert, AnomalyAlertTracker, SlidingWindowAnomalyDetector,
    },
    telemetry::{
        load_sample_readings, GeneratorConfig, RandomTelemetryGenerator, Reading, ReadingSource,
        SimulationController, TelemetrySnapshot, TelemetryStore,
    },
    weather::{HttpWeatherFetcher, PlanetWeather, WeatherService},
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: TelemetryStore,
    pub detector: Arc<SlidingWindowAnomalyDetector>,
    pub simulation: SimulationController,
    pub alerts: Arc<Mutex<AnomalyAlertTracker>>,
    pub weather: WeatherService,
}

impl AppState {
    pub fn new(
        store: TelemetryStore,
        detector: SlidingWindowAnomalyDetector,
        simulation: SimulationController,
        weather: WeatherService,
    ) -> Self {
        Self {
            store,
            detector: Arc::new(detector),
            simulation,
            alerts: Arc::new(Mutex::new(AnomalyAlertTracker::default())),
            weather,
        }
    }

    /// Build the full application state from configuration
    ///
    /// The store is seeded from `telemetry.sample_path` when set, otherwise with
    /// `telemetry.seed_readings` generated readings.
    pub fn from_config(config: &CosmosConfig) -> Result<Self> {
        let telemetry = &config.telemetry;
        let mut generator = RandomTelemetryGenerator::new(GeneratorConfig::default());

        let seed: Vec<Reading> = match &telemetry.sample_path {
            Some(path) => {
                let readings = load_sample_readings(path)?;
                info!(path = %path.display(), count = readings.len(), "sample telemetry loaded");
                readings
            }
            None => (0..telemetry.seed_readings)
                .map(|_| generator.next_reading())
                .collect(),
        };

        let store = TelemetryStore::with_readings(telemetry.max_readings, seed);
        let simulation =
            SimulationController::new(store.clone(), Box::new(generator), telemetry.interval());

        let fetcher = HttpWeatherFetcher::new(std::time::Duration::from_secs(
            config.weather.timeout_secs,
        ))?;
        let weather = WeatherService::new(config.weather.clone(), Arc::new(fetcher));

        Ok(Self::new(
            store,
            SlidingWindowAnomalyDetector::new(config.detector),
            simulation,
            weather,
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub z_score: f64,
    pub deviation: f64,
    pub window_size: usize,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalysisBody {
    Complete(AnalysisResult),
    Insufficient {
        message: &'static str,
        required: usize,
        available: usize,
    },
}

impl From<Analysis> for AnalysisBody {
    fn from(analysis: Analysis) -> Self {
        match analysis {
            Analysis::Complete(result) => AnalysisBody::Complete(result),
            Analysis::Insufficient {
                required,
                available,
            } => AnalysisBody::Insufficient {
                message: "Insufficient data for full analysis",
                required,
                available,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub reading: Reading,
    pub analysis: AnalysisBody,
    pub thresholds: Thresholds,
}

/// Build the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/telemetry", get(get_telemetry))
        .route("/api/telemetry/analyze", get(analyze_telemetry))
        .route("/api/telemetry/anomalies", get(list_anomalies))
        .route("/api/telemetry/next", post(next_reading))
        .route("/api/telemetry/start-simulation", post(start_simulation))
        .route("/api/telemetry/stop-simulation", post(stop_simulation))
        .route("/api/planets", get(list_planets))
        .route("/api/planets/{planet}", get(planet_weather))
        .route("/api/earth/location/{location}", get(earth_location))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until Ctrl-C
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let simulation = state.simulation.clone();
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("🚀 Telemetry server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    simulation.stop().await;
    info!("👋 server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_telemetry(State(state): State<AppState>) -> Json<TelemetrySnapshot> {
    Json(state.store.snapshot().await)
}

async fn analyze_telemetry(State(state): State<AppState>) -> Result<Json<AnalyzeResponse>> {
    let window = state.detector.window_size();
    let (latest, preceding) = match state.store.latest_with_preceding(window).await {
        Some((latest, preceding)) if !preceding.is_empty() => (latest, preceding),
        _ => {
            return Err(Error::InsufficientData(
                "at least 2 readings are required".to_string(),
            ))
        }
    };

    let analysis = state.detector.analyze(&latest, &preceding);
    match &analysis {
        Analysis::Complete(result) => {
            debug!(
                reading_id = %latest.id,
                z_score = result.z_score,
                deviation = result.deviation_ratio,
                is_anomaly = result.is_anomaly,
                "reading analyzed"
            );
            state.alerts.lock().await.observe(&latest, result);
        }
        Analysis::Insufficient { available, .. } => {
            debug!(available, "not enough history for analysis");
        }
    }

    let config = state.detector.config();
    Ok(Json(AnalyzeResponse {
        reading: latest,
        analysis: analysis.into(),
        thresholds: Thresholds {
            z_score: config.z_score_threshold,
            deviation: config.deviation_threshold,
            window_size: config.window_size,
        },
    }))
}

async fn list_anomalies(State(state): State<AppState>) -> Json<Vec<AnomalyAlert>> {
    Json(state.alerts.lock().await.recent())
}

async fn next_reading(State(state): State<AppState>) -> Result<Json<TelemetrySnapshot>> {
    Ok(Json(state.store.advance_replay().await?))
}

async fn start_simulation(State(state): State<AppState>) -> Json<Value> {
    let status = state.simulation.start().await;
    Json(json!({ "status": status.message() }))
}

async fn stop_simulation(State(state): State<AppState>) -> Json<Value> {
    let status = state.simulation.stop().await;
    Json(json!({ "status": status.message() }))
}

async fn list_planets(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    Json(state.weather.planets())
}

async fn planet_weather(
    State(state): State<AppState>,
    Path(planet): Path<String>,
) -> Result<Json<PlanetWeather>> {
    Ok(Json(state.weather.fetch_planet(&planet).await?))
}

async fn earth_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<Json<PlanetWeather>> {
    Ok(Json(state.weather.fetch_earth_location(&location).await?))
}
