use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use pm_predictor::config::{Config, BINARY_MODEL, MULTI_MODEL};
use pm_predictor::error::PredictError;
use pm_predictor::model::{ModelStatus, OnnxModel};
use pm_predictor::render::{self, DisplayReport};
use pm_predictor::shaper;
use pm_predictor::types::{FeatureRecord, PredictionResult, TaskKind, FAILURE_CLASSES};

// ---------- Request/Response types ----------

// Named readings straight from the form; field names are the canonical
// feature names, so a malformed submission fails at deserialization.
#[derive(Deserialize, Debug)]
struct PredictIn {
    task: TaskKind,
    air_temperature: f32,
    process_temperature: f32,
    rotational_speed: f32,
    torque: f32,
    tool_wear: f32,
}

impl PredictIn {
    fn readings(&self) -> FeatureRecord {
        FeatureRecord::new([
            self.air_temperature,
            self.process_temperature,
            self.rotational_speed,
            self.torque,
            self.tool_wear,
        ])
    }
}

#[derive(Serialize)]
struct PredictOut {
    t: i64,
    task: TaskKind,
    result: PredictionResult,
    display: DisplayReport,
}

#[derive(Serialize)]
struct StatusOut {
    binary: ModelStatus,
    multi_class: ModelStatus,
}

// ---------- Server state ----------

#[derive(Clone)]
struct AppState {
    binary: Arc<OnnxModel>,
    multi: Arc<OnnxModel>,
}

impl AppState {
    fn model_for(&self, task: TaskKind) -> &OnnxModel {
        match task {
            TaskKind::Binary => &self.binary,
            TaskKind::MultiClass => &self.multi,
        }
    }
}

// ---------- Handlers ----------

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn status(State(state): State<AppState>) -> Json<StatusOut> {
    Json(StatusOut {
        binary: state.binary.status(),
        multi_class: state.multi.status(),
    })
}

async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictIn>,
) -> Result<Json<PredictOut>, PredictError> {
    tracing::debug!(
        "recv task={:?} air={} proc={} speed={} torque={} wear={}",
        payload.task,
        payload.air_temperature,
        payload.process_temperature,
        payload.rotational_speed,
        payload.torque,
        payload.tool_wear
    );

    let readings = payload.readings();
    let result = shaper::shape_result(state.model_for(payload.task), payload.task, &readings)?;
    let display = render::report(&result);

    let now_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as i64;
    Ok(Json(PredictOut {
        t: now_ms,
        task: payload.task,
        result,
        display,
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::from_env();

    let binary = OnnxModel::load(
        &cfg.model_path(BINARY_MODEL),
        &cfg.meta_path(BINARY_MODEL),
        2,
    )?;
    let multi = OnnxModel::load(
        &cfg.model_path(MULTI_MODEL),
        &cfg.meta_path(MULTI_MODEL),
        FAILURE_CLASSES.len(),
    )?;

    binary.warmup()?;
    multi.warmup()?;
    tracing::info!("warmup forward ok");

    let state = AppState {
        binary: Arc::new(binary),
        multi: Arc::new(multi),
    };

    let app = axum::Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/status", get(status))
        .route("/healthz", get(healthz))
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
