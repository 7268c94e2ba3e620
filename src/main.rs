use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

use eta_predictor::{
    EncoderRegistry, HistoryStore, OrderInput, PredictError, PredictionRecord, PredictionService,
    TorchModel, FEATURE_ORDER,
};

// ---------- Server state ----------

#[derive(Clone)]
struct AppState {
    service: Arc<PredictionService>,
    // Mutex serializes the read-modify-write on the shared history file
    // across concurrent sessions within this process.
    history: Arc<Mutex<HistoryStore>>,
}

// ---------- Handlers ----------

async fn predict(
    State(state): State<AppState>,
    Json(input): Json<OrderInput>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let record = {
        let mut history = state.history.lock();
        state
            .service
            .predict_and_record(&mut history, &input)
            .map_err(|e| {
                let status = match &e {
                    PredictError::UnknownCategory { .. } | PredictError::OutOfRange { .. } => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    PredictError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(json!({ "error": e.to_string() })))
            })?
    };

    Ok(Json(json!({
        "predicted_minutes": record.predicted_minutes,
        "time_period": record.time_period,
    })))
}

async fn list_history(State(state): State<AppState>) -> Json<Vec<PredictionRecord>> {
    let history = state.history.lock();
    Json(history.records().cloned().collect())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let model_path = std::env::var("MODEL_PATH").expect("MODEL_PATH not set");
    let meta_path = std::env::var("META_PATH").expect("META_PATH not set");
    let history_path =
        std::env::var("HISTORY_PATH").unwrap_or_else(|_| "pred_history.csv".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let model = TorchModel::load(&model_path, &meta_path)?;
    tracing::info!("loaded model; feature order: {:?}", FEATURE_ORDER);

    let service = PredictionService::new(EncoderRegistry::new(), Box::new(model));

    let history = HistoryStore::open(&history_path);
    tracing::info!("history at {}: {} records", history_path, history.len());

    let state = AppState {
        service: Arc::new(service),
        history: Arc::new(Mutex::new(history)),
    };

    let app = axum::Router::new()
        .route("/predict", post(predict))
        .route("/history", get(list_history))
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
