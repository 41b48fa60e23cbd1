use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{AppError, PredictionError};
use crate::models::*;
use crate::prediction;
use crate::AppState;

pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

pub async fn predict(
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(request) = payload?;
    let lookback = request.effective_lookback();

    match prediction::predict_from_strings(&request.past_starts, lookback) {
        Ok(result) => {
            tracing::debug!(
                dates = request.past_starts.len(),
                lookback,
                predicted = %result.predicted_date,
                "prediction computed"
            );
            Ok(Json(result.into()))
        }
        Err(err) => {
            match &err {
                PredictionError::Validation(v) => {
                    tracing::warn!(reason = %v, "rejected prediction input");
                }
                PredictionError::Internal(msg) => {
                    tracing::error!("prediction failed: {}", msg);
                }
            }
            Err(err.into())
        }
    }
}

pub async fn initial_message(State(state): State<AppState>) -> Json<ChatResponse> {
    Json(ChatResponse {
        response: state.chat.welcome().await,
    })
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload?;
    let response = state.chat.reply(&request.message).await?;
    Ok(Json(ChatResponse { response }))
}
