use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::prediction::{self, Prediction};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub past_starts: Vec<String>,
    /// Missing, `null` or `0` all fall back to the default window.
    #[serde(default)]
    pub lookback: Option<u32>,
}

impl PredictRequest {
    pub fn effective_lookback(&self) -> usize {
        match self.lookback {
            Some(n) if n > 0 => n as usize,
            _ => prediction::DEFAULT_LOOKBACK,
        }
    }
}

/// Prediction as returned to clients: dates as `YYYY-MM-DD`, statistics
/// rounded to one decimal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub predicted_date: NaiveDate,
    pub mean_cycle: f64,
    pub std_dev: f64,
    pub ci_lower: NaiveDate,
    pub ci_upper: NaiveDate,
    pub fertile_window_start: NaiveDate,
    pub fertile_window_end: NaiveDate,
    pub note: Option<String>,
}

impl From<Prediction> for PredictResponse {
    fn from(p: Prediction) -> Self {
        Self {
            predicted_date: p.predicted_date,
            mean_cycle: prediction::round_one_decimal(p.mean_cycle),
            std_dev: prediction::round_one_decimal(p.std_dev),
            ci_lower: p.ci_lower,
            ci_upper: p.ci_upper,
            fertile_window_start: p.fertile_window_start,
            fertile_window_end: p.fertile_window_end,
            note: p.note.map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
            message: "Hayya.AI Backend is running".into(),
        }
    }
}
