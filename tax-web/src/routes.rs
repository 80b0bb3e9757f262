use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::calculations::Calculator;
use tax_core::{
    CalculationInput, CalculationRepository, FilingStatus, NewCalculationRecord, RequestMetadata,
    SaveCalculationResponse, TaxTables, TaxType,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::analytics::{AnalyticsSink, dispatch};
use crate::presentation::CalculationResponse;
use crate::utils::deserialize_lenient_amount;

/// Shared, read-only handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<TaxTables>,
    pub repository: Arc<dyn CalculationRepository>,
    /// `None` disables recording from `/api/calculate`.
    pub analytics: Option<Arc<dyn AnalyticsSink>>,
}

/// JSON error body: `{ "error": "..." }`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unprocessable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unprocessable(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/calculate", post(calculate))
        .route("/api/save-calculation", post(save_calculation))
        .route("/api/options", get(options))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Form submission. Amounts may be numbers or strings; anything that does
/// not parse counts as missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub income: Option<Decimal>,
    #[serde(default)]
    pub filing_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub tax_amount: Option<Decimal>,
    #[serde(default)]
    pub tax_type: Option<String>,
}

impl CalculateRequest {
    /// `Ok(None)` when the amount the selected mode needs is missing.
    pub fn into_input(self) -> Result<Option<CalculationInput>, ApiError> {
        let tax_type = match self.tax_type.as_deref().map(str::trim) {
            None | Some("") => TaxType::default(),
            Some(code) => TaxType::parse(code)
                .ok_or_else(|| ApiError::Unprocessable(format!("unknown tax type '{code}'")))?,
        };

        match self.mode.as_deref().unwrap_or("income") {
            "income" => Ok(self.income.map(|income| CalculationInput::Income {
                income,
                filing_status: self
                    .filing_status
                    .as_deref()
                    .map(FilingStatus::parse_or_default)
                    .unwrap_or_default(),
                tax_type,
            })),
            "direct" => Ok(self
                .tax_amount
                .map(|tax_amount| CalculationInput::Direct {
                    tax_amount,
                    tax_type,
                })),
            other => Err(ApiError::BadRequest(format!("unknown mode '{other}'"))),
        }
    }
}

/// Client address from `CF-Connecting-IP`, then `X-Forwarded-For`, then
/// `unknown`; user agent from `User-Agent`.
pub fn request_metadata(headers: &HeaderMap) -> RequestMetadata {
    let header_text = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    RequestMetadata {
        ip_address: header_text("cf-connecting-ip")
            .or_else(|| header_text("x-forwarded-for"))
            .unwrap_or_else(|| "unknown".to_string()),
        user_agent: header_text(header::USER_AGENT.as_str()).unwrap_or_default(),
    }
}

async fn calculate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculationResponse>, ApiError> {
    let Json(request) = body?;
    let input = request
        .into_input()?
        .ok_or_else(|| ApiError::Unprocessable("enter an amount to calculate".to_string()))?;

    let result = Calculator::new(&state.tables)
        .calculate(&input)
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    if let Some(sink) = &state.analytics {
        let record = Calculator::record_for(&input, &result);
        dispatch(sink.clone(), record, request_metadata(&headers));
    }

    Ok(Json(CalculationResponse::new(&input, result)))
}

async fn save_calculation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<SaveCalculationResponse>) {
    let record: NewCalculationRecord = match serde_json::from_slice(&body) {
        Ok(record) => record,
        Err(error) => {
            tracing::error!(%error, "error saving calculation: unreadable body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SaveCalculationResponse::failed()),
            );
        }
    };

    let session_id = Uuid::new_v4().to_string();
    let metadata = request_metadata(&headers);
    match state
        .repository
        .save_calculation(&session_id, &record, &metadata)
        .await
    {
        Ok(stored) => {
            tracing::info!(id = stored.id, %session_id, "calculation saved");
            (StatusCode::OK, Json(SaveCalculationResponse::saved(session_id)))
        }
        Err(error) => {
            tracing::error!(%error, "error saving calculation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SaveCalculationResponse::failed()),
            )
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionEntry {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    pub filing_statuses: Vec<OptionEntry>,
    pub tax_types: Vec<OptionEntry>,
}

impl FormOptions {
    pub fn current() -> Self {
        Self {
            filing_statuses: FilingStatus::all()
                .iter()
                .map(|s| OptionEntry {
                    value: s.as_str().to_string(),
                    label: s.label().to_string(),
                })
                .collect(),
            tax_types: TaxType::all()
                .iter()
                .map(|t| OptionEntry {
                    value: t.as_str().to_string(),
                    label: t.form_label().to_string(),
                })
                .collect(),
        }
    }
}

async fn options() -> Json<FormOptions> {
    Json(FormOptions::current())
}
