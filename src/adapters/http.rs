//! JSON-over-HTTP surface for the record service.

use crate::core::record_service::RecordService;
use crate::domain::model::{CarHistory, CarSummary, ClaimCreated, InsuranceValidity, NewClaim};
use crate::utils::error::{ErrorCategory, InsuranceError};
use crate::utils::validation::{validate_range, validate_required_field};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::json;

const MIN_QUERY_YEAR: i32 = 1900;
const MAX_QUERY_YEAR: i32 = 2100;

impl IntoResponse for InsuranceError {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Input => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.user_friendly_message() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, InsuranceError>;

#[derive(Debug, Deserialize)]
struct ValidityQuery {
    date: Option<String>,
}

fn parse_query_date(raw: &Option<String>) -> ApiResult<NaiveDate> {
    let raw = validate_required_field("date", raw)
        .map_err(|_| InsuranceError::invalid_input("date", "query parameter is required"))?;
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        InsuranceError::invalid_input("date", "invalid date format, use YYYY-MM-DD")
    })?;
    validate_range("date", date.year(), MIN_QUERY_YEAR, MAX_QUERY_YEAR)?;
    Ok(date)
}

async fn list_cars(State(service): State<RecordService>) -> ApiResult<Json<Vec<CarSummary>>> {
    Ok(Json(service.list_cars().await?))
}

async fn insurance_valid(
    State(service): State<RecordService>,
    Path(car_id): Path<i64>,
    Query(query): Query<ValidityQuery>,
) -> ApiResult<Json<InsuranceValidity>> {
    let date = parse_query_date(&query.date)?;
    let valid = service.is_insurance_valid(car_id, date).await?;
    Ok(Json(InsuranceValidity {
        car_id,
        date,
        valid,
    }))
}

async fn register_claim(
    State(service): State<RecordService>,
    Path(car_id): Path<i64>,
    payload: Result<Json<NewClaim>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(claim) =
        payload.map_err(|rejection| InsuranceError::invalid_input("body", rejection.body_text()))?;
    let id = service.register_claim(car_id, &claim).await?;
    let location = format!("/api/cars/{}/claims/{}", car_id, id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ClaimCreated { id }),
    ))
}

async fn car_history(
    State(service): State<RecordService>,
    Path(car_id): Path<i64>,
) -> ApiResult<Json<CarHistory>> {
    Ok(Json(service.car_history(car_id).await?))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the HTTP API router around a record service.
pub fn build_router(service: RecordService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/cars", get(list_cars))
        .route("/api/cars/{car_id}/insurance-valid", get(insurance_valid))
        .route("/api/cars/{car_id}/claims", post(register_claim))
        .route("/api/cars/{car_id}/history", get(car_history))
        .with_state(service)
}
