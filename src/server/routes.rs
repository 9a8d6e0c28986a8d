//! Request handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::auth::CurrentUser;
use super::error::ApiError;
use super::{run_blocking, SharedState};
use crate::cards::{Card, CardInput, DueCard, ReviewedCard};
use crate::service::Dashboard;
use crate::users::{Credentials, Session, User};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub q: Option<String>,
    pub today: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TodayQuery {
    pub today: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub outcome: String,
    #[serde(default)]
    pub today: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueue {
    pub total: usize,
    pub cards: Vec<DueCard>,
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::MalformedPayload(rejection.body_text()))
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::MalformedPayload(rejection.body_text()))
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::MalformedPayload(rejection.body_text()))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn register(
    State(state): State<SharedState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let credentials = payload(body)?;
    let tracker = state.tracker.clone();
    let user =
        run_blocking(move || tracker.register(&credentials.email, &credentials.password)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<SharedState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let credentials = payload(body)?;
    let tracker = state.tracker.clone();
    let session =
        run_blocking(move || tracker.login(&credentials.email, &credentials.password)).await?;
    Ok(Json(session))
}

pub async fn logout(
    State(state): State<SharedState>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let tracker = state.tracker.clone();
    run_blocking(move || tracker.logout(&current.token)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dashboard(
    State(state): State<SharedState>,
    current: CurrentUser,
    params: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<Dashboard>, ApiError> {
    let query = query(params)?;
    let tracker = state.tracker.clone();
    let dashboard = run_blocking(move || {
        tracker.dashboard(current.user.id, query.q.as_deref(), query.today.as_deref())
    })
    .await?;
    Ok(Json(dashboard))
}

pub async fn add_card(
    State(state): State<SharedState>,
    current: CurrentUser,
    params: Result<Query<TodayQuery>, QueryRejection>,
    body: Result<Json<CardInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    let query = query(params)?;
    let input = payload(body)?;
    let tracker = state.tracker.clone();
    let card =
        run_blocking(move || tracker.add_card(current.user.id, input, query.today.as_deref()))
            .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn delete_card(
    State(state): State<SharedState>,
    current: CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let card_id = path_id(path)?;
    let tracker = state.tracker.clone();
    run_blocking(move || tracker.delete_card(current.user.id, card_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn review_queue(
    State(state): State<SharedState>,
    current: CurrentUser,
    params: Result<Query<TodayQuery>, QueryRejection>,
) -> Result<Json<ReviewQueue>, ApiError> {
    let query = query(params)?;
    let tracker = state.tracker.clone();
    let cards =
        run_blocking(move || tracker.review_queue(current.user.id, query.today.as_deref()))
            .await?;
    Ok(Json(ReviewQueue {
        total: cards.len(),
        cards,
    }))
}

pub async fn review_card(
    State(state): State<SharedState>,
    current: CurrentUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewedCard>, ApiError> {
    let card_id = path_id(path)?;
    let request = payload(body)?;
    let tracker = state.tracker.clone();
    let card = run_blocking(move || {
        tracker.review(
            current.user.id,
            card_id,
            &request.outcome,
            request.today.as_deref(),
            request.expected_version,
        )
    })
    .await?;
    Ok(Json(card))
}
