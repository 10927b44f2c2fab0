use crate::auth::{self, bearer_token};
use crate::engine::DateRange;
use crate::errors::AppError;
use crate::models::{
    BonusRecord, Dashboard, LoginRequest, LoginResponse, MessageResponse, WeeklyRecord,
};
use crate::resource::Resource;
use crate::state::AppState;
use crate::stats::build_dashboard;
use crate::store::RecordStore;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

/// A resource the server exposes over CRUD routes.
pub trait Served: Resource {
    fn store(state: &AppState) -> &Arc<dyn RecordStore<Self>>;
}

impl Served for WeeklyRecord {
    fn store(state: &AppState) -> &Arc<dyn RecordStore<Self>> {
        &state.weekly
    }
}

impl Served for BonusRecord {
    fn store(state: &AppState) -> &Arc<dyn RecordStore<Self>> {
        &state.bonuses
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = auth::login(&state.admin, &state.tokens, &payload).await?;
    Ok(Json(response))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<MessageResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.tokens.revoke(token).await;
    }
    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}

pub async fn list<R: Served>(State(state): State<AppState>) -> Result<Json<Vec<R::Row>>, AppError> {
    let mut records = R::store(&state).get_all().await?;
    R::order(&mut records);
    Ok(Json(records.iter().map(R::to_row).collect()))
}

pub async fn create<R: Served>(
    State(state): State<AppState>,
    Json(row): Json<R::Row>,
) -> Result<(StatusCode, Json<R::Row>), AppError> {
    let fields = R::fields_from_row(row);
    R::validate(&fields)?;
    let record = R::store(&state).create(fields).await?;
    Ok((StatusCode::CREATED, Json(record.to_row())))
}

pub async fn update<R: Served>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(row): Json<R::Row>,
) -> Result<Json<R::Row>, AppError> {
    let fields = R::fields_from_row(row);
    R::validate(&fields)?;
    let record = R::store(&state).update(&id, fields).await?;
    Ok(Json(record.to_row()))
}

pub async fn delete<R: Served>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    R::store(&state).delete(&id).await?;
    Ok(Json(MessageResponse {
        message: format!("{} deleted successfully", R::LABEL),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl StatsQuery {
    /// `to` alone selects nothing; the range starts only once `from` is set.
    pub fn range(&self) -> Option<DateRange> {
        self.from.map(|from| DateRange { from, to: self.to })
    }
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let weekly = state.weekly.get_all().await?;
    let bonuses = state.bonuses.get_all().await?;
    Ok(Json(build_dashboard(&weekly, &bonuses, query.range().as_ref())))
}
