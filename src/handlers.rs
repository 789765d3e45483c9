use crate::date_key::DateKey;
use crate::errors::AppError;
use crate::models::{
    AdjustRequest, AdjustResponse, ImportResponse, Item, ItemId, NewItemRequest, RenameRequest,
    SummaryResponse,
};
use crate::progress::{build_summary_at, item_percent_at, overall_percent_at};
use crate::state::AppState;
use crate::storage::export_filename;
use crate::theme::ThemeBody;
use crate::ui::render_index;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = DateKey::today();
    let tracker = state.tracker.lock().await;
    let percent = overall_percent_at(tracker.items(), today);
    Html(render_index(today, percent, tracker.theme()))
}

pub async fn list_items(State(state): State<AppState>) -> Json<Vec<Item>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.items().to_vec())
}

pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let today = DateKey::today();
    let mut tracker = state.tracker.lock().await;
    let notice = tracker.take_notice();
    Json(build_summary_at(today, tracker.items(), notice))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItemRequest>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let mut tracker = state.tracker.lock().await;
    let item = tracker
        .add(payload.kind, &payload.name, payload.target, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn adjust_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AdjustRequest>,
) -> Result<Json<AdjustResponse>, AppError> {
    let today = DateKey::today();
    let mut tracker = state.tracker.lock().await;
    let (item, adjustment) = tracker
        .adjust(&ItemId::from(id), payload.delta, today)
        .await?;
    Ok(Json(AdjustResponse {
        percent: item_percent_at(&item, today),
        count: adjustment.count,
        reached_target: adjustment.reached_target,
        item,
    }))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<Item>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let item = tracker
        .rename(&ItemId::from(id), &payload.name, payload.target)
        .await?;
    Ok(Json(item))
}

pub async fn archive_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.archive(&ItemId::from(id)).await?))
}

pub async fn restore_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.restore(&ItemId::from(id)).await?))
}

pub async fn delete_item(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let mut tracker = state.tracker.lock().await;
    tracker.remove(&ItemId::from(id)).await;
    StatusCode::NO_CONTENT
}

pub async fn export_items(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let filename = export_filename(DateKey::today());
    let tracker = state.tracker.lock().await;
    let body = tracker.export().map_err(AppError::internal)?;
    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, body))
}

pub async fn import_items(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let imported = tracker.import(&body).await.map_err(|err| {
        warn!("import rejected: {err}");
        AppError::from(err)
    })?;
    Ok(Json(ImportResponse { imported }))
}

pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    let tracker = state.tracker.lock().await;
    Json(ThemeBody {
        theme: tracker.theme(),
    })
}

pub async fn put_theme(
    State(state): State<AppState>,
    Json(payload): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, AppError> {
    let theme = payload
        .theme
        .ok_or_else(|| AppError::bad_request("theme must be 'light' or 'dark'"))?;
    let mut tracker = state.tracker.lock().await;
    let theme = tracker.set_theme(theme).await;
    Ok(Json(ThemeBody { theme: Some(theme) }))
}

pub async fn toggle_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    let mut tracker = state.tracker.lock().await;
    let theme = tracker.toggle_theme().await;
    Json(ThemeBody { theme: Some(theme) })
}
