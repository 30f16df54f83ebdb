use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{LoginRequest, LoginResponse};
use crate::error::AppError;
use crate::models::*;
use crate::scheduler;
use crate::scheduler::rng::RandomSessionRng;
use crate::services::{FolderService, StorageBackend, Stored};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/api/timetables/generate", post(generate_timetable))
        .route("/api/exam-folders", post(create_folder))
        .route("/api/exam-folders/user/{user_id}", get(list_folders))
        .route(
            "/api/exam-folders/{folder_id}",
            put(update_folder).delete(delete_folder),
        )
        .route(
            "/api/exam-folders/create-with-timetable",
            post(create_with_timetable),
        )
        .route("/api/exam-folders/{folder_id}/timetables", post(add_timetable))
        .route(
            "/api/exam-folders/{folder_id}/timetables/{timetable_id}",
            put(update_timetable).delete(delete_timetable),
        )
        .with_state(state)
}

fn folders(state: &AppState) -> FolderService {
    FolderService::new(state.db.clone(), state.remote.clone())
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if !state.credentials.verify(&req.username, &req.password) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        username: req.username,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTimetableResponse {
    timetable: Timetable,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

fn parse_window(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let parse = |raw: &str| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    match (parse(start), parse(end)) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(AppError::BadRequest(
            "Please select both a start and end date.".to_string(),
        )),
    }
}

async fn generate_timetable(
    Json(req): Json<GenerateTimetableRequest>,
) -> Result<Json<GenerateTimetableResponse>, AppError> {
    if req.table_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please enter a table name.".to_string(),
        ));
    }
    let (start_date, end_date) = parse_window(&req.start_date, &req.end_date)?;

    let generated = scheduler::generate_timetable(
        &req.subjects,
        start_date,
        end_date,
        req.day_gap,
        &mut RandomSessionRng::new(),
    )?;

    let now = Utc::now().to_rfc3339();
    let timetable = Timetable {
        id: Uuid::new_v4().to_string(),
        table_name: req.table_name.trim().to_string(),
        start_date: req.start_date,
        end_date: req.end_date,
        day_gap: req.day_gap,
        timetable: generated.days,
        created_at: Some(now.clone()),
        updated_at: Some(now),
    };

    Ok(Json(GenerateTimetableResponse {
        timetable,
        warning: generated.warning,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderListingResponse {
    folders: Vec<ExamFolder>,
    storage: StorageBackend,
}

async fn list_folders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<FolderListingResponse>, AppError> {
    let listing = folders(&state).folders_for_user(&user_id).await?;
    Ok(Json(FolderListingResponse {
        folders: listing.record,
        storage: listing.storage,
    }))
}

async fn create_folder(
    State(state): State<AppState>,
    Json(req): Json<NewFolderRequest>,
) -> Result<Json<Stored<ExamFolder>>, AppError> {
    let stored = folders(&state).create_folder(req).await?;
    Ok(Json(stored))
}

async fn update_folder(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
    Json(req): Json<UpdateFolderRequest>,
) -> Result<Json<Stored<ExamFolder>>, AppError> {
    let stored = folders(&state).update_folder(&folder_id, req).await?;
    Ok(Json(stored))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteFolderResponse {
    message: String,
    storage: StorageBackend,
}

async fn delete_folder(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
) -> Result<Json<DeleteFolderResponse>, AppError> {
    let storage = folders(&state).delete_folder(&folder_id).await?;
    Ok(Json(DeleteFolderResponse {
        message: "Exam folder deleted successfully".to_string(),
        storage,
    }))
}

#[derive(Debug, Deserialize)]
struct CreateWithTimetableParams {
    #[serde(rename = "userId")]
    user_id: String,
}

async fn create_with_timetable(
    State(state): State<AppState>,
    Query(params): Query<CreateWithTimetableParams>,
    Json(timetable): Json<Timetable>,
) -> Result<Json<Stored<ExamFolder>>, AppError> {
    let stored = folders(&state)
        .create_folder_for_timetable(&params.user_id, timetable)
        .await?;
    Ok(Json(stored))
}

async fn add_timetable(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
    Json(timetable): Json<Timetable>,
) -> Result<Json<Stored<ExamFolder>>, AppError> {
    let stored = folders(&state).add_timetable(&folder_id, timetable).await?;
    Ok(Json(stored))
}

async fn update_timetable(
    State(state): State<AppState>,
    Path((folder_id, timetable_id)): Path<(String, String)>,
    Json(timetable): Json<Timetable>,
) -> Result<Json<Stored<ExamFolder>>, AppError> {
    let stored = folders(&state)
        .update_timetable(&folder_id, &timetable_id, timetable)
        .await?;
    Ok(Json(stored))
}

async fn delete_timetable(
    State(state): State<AppState>,
    Path((folder_id, timetable_id)): Path<(String, String)>,
) -> Result<Json<Stored<ExamFolder>>, AppError> {
    let stored = folders(&state)
        .remove_timetable(&folder_id, &timetable_id)
        .await?;
    Ok(Json(stored))
}
