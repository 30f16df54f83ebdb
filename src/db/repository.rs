//! Local fallback store. Folders are kept one row each, with the
//! timetable list serialized into a JSON column.

use sqlx::{FromRow, SqlitePool};

use crate::error::AppError;
use crate::models::ExamFolder;

#[derive(Debug, FromRow)]
struct FolderRow {
    id: String,
    user_id: String,
    folder_name: String,
    description: Option<String>,
    timetables: String,
    created_at: String,
    updated_at: String,
}

impl FolderRow {
    fn into_folder(self) -> Result<ExamFolder, AppError> {
        Ok(ExamFolder {
            id: self.id,
            user_id: self.user_id,
            folder_name: self.folder_name,
            description: self.description,
            timetables: serde_json::from_str(&self.timetables)?,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

pub async fn fetch_folders_by_user(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ExamFolder>, AppError> {
    let rows = sqlx::query_as::<_, FolderRow>(
        "SELECT id, user_id, folder_name, description, timetables, created_at, updated_at \
         FROM exam_folders WHERE user_id = ? ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    rows.into_iter().map(FolderRow::into_folder).collect()
}

pub async fn find_folder_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<ExamFolder>, AppError> {
    let row = sqlx::query_as::<_, FolderRow>(
        "SELECT id, user_id, folder_name, description, timetables, created_at, updated_at \
         FROM exam_folders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    row.map(FolderRow::into_folder).transpose()
}

pub async fn insert_folder(db: &SqlitePool, folder: &ExamFolder) -> Result<(), AppError> {
    let timetables = serde_json::to_string(&folder.timetables)?;
    sqlx::query(
        "INSERT INTO exam_folders \
             (id, user_id, folder_name, description, timetables, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&folder.id)
    .bind(&folder.user_id)
    .bind(&folder.folder_name)
    .bind(&folder.description)
    .bind(timetables)
    .bind(folder.created_at.as_deref().unwrap_or_default())
    .bind(folder.updated_at.as_deref().unwrap_or_default())
    .execute(db)
    .await?;

    Ok(())
}

/// Returns false when no row matched the folder id.
pub async fn update_folder(db: &SqlitePool, folder: &ExamFolder) -> Result<bool, AppError> {
    let timetables = serde_json::to_string(&folder.timetables)?;
    let result = sqlx::query(
        "UPDATE exam_folders \
         SET user_id = ?, folder_name = ?, description = ?, timetables = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&folder.user_id)
    .bind(&folder.folder_name)
    .bind(&folder.description)
    .bind(timetables)
    .bind(folder.updated_at.as_deref().unwrap_or_default())
    .bind(&folder.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn upsert_folder(db: &SqlitePool, folder: &ExamFolder) -> Result<(), AppError> {
    if update_folder(db, folder).await? {
        return Ok(());
    }
    insert_folder(db, folder).await
}

pub async fn delete_folder(db: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM exam_folders WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
