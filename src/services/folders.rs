//! Folder persistence. Every successful write lands in the local store
//! first, so a generated timetable is never lost; the remote store is
//! then attempted and the caller is told which backend holds the record.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{ExamFolder, NewFolderRequest, Timetable, UpdateFolderRequest};
use crate::remote::RemoteFolderStore;

/// Which store is known to hold the record after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Remote,
    Local,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stored<T> {
    #[serde(flatten)]
    pub record: T,
    pub storage: StorageBackend,
}

pub struct FolderService {
    db: SqlitePool,
    remote: Arc<dyn RemoteFolderStore>,
}

impl FolderService {
    pub fn new(db: SqlitePool, remote: Arc<dyn RemoteFolderStore>) -> Self {
        Self { db, remote }
    }

    pub async fn folders_for_user(
        &self,
        user_id: &str,
    ) -> Result<Stored<Vec<ExamFolder>>, AppError> {
        match self.remote.folders_for_user(user_id).await {
            Ok(folders) => {
                // Mirror the remote listing so offline reads stay current.
                for folder in &folders {
                    repository::upsert_folder(&self.db, folder).await?;
                }
                Ok(Stored {
                    record: folders,
                    storage: StorageBackend::Remote,
                })
            }
            Err(err) => {
                warn!("remote folder listing failed, serving local copies: {err}");
                Ok(Stored {
                    record: repository::fetch_folders_by_user(&self.db, user_id).await?,
                    storage: StorageBackend::Local,
                })
            }
        }
    }

    pub async fn create_folder(
        &self,
        req: NewFolderRequest,
    ) -> Result<Stored<ExamFolder>, AppError> {
        let now = Utc::now().to_rfc3339();
        let folder = ExamFolder {
            id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            folder_name: req.folder_name,
            description: req.description,
            timetables: req.timetables,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };

        repository::insert_folder(&self.db, &folder).await?;
        let storage = match self.remote.create_folder(&folder).await {
            Ok(_) => StorageBackend::Remote,
            Err(err) => {
                warn!("folder {} kept locally only: {err}", folder.id);
                StorageBackend::Local
            }
        };

        Ok(Stored {
            record: folder,
            storage,
        })
    }

    pub async fn update_folder(
        &self,
        folder_id: &str,
        req: UpdateFolderRequest,
    ) -> Result<Stored<ExamFolder>, AppError> {
        let mut folder = repository::find_folder_by_id(&self.db, folder_id)
            .await?
            .ok_or(AppError::NotFound)?;

        folder.folder_name = req.folder_name;
        folder.description = req.description;
        folder.timetables = req.timetables;
        folder.updated_at = Some(Utc::now().to_rfc3339());

        self.save(folder).await
    }

    pub async fn delete_folder(&self, folder_id: &str) -> Result<StorageBackend, AppError> {
        if !repository::delete_folder(&self.db, folder_id).await? {
            return Err(AppError::NotFound);
        }
        match self.remote.delete_folder(folder_id).await {
            Ok(()) => Ok(StorageBackend::Remote),
            Err(err) => {
                warn!("folder {folder_id} removed locally only: {err}");
                Ok(StorageBackend::Local)
            }
        }
    }

    /// The one-click "store this generation" path: a new folder named
    /// after the timetable, uniquified against the user's existing
    /// folder names.
    pub async fn create_folder_for_timetable(
        &self,
        user_id: &str,
        timetable: Timetable,
    ) -> Result<Stored<ExamFolder>, AppError> {
        let timetable = prepared(timetable);
        match self.remote.create_with_timetable(user_id, &timetable).await {
            Ok(folder) => {
                // Keep a local backup of what the remote stored.
                repository::upsert_folder(&self.db, &folder).await?;
                Ok(Stored {
                    record: folder,
                    storage: StorageBackend::Remote,
                })
            }
            Err(err) => {
                warn!("timetable for {user_id} stored locally only: {err}");
                let existing = repository::fetch_folders_by_user(&self.db, user_id).await?;
                let folder_name = unique_folder_name(&timetable.table_name, &existing);

                let now = Utc::now().to_rfc3339();
                let folder = ExamFolder {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    folder_name,
                    description: Some(format!("Exam folder for {}", timetable.table_name)),
                    timetables: vec![timetable],
                    created_at: Some(now.clone()),
                    updated_at: Some(now),
                };
                repository::insert_folder(&self.db, &folder).await?;
                Ok(Stored {
                    record: folder,
                    storage: StorageBackend::Local,
                })
            }
        }
    }

    pub async fn add_timetable(
        &self,
        folder_id: &str,
        timetable: Timetable,
    ) -> Result<Stored<ExamFolder>, AppError> {
        let mut folder = repository::find_folder_by_id(&self.db, folder_id)
            .await?
            .ok_or(AppError::NotFound)?;

        folder.timetables.push(prepared(timetable));
        folder.updated_at = Some(Utc::now().to_rfc3339());

        self.save(folder).await
    }

    pub async fn update_timetable(
        &self,
        folder_id: &str,
        timetable_id: &str,
        mut timetable: Timetable,
    ) -> Result<Stored<ExamFolder>, AppError> {
        let mut folder = repository::find_folder_by_id(&self.db, folder_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let slot = folder
            .timetables
            .iter_mut()
            .find(|existing| existing.id == timetable_id)
            .ok_or(AppError::NotFound)?;

        timetable.id = timetable_id.to_string();
        if timetable.created_at.is_none() {
            timetable.created_at = slot.created_at.clone();
        }
        timetable.updated_at = Some(Utc::now().to_rfc3339());
        *slot = timetable;
        folder.updated_at = Some(Utc::now().to_rfc3339());

        self.save(folder).await
    }

    pub async fn remove_timetable(
        &self,
        folder_id: &str,
        timetable_id: &str,
    ) -> Result<Stored<ExamFolder>, AppError> {
        let mut folder = repository::find_folder_by_id(&self.db, folder_id)
            .await?
            .ok_or(AppError::NotFound)?;

        folder
            .timetables
            .retain(|timetable| timetable.id != timetable_id);
        folder.updated_at = Some(Utc::now().to_rfc3339());

        self.save(folder).await
    }

    /// Writes the folder locally, then pushes the full record to the
    /// remote store.
    async fn save(&self, folder: ExamFolder) -> Result<Stored<ExamFolder>, AppError> {
        repository::upsert_folder(&self.db, &folder).await?;
        let storage = match self.remote.update_folder(&folder.id, &folder).await {
            Ok(_) => StorageBackend::Remote,
            Err(err) => {
                warn!("folder {} updated locally only: {err}", folder.id);
                StorageBackend::Local
            }
        };

        Ok(Stored {
            record: folder,
            storage,
        })
    }
}

/// Assigns an id and timestamps to a timetable about to be stored.
fn prepared(mut timetable: Timetable) -> Timetable {
    if timetable.id.is_empty() {
        timetable.id = Uuid::new_v4().to_string();
    }
    let now = Utc::now().to_rfc3339();
    if timetable.created_at.is_none() {
        timetable.created_at = Some(now.clone());
    }
    timetable.updated_at = Some(now);
    timetable
}

fn unique_folder_name(base: &str, existing: &[ExamFolder]) -> String {
    let taken = |name: &str| existing.iter().any(|folder| folder.folder_name == name);
    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base} ({counter})");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_names_are_uniquified() {
        let folder = |name: &str| ExamFolder {
            id: "x".to_string(),
            user_id: "admin".to_string(),
            folder_name: name.to_string(),
            description: None,
            timetables: Vec::new(),
            created_at: None,
            updated_at: None,
        };

        assert_eq!(unique_folder_name("Finals", &[]), "Finals");
        assert_eq!(
            unique_folder_name("Finals", &[folder("Finals")]),
            "Finals (1)"
        );
        assert_eq!(
            unique_folder_name("Finals", &[folder("Finals"), folder("Finals (1)")]),
            "Finals (2)"
        );
    }
}
