//! Remote folder store client. The remote side speaks the same REST
//! surface this service exposes, so records travel as-is.

use std::env;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{ExamFolder, Timetable};

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
}

impl RemoteConfig {
    /// Reads `EXAMPILOT_REMOTE_URL`. Unset means the remote store is
    /// disabled and every record stays local.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("EXAMPILOT_REMOTE_URL").ok()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return None;
        }
        Some(Self { base_url })
    }
}

#[async_trait]
pub trait RemoteFolderStore: Send + Sync {
    async fn folders_for_user(&self, user_id: &str) -> Result<Vec<ExamFolder>, AppError>;
    async fn create_folder(&self, folder: &ExamFolder) -> Result<ExamFolder, AppError>;
    async fn update_folder(
        &self,
        folder_id: &str,
        folder: &ExamFolder,
    ) -> Result<ExamFolder, AppError>;
    async fn delete_folder(&self, folder_id: &str) -> Result<(), AppError>;
    async fn create_with_timetable(
        &self,
        user_id: &str,
        timetable: &Timetable,
    ) -> Result<ExamFolder, AppError>;
    async fn add_timetable(
        &self,
        folder_id: &str,
        timetable: &Timetable,
    ) -> Result<ExamFolder, AppError>;
    async fn update_timetable(
        &self,
        folder_id: &str,
        timetable_id: &str,
        timetable: &Timetable,
    ) -> Result<ExamFolder, AppError>;
    async fn delete_timetable(
        &self,
        folder_id: &str,
        timetable_id: &str,
    ) -> Result<ExamFolder, AppError>;
}

pub struct HttpRemoteStore {
    client: Client,
    config: RemoteConfig,
}

impl HttpRemoteStore {
    pub fn new(config: RemoteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, AppError> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::RemoteUnavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteUnavailable(format!(
                "remote store error {}: {}",
                status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::RemoteUnavailable(format!("invalid remote response: {}", e)))
    }
}

#[async_trait]
impl RemoteFolderStore for HttpRemoteStore {
    async fn folders_for_user(&self, user_id: &str) -> Result<Vec<ExamFolder>, AppError> {
        self.request::<(), _>(
            Method::GET,
            &format!("/api/exam-folders/user/{}", user_id),
            None,
        )
        .await
    }

    async fn create_folder(&self, folder: &ExamFolder) -> Result<ExamFolder, AppError> {
        self.request(Method::POST, "/api/exam-folders", Some(folder))
            .await
    }

    async fn update_folder(
        &self,
        folder_id: &str,
        folder: &ExamFolder,
    ) -> Result<ExamFolder, AppError> {
        self.request(
            Method::PUT,
            &format!("/api/exam-folders/{}", folder_id),
            Some(folder),
        )
        .await
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .request::<(), _>(
                Method::DELETE,
                &format!("/api/exam-folders/{}", folder_id),
                None,
            )
            .await?;
        Ok(())
    }

    async fn create_with_timetable(
        &self,
        user_id: &str,
        timetable: &Timetable,
    ) -> Result<ExamFolder, AppError> {
        self.request(
            Method::POST,
            &format!("/api/exam-folders/create-with-timetable?userId={}", user_id),
            Some(timetable),
        )
        .await
    }

    async fn add_timetable(
        &self,
        folder_id: &str,
        timetable: &Timetable,
    ) -> Result<ExamFolder, AppError> {
        self.request(
            Method::POST,
            &format!("/api/exam-folders/{}/timetables", folder_id),
            Some(timetable),
        )
        .await
    }

    async fn update_timetable(
        &self,
        folder_id: &str,
        timetable_id: &str,
        timetable: &Timetable,
    ) -> Result<ExamFolder, AppError> {
        self.request(
            Method::PUT,
            &format!("/api/exam-folders/{}/timetables/{}", folder_id, timetable_id),
            Some(timetable),
        )
        .await
    }

    async fn delete_timetable(
        &self,
        folder_id: &str,
        timetable_id: &str,
    ) -> Result<ExamFolder, AppError> {
        self.request::<(), _>(
            Method::DELETE,
            &format!("/api/exam-folders/{}/timetables/{}", folder_id, timetable_id),
            None,
        )
        .await
    }
}

/// Stand-in used when no remote is configured. Every call reports the
/// store as unavailable, which routes persistence to the local fallback.
pub struct NoopRemoteStore;

#[async_trait]
impl RemoteFolderStore for NoopRemoteStore {
    async fn folders_for_user(&self, _user_id: &str) -> Result<Vec<ExamFolder>, AppError> {
        Err(disabled())
    }

    async fn create_folder(&self, _folder: &ExamFolder) -> Result<ExamFolder, AppError> {
        Err(disabled())
    }

    async fn update_folder(
        &self,
        _folder_id: &str,
        _folder: &ExamFolder,
    ) -> Result<ExamFolder, AppError> {
        Err(disabled())
    }

    async fn delete_folder(&self, _folder_id: &str) -> Result<(), AppError> {
        Err(disabled())
    }

    async fn create_with_timetable(
        &self,
        _user_id: &str,
        _timetable: &Timetable,
    ) -> Result<ExamFolder, AppError> {
        Err(disabled())
    }

    async fn add_timetable(
        &self,
        _folder_id: &str,
        _timetable: &Timetable,
    ) -> Result<ExamFolder, AppError> {
        Err(disabled())
    }

    async fn update_timetable(
        &self,
        _folder_id: &str,
        _timetable_id: &str,
        _timetable: &Timetable,
    ) -> Result<ExamFolder, AppError> {
        Err(disabled())
    }

    async fn delete_timetable(
        &self,
        _folder_id: &str,
        _timetable_id: &str,
    ) -> Result<ExamFolder, AppError> {
        Err(disabled())
    }
}

fn disabled() -> AppError {
    AppError::RemoteUnavailable("remote store is not configured".to_string())
}
