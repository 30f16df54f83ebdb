use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::StaffCredentials;
use crate::remote::RemoteFolderStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub remote: Arc<dyn RemoteFolderStore>,
    pub credentials: StaffCredentials,
}
