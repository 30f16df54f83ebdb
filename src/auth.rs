//! Staff login gate. One static credential pair; authentication only
//! selects the persistence path, nothing else depends on it.

use std::env;

use serde::{Deserialize, Serialize};

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin123";

#[derive(Clone, Debug)]
pub struct StaffCredentials {
    username: String,
    password: String,
}

impl StaffCredentials {
    pub fn from_env() -> Self {
        Self {
            username: env::var("EXAMPILOT_ADMIN_USERNAME")
                .unwrap_or_else(|_| DEFAULT_USERNAME.to_string()),
            password: env::var("EXAMPILOT_ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_PASSWORD.to_string()),
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

impl Default for StaffCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub username: String,
}
