use serde::{Deserialize, Serialize};

use super::timetable::Timetable;

/// A named collection of generated timetables, the unit of storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamFolder {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub folder_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timetables: Vec<Timetable>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFolderRequest {
    pub user_id: String,
    pub folder_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timetables: Vec<Timetable>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    pub folder_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timetables: Vec<Timetable>,
}
