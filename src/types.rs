// ABOUTME: Type definitions for API requests and responses
// ABOUTME: Wire shapes for projects, files, and the structured error body

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Request bodies
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddUserRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddFileRequest {
    pub name: String,
}

// Response bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub usernames: Vec<String>,
    pub files: Vec<FileResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
