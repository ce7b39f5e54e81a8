// ABOUTME: Main entry point for the project membership service of the online IDE
// ABOUTME: Sets up the web server, routes, database, and the directory client

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    routing::post,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

mod directory;
mod entities;
mod error;
mod migration;
mod service;
mod types;

mod integration_tests;

use directory::{GitLabDirectory, UserDirectory};
use error::ServiceError;
use migration::Migrator;
use service::ProjectService;
use types::{AddFileRequest, AddUserRequest, FileResponse, ProjectRequest, ProjectResponse};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProjectService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:projects.db?mode=rwc".to_string());
    let db = Database::connect(&db_url).await?;
    Migrator::up(&db, None).await?;

    let directory: Arc<dyn UserDirectory> = Arc::new(GitLabDirectory::from_env()?);
    let state = AppState {
        service: Arc::new(ProjectService::new(db, directory)),
    };

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("project service listening on {}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .route(
            "/projects/:id",
            get(get_project).put(rename_project).delete(delete_project),
        )
        .route("/projects/:id/users", post(add_user_to_project))
        .route("/projects/:id/files", post(add_file_to_project).get(list_files))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Caller identity is an opaque string supplied by the gateway in X-Username
fn requesting_username(headers: &HeaderMap) -> Result<String, ServiceError> {
    headers
        .get("x-username")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::BadRequest("missing X-Username header".to_string()))
}

async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ServiceError> {
    let username = requesting_username(&headers)?;
    let project = state.service.create_project(&payload.name, &username).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ProjectResponse>>, ServiceError> {
    let username = requesting_username(&headers)?;
    let projects = state.service.list_projects(&username).await?;
    Ok(Json(projects))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, ServiceError> {
    let project = state.service.get_project(id).await?;
    Ok(Json(project))
}

async fn rename_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProjectRequest>,
) -> Result<Json<ProjectResponse>, ServiceError> {
    let project = state.service.rename_project(id, &payload.name).await?;
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.service.delete_project(id).await?;
    Ok(StatusCode::OK)
}

async fn add_user_to_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddUserRequest>,
) -> Result<Json<ProjectResponse>, ServiceError> {
    let project = state.service.add_user_to_project(id, &payload.username).await?;
    Ok(Json(project))
}

async fn add_file_to_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddFileRequest>,
) -> Result<(StatusCode, Json<FileResponse>), ServiceError> {
    let file = state.service.add_file_to_project(id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(file)))
}

async fn list_files(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FileResponse>>, ServiceError> {
    let files = state.service.list_files(id).await?;
    Ok(Json(files))
}
