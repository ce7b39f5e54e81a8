// ABOUTME: Project service orchestrating validation, lookups, and persistence
// ABOUTME: Handles projects, lazy user creation, memberships, files, and the directory check

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::entities::{file, project, project_member, user};
use crate::error::{Result, ServiceError};
use crate::types::{FileResponse, ProjectResponse};

pub struct ProjectService {
    db: DatabaseConnection,
    directory: Arc<dyn UserDirectory>,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection, directory: Arc<dyn UserDirectory>) -> Self {
        Self { db, directory }
    }

    /// Creates a project owned by the requesting user. The user row is
    /// created lazily on first reference; the per-user name uniqueness check
    /// is a best-effort pre-check, not a transactional guarantee.
    pub async fn create_project(
        &self,
        name: &str,
        requesting_username: &str,
    ) -> Result<ProjectResponse> {
        if name.trim().is_empty() {
            return Err(ServiceError::BadRequest(
                "project name is mandatory".to_string(),
            ));
        }

        // Check if the user exists in the database, if not create a new one.
        // User creation deliberately precedes the uniqueness check.
        let current_user = self.find_or_create_user(requesting_username).await?;

        let same_name = project::Entity::find()
            .filter(project::Column::Name.eq(name))
            .find_with_related(user::Entity)
            .all(&self.db)
            .await?;
        for (_, members) in &same_name {
            if members.iter().any(|u| u.username == requesting_username) {
                tracing::info!("the current user already has a project with name: {}", name);
                return Err(ServiceError::Conflict(format!(
                    "project with name: {} already exists for the current user!",
                    name
                )));
            }
        }

        tracing::info!("creating project: {}", name);
        let project = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(&self.db)
        .await?;

        project_member::ActiveModel {
            project_id: Set(project.id),
            user_id: Set(current_user.id),
        }
        .insert(&self.db)
        .await?;

        Ok(ProjectResponse {
            id: project.id,
            name: project.name,
            usernames: vec![current_user.username],
            files: Vec::new(),
        })
    }

    /// All projects the user is a member of, ordered case-insensitively by name.
    pub async fn list_projects(&self, username: &str) -> Result<Vec<ProjectResponse>> {
        let all = project::Entity::find()
            .find_with_related(user::Entity)
            .all(&self.db)
            .await?;
        tracing::info!("user: {} get projects", username);

        let mut user_projects: Vec<project::Model> = all
            .into_iter()
            .filter(|(_, members)| members.iter().any(|u| u.username == username))
            .map(|(p, _)| p)
            .collect();
        user_projects.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        let mut responses = Vec::with_capacity(user_projects.len());
        for p in &user_projects {
            responses.push(self.to_response(p).await?);
        }
        Ok(responses)
    }

    pub async fn get_project(&self, id: Uuid) -> Result<ProjectResponse> {
        let project = self.project_by_id(id).await?;
        tracing::info!("get project: {}", project.name);
        self.to_response(&project).await
    }

    /// Renames a project. No pre-check here; a store-level uniqueness
    /// rejection surfaces as Conflict.
    pub async fn rename_project(&self, id: Uuid, new_name: &str) -> Result<ProjectResponse> {
        let project = self.project_by_id(id).await?;
        let mut active: project::ActiveModel = project.into();
        active.name = Set(new_name.to_string());
        tracing::info!("update project name: {}", new_name);
        let project = active.update(&self.db).await.map_err(|err| {
            match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(format!(
                    "project with name: {} already exists!",
                    new_name
                )),
                _ => ServiceError::Database(err),
            }
        })?;
        self.to_response(&project).await
    }

    /// Deletes a project and everything it owns: file rows and membership
    /// rows go in the same logical unit of work. Member users survive.
    pub async fn delete_project(&self, id: Uuid) -> Result<()> {
        let project = self.project_by_id(id).await?;
        tracing::info!("delete project: {}", project.name);

        file::Entity::delete_many()
            .filter(file::Column::ProjectId.eq(id))
            .exec(&self.db)
            .await?;
        project_member::Entity::delete_many()
            .filter(project_member::Column::ProjectId.eq(id))
            .exec(&self.db)
            .await?;
        project.delete(&self.db).await?;

        Ok(())
    }

    /// Adds a member after verifying the username against the external
    /// directory. The member reference reuses an existing user row by
    /// username; adding an existing member is a no-op.
    pub async fn add_user_to_project(&self, id: Uuid, username: &str) -> Result<ProjectResponse> {
        if !self.directory.user_exists(username).await? {
            tracing::info!("username: {} does not exist in the directory", username);
            return Err(ServiceError::BadRequest(format!(
                "username: {} does not exist in the directory!",
                username
            )));
        }

        let project = self.project_by_id(id).await?;
        let member = self.find_or_create_user(username).await?;

        let existing = project_member::Entity::find_by_id((project.id, member.id))
            .one(&self.db)
            .await?;
        if existing.is_none() {
            project_member::ActiveModel {
                project_id: Set(project.id),
                user_id: Set(member.id),
            }
            .insert(&self.db)
            .await?;
        }

        tracing::info!("add user: {} to project: {}", username, project.name);
        self.to_response(&project).await
    }

    pub async fn add_file_to_project(&self, id: Uuid, file_name: &str) -> Result<FileResponse> {
        let project = self.project_by_id(id).await?;
        tracing::info!("add file: {} to project: {}", file_name, project.name);

        let file = file::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project.id),
            name: Set(file_name.to_string()),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(&self.db)
        .await?;

        Ok(FileResponse {
            id: file.id,
            name: file.name,
        })
    }

    /// Files of a project, ordered case-insensitively by name.
    pub async fn list_files(&self, id: Uuid) -> Result<Vec<FileResponse>> {
        let project = self.project_by_id(id).await?;
        tracing::info!("get files from project: {}", project.name);

        let mut files = project.find_related(file::Entity).all(&self.db).await?;
        files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        Ok(files
            .into_iter()
            .map(|f| FileResponse {
                id: f.id,
                name: f.name,
            })
            .collect())
    }

    async fn project_by_id(&self, id: Uuid) -> Result<project::Model> {
        project::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("project with id: {} not found!", id)))
    }

    async fn find_or_create_user(&self, username: &str) -> Result<user::Model> {
        if let Some(existing) = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
        {
            return Ok(existing);
        }

        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            created_at: Set(Utc::now().timestamp()),
        };
        Ok(new_user.insert(&self.db).await?)
    }

    async fn to_response(&self, project: &project::Model) -> Result<ProjectResponse> {
        let mut usernames: Vec<String> = project
            .find_related(user::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| u.username)
            .collect();
        usernames.sort();

        let files = project
            .find_related(file::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|f| FileResponse {
                id: f.id,
                name: f.name,
            })
            .collect();

        Ok(ProjectResponse {
            id: project.id,
            name: project.name.clone(),
            usernames,
            files,
        })
    }
}
