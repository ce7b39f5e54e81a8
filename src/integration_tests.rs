// ABOUTME: Integration tests for API endpoints
// ABOUTME: Tests complete request/response flows and the status-code contract

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::types::ErrorResponse;
    use async_trait::async_trait;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use sea_orm::Database;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;
    use uuid::Uuid;

    struct StaticDirectory {
        known: Vec<String>,
    }

    #[async_trait]
    impl UserDirectory for StaticDirectory {
        async fn user_exists(&self, username: &str) -> anyhow::Result<bool> {
            Ok(self.known.iter().any(|u| u == username))
        }
    }

    async fn create_test_app(known: &[&str]) -> (TestServer, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let directory: Arc<dyn UserDirectory> = Arc::new(StaticDirectory {
            known: known.iter().map(|s| s.to_string()).collect(),
        });
        let state = AppState {
            service: Arc::new(ProjectService::new(db, directory)),
        };

        (TestServer::new(app(state)).unwrap(), temp_dir)
    }

    fn username_header(username: &'static str) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-username"),
            HeaderValue::from_static(username),
        )
    }

    #[tokio::test]
    async fn test_create_project_returns_201() {
        let (server, _temp_dir) = create_test_app(&[]).await;
        let (name, value) = username_header("alice");

        let response = server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "ide"}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let project: ProjectResponse = response.json();
        assert_eq!(project.name, "ide");
        assert_eq!(project.usernames, vec!["alice".to_string()]);
        assert!(project.files.is_empty());
    }

    #[tokio::test]
    async fn test_create_project_requires_identity() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        let response = server.post("/projects").json(&json!({"name": "ide"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_duplicate_project_returns_409() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        let (name, value) = username_header("alice");
        server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "ide"}))
            .await
            .assert_status(StatusCode::CREATED);

        let (name, value) = username_header("alice");
        let response = server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "ide"}))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let error: ErrorResponse = response.json();
        assert!(error.message.contains("already exists"));
    }

    #[tokio::test]
    async fn test_list_projects_sorted_for_member() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        for project_name in ["banana", "Apple"] {
            let (name, value) = username_header("alice");
            server
                .post("/projects")
                .add_header(name, value)
                .json(&json!({"name": project_name}))
                .await
                .assert_status(StatusCode::CREATED);
        }
        let (name, value) = username_header("bob");
        server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "carrot"}))
            .await
            .assert_status(StatusCode::CREATED);

        let (name, value) = username_header("alice");
        let response = server.get("/projects").add_header(name, value).await;
        response.assert_status_ok();

        let projects: Vec<ProjectResponse> = response.json();
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "banana"]);
    }

    #[tokio::test]
    async fn test_get_missing_project_returns_404() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        let response = server.get(&format!("/projects/{}", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let error: ErrorResponse = response.json();
        assert!(error.message.contains("not found"));
    }

    #[tokio::test]
    async fn test_rename_project_returns_200() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        let (name, value) = username_header("alice");
        let created: ProjectResponse = server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "old"}))
            .await
            .json();

        let response = server
            .put(&format!("/projects/{}", created.id))
            .json(&json!({"name": "new"}))
            .await;
        response.assert_status_ok();

        let renamed: ProjectResponse = response.json();
        assert_eq!(renamed.name, "new");
    }

    #[tokio::test]
    async fn test_delete_project_then_404() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        let (name, value) = username_header("alice");
        let created: ProjectResponse = server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "ide"}))
            .await
            .json();

        server
            .delete(&format!("/projects/{}", created.id))
            .await
            .assert_status_ok();

        server
            .get(&format!("/projects/{}", created.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&format!("/projects/{}/files", created.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_project_returns_404() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        let response = server.delete(&format!("/projects/{}", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_user_to_project_returns_200() {
        let (server, _temp_dir) = create_test_app(&["bob"]).await;

        let (name, value) = username_header("alice");
        let created: ProjectResponse = server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "ide"}))
            .await
            .json();

        let response = server
            .post(&format!("/projects/{}/users", created.id))
            .json(&json!({"username": "bob"}))
            .await;
        response.assert_status_ok();

        let project: ProjectResponse = response.json();
        assert_eq!(project.usernames, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[tokio::test]
    async fn test_add_unknown_directory_user_returns_400() {
        let (server, _temp_dir) = create_test_app(&["bob"]).await;

        let (name, value) = username_header("alice");
        let created: ProjectResponse = server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "ide"}))
            .await
            .json();

        let response = server
            .post(&format!("/projects/{}/users", created.id))
            .json(&json!({"username": "mallory"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let error: ErrorResponse = response.json();
        assert!(error.message.contains("does not exist"));
    }

    #[tokio::test]
    async fn test_add_user_to_missing_project_returns_404() {
        let (server, _temp_dir) = create_test_app(&["bob"]).await;

        let response = server
            .post(&format!("/projects/{}/users", Uuid::new_v4()))
            .json(&json!({"username": "bob"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_file_returns_201_and_listing_is_sorted() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        let (name, value) = username_header("alice");
        let created: ProjectResponse = server
            .post("/projects")
            .add_header(name, value)
            .json(&json!({"name": "ide"}))
            .await
            .json();

        for file_name in ["b.txt", "A.txt"] {
            let response = server
                .post(&format!("/projects/{}/files", created.id))
                .json(&json!({"name": file_name}))
                .await;
            response.assert_status(StatusCode::CREATED);

            let file: FileResponse = response.json();
            assert_eq!(file.name, file_name);
        }

        let response = server.get(&format!("/projects/{}/files", created.id)).await;
        response.assert_status_ok();

        let files: Vec<FileResponse> = response.json();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_add_file_to_missing_project_returns_404() {
        let (server, _temp_dir) = create_test_app(&[]).await;

        let response = server
            .post(&format!("/projects/{}/files", Uuid::new_v4()))
            .json(&json!({"name": "main.rs"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
