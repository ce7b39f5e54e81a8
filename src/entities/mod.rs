// ABOUTME: SeaORM entities module for database models and relationships
// ABOUTME: Exports all entity definitions for projects, users, files, and memberships

pub mod file;
pub mod project;
pub mod project_member;
pub mod user;

pub use file::Entity as File;
pub use project::Entity as Project;
pub use project_member::Entity as ProjectMember;
pub use user::Entity as User;
