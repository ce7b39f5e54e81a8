// ABOUTME: User entity definition for SeaORM with unique username identity
// ABOUTME: Users belong to zero or more projects and are never deleted by this service

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_member::Entity")]
    Memberships,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        super::project_member::Relation::Project.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::project_member::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
