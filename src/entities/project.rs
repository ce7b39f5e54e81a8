// ABOUTME: Project entity definition for SeaORM with UUID identity
// ABOUTME: A project owns its files and links to users through the membership table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::file::Entity")]
    Files,
    #[sea_orm(has_many = "super::project_member::Entity")]
    Members,
}

impl Related<super::file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::project_member::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::project_member::Relation::Project.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
