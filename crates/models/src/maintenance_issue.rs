use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{user, validate};

pub const DEFAULT_STATUS: &str = "open";

/// Facility problem report. `status` is free text, not the approval workflow.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_issues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub location: String,
    pub priority: String,
    pub status: String,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Reporter }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Reporter => Entity::belongs_to(user::Entity)
                .from(Column::ReporterId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("title", &self.title, 255)?;
        validate::require_text("description", &self.description, 4000)?;
        validate::require_text("location", &self.location, 255)?;
        validate::require_text("priority", &self.priority, 32)?;
        validate::require_text("status", &self.status, 32)?;
        validate::optional_text("image_url", self.image_url.as_deref(), 512)
    }
}
