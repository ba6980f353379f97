use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validate;

/// Catalog entry users register for; `capacity = None` means unbounded.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "education_activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub location: String,
    pub capacity: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("title", &self.title, 255)?;
        validate::require_text("description", &self.description, 4000)?;
        validate::date_range("start_date", &self.start_date, "end_date", &self.end_date)?;
        validate::require_text("location", &self.location, 255)?;
        if matches!(self.capacity, Some(c) if c < 0) {
            return Err(ModelError::Validation("capacity must be >= 0".into()));
        }
        Ok(())
    }
}
