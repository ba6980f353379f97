use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::status::RequestStatus;
use crate::{user, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "travel_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub destination: String,
    #[sea_orm(column_type = "Text")]
    pub purpose: String,
    pub departure_date: DateTimeWithTimeZone,
    pub return_date: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Double")]
    pub estimated_cost: f64,
    pub status: RequestStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("destination", &self.destination, 255)?;
        validate::require_text("purpose", &self.purpose, 4000)?;
        validate::date_range("departure_date", &self.departure_date, "return_date", &self.return_date)?;
        validate::non_negative("estimated_cost", self.estimated_cost)
    }
}
