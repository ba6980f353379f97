use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{travel_request, validate};

/// Flight/hotel/car reservation attached to an approved travel request.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "travel_bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub travel_request_id: Uuid,
    pub booking_type: String,
    pub provider: String,
    pub booking_reference: String,
    #[sea_orm(column_type = "Text")]
    pub details: String,
    #[sea_orm(column_type = "Double")]
    pub cost: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { TravelRequest }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::TravelRequest => Entity::belongs_to(travel_request::Entity)
                .from(Column::TravelRequestId)
                .to(travel_request::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("booking_type", &self.booking_type, 32)?;
        validate::require_text("provider", &self.provider, 128)?;
        validate::require_text("booking_reference", &self.booking_reference, 128)?;
        validate::require_text("details", &self.details, 4000)?;
        validate::non_negative("cost", self.cost)
    }
}
