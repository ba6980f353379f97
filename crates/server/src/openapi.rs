use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct NewUserDoc {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// `admin`, `manager` or `employee`; elevated roles need an admin caller.
    pub role: Option<String>,
}

#[derive(ToSchema)]
pub struct UserPatchDoc {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Username or email plus password.
#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct TokenResponse { pub user_id: String, pub access_token: String, pub token_type: String }

#[derive(ToSchema)]
pub struct NewExpenseDoc {
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub receipt_url: Option<String>,
}

#[derive(ToSchema)]
pub struct ExpensePatchDoc {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub receipt_url: Option<String>,
    /// `approved`, `rejected` or `cancelled`.
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct NewSickLeaveDoc {
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
    pub document_url: Option<String>,
}

#[derive(ToSchema)]
pub struct SickLeavePatchDoc {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reason: Option<String>,
    /// `null` clears the document.
    pub document_url: Option<String>,
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct NewActivityDoc {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub capacity: Option<i32>,
}

#[derive(ToSchema)]
pub struct ActivityPatchDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    /// `null` removes the limit.
    pub capacity: Option<i32>,
}

/// `user_id` defaults to the caller; registering someone else needs a privileged role.
#[derive(ToSchema)]
pub struct NewRegistrationDoc { pub activity_id: String, pub user_id: Option<String> }

#[derive(ToSchema)]
pub struct RegistrationPatchDoc { pub status: Option<String> }

#[derive(ToSchema)]
pub struct NewAssetDoc {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub is_available: Option<bool>,
}

#[derive(ToSchema)]
pub struct AssetPatchDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(ToSchema)]
pub struct NewAssetBookingDoc {
    pub asset_id: String,
    pub start_time: String,
    pub end_time: String,
    pub purpose: String,
}

#[derive(ToSchema)]
pub struct AssetBookingPatchDoc {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub purpose: Option<String>,
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct NewIssueDoc {
    pub title: String,
    pub description: String,
    pub location: String,
    pub priority: String,
    pub image_url: Option<String>,
}

#[derive(ToSchema)]
pub struct IssuePatchDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub priority: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct NewTravelRequestDoc {
    pub destination: String,
    pub purpose: String,
    pub departure_date: String,
    pub return_date: String,
    pub estimated_cost: f64,
}

#[derive(ToSchema)]
pub struct TravelRequestPatchDoc {
    pub destination: Option<String>,
    pub purpose: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub estimated_cost: Option<f64>,
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct NewTravelBookingDoc {
    pub travel_request_id: String,
    pub booking_type: String,
    pub provider: String,
    pub booking_reference: String,
    pub details: String,
    pub cost: f64,
}

#[derive(ToSchema)]
pub struct TravelBookingPatchDoc {
    pub booking_type: Option<String>,
    pub provider: Option<String>,
    pub booking_reference: Option<String>,
    pub details: Option<String>,
    pub cost: Option<f64>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::create,
        crate::routes::users::token,
        crate::routes::users::me,
        crate::routes::users::list,
        crate::routes::users::update,
        crate::routes::expenses::create,
        crate::routes::expenses::list,
        crate::routes::expenses::get_one,
        crate::routes::expenses::update,
        crate::routes::expenses::remove,
        crate::routes::users::get_one,
        crate::routes::users::remove,
        crate::routes::expenses::list_mine,
        crate::routes::sick_leave::create,
        crate::routes::sick_leave::list,
        crate::routes::sick_leave::list_mine,
        crate::routes::sick_leave::get_one,
        crate::routes::sick_leave::update,
        crate::routes::sick_leave::remove,
        crate::routes::education::create_activity,
        crate::routes::education::list_activities,
        crate::routes::education::get_activity,
        crate::routes::education::update_activity,
        crate::routes::education::remove_activity,
        crate::routes::education::create_registration,
        crate::routes::education::list_registrations,
        crate::routes::education::list_my_registrations,
        crate::routes::education::get_registration,
        crate::routes::education::update_registration,
        crate::routes::education::remove_registration,
        crate::routes::assets::create_asset,
        crate::routes::assets::list_assets,
        crate::routes::assets::get_asset,
        crate::routes::assets::update_asset,
        crate::routes::assets::remove_asset,
        crate::routes::assets::create_booking,
        crate::routes::assets::list_bookings,
        crate::routes::assets::list_my_bookings,
        crate::routes::assets::get_booking,
        crate::routes::assets::update_booking,
        crate::routes::assets::remove_booking,
        crate::routes::maintenance::create,
        crate::routes::maintenance::list,
        crate::routes::maintenance::list_mine,
        crate::routes::maintenance::get_one,
        crate::routes::maintenance::update,
        crate::routes::maintenance::remove,
        crate::routes::travel::create_request,
        crate::routes::travel::list_requests,
        crate::routes::travel::list_my_requests,
        crate::routes::travel::get_request,
        crate::routes::travel::update_request,
        crate::routes::travel::remove_request,
        crate::routes::travel::list_bookings_for_request,
        crate::routes::travel::create_booking,
        crate::routes::travel::get_booking,
        crate::routes::travel::update_booking,
        crate::routes::travel::remove_booking,
    ),
    components(
        schemas(
            HealthResponse,
            NewUserDoc,
            UserPatchDoc,
            LoginRequest,
            TokenResponse,
            NewExpenseDoc,
            ExpensePatchDoc,
            NewSickLeaveDoc,
            SickLeavePatchDoc,
            NewActivityDoc,
            ActivityPatchDoc,
            NewRegistrationDoc,
            RegistrationPatchDoc,
            NewAssetDoc,
            AssetPatchDoc,
            NewAssetBookingDoc,
            AssetBookingPatchDoc,
            NewIssueDoc,
            IssuePatchDoc,
            NewTravelRequestDoc,
            TravelRequestPatchDoc,
            NewTravelBookingDoc,
            TravelBookingPatchDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "expenses"),
        (name = "sick-leave"),
        (name = "education"),
        (name = "assets"),
        (name = "maintenance"),
        (name = "travel")
    )
)]
pub struct ApiDoc;
