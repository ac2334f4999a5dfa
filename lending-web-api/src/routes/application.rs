use crate::auth::AuthUser;
use crate::dto::{
    ApplicationDetails, ApplicationRequest, ResponseData, RESPONSE_BAD_REQUEST,
    RESPONSE_INTERNAL_ERROR, RESPONSE_OK, STATUS_PENDING,
};
use crate::eligibility;
use crate::phone;
use crate::pool::Db;
use lending_db_entity::db::loan_applications::{
    ActiveModel as ApplicationActiveModel, Column as ApplicationColumn, Entity as Application,
};
use rocket::serde::json::Json;
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use sea_orm_rocket::Connection;
use tracing::{info, warn};
use uuid::Uuid;

fn missing_required_field(request: &ApplicationRequest) -> bool {
    request.full_name.trim().is_empty()
        || request.id_number.trim().is_empty()
        || request.whatsapp_number.trim().is_empty()
        || request.contact_person_name.trim().is_empty()
        || request.contact_person_phone.trim().is_empty()
        || request.next_of_kin_name.trim().is_empty()
        || request.next_of_kin_contact.trim().is_empty()
        || request.occupation.trim().is_empty()
}

#[post("/applications", format = "application/json", data = "<application_request>")]
pub async fn submit(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
    application_request: Json<ApplicationRequest>,
) -> Json<ResponseData<ApplicationDetails>> {
    let request = application_request.into_inner();
    if missing_required_field(&request) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Please fill in all required fields".to_owned(),
            None,
        ));
    }
    if !phone::is_valid_phone(&request.whatsapp_number) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid WhatsApp number".to_owned(),
            None,
        ));
    }

    let loan_limit = eligibility::loan_limit(request.income_level, request.employment_status);
    let now = chrono::Utc::now().timestamp();
    let id = Uuid::new_v4();

    let active_model = ApplicationActiveModel {
        id: ActiveValue::Set(id),
        user_id: ActiveValue::Set(auth_user.user_id),
        full_name: ActiveValue::Set(request.full_name.to_owned()),
        id_number: ActiveValue::Set(request.id_number.to_owned()),
        whatsapp_number: ActiveValue::Set(request.whatsapp_number.to_owned()),
        contact_person_name: ActiveValue::Set(request.contact_person_name.to_owned()),
        contact_person_phone: ActiveValue::Set(request.contact_person_phone.to_owned()),
        next_of_kin_name: ActiveValue::Set(request.next_of_kin_name.to_owned()),
        next_of_kin_contact: ActiveValue::Set(request.next_of_kin_contact.to_owned()),
        occupation: ActiveValue::Set(request.occupation.to_owned()),
        employment_status: ActiveValue::Set(request.employment_status.to_string()),
        income_level: ActiveValue::Set(request.income_level.to_string()),
        loan_reason: ActiveValue::Set(request.loan_reason.to_owned()),
        loan_limit: ActiveValue::Set(loan_limit),
        status: ActiveValue::Set(STATUS_PENDING.to_owned()),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    };

    let db = conn.into_inner();
    match Application::insert(active_model).exec(db).await {
        Ok(_) => {
            info!("Application {} submitted with limit {}", id, loan_limit);
            let details = ApplicationDetails {
                id: id.to_string(),
                full_name: request.full_name,
                employment_status: request.employment_status.to_string(),
                income_level: request.income_level.to_string(),
                loan_limit,
                status: STATUS_PENDING.to_owned(),
                created_at: now,
            };
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some(details)))
        }
        Err(error) => {
            warn!("Could not insert application: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Could not submit application".to_owned(),
                None,
            ))
        }
    }
}

#[get("/applications/latest", format = "application/json")]
pub async fn latest(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<ApplicationDetails>> {
    let db = conn.into_inner();
    let application = Application::find()
        .filter(ApplicationColumn::UserId.eq(auth_user.user_id))
        .order_by_desc(ApplicationColumn::CreatedAt)
        .one(db)
        .await;

    match application {
        Ok(Some(application)) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(ApplicationDetails::new(&application)),
        )),
        Ok(None) => Json(ResponseData::new(
            RESPONSE_OK,
            "No application found".to_owned(),
            None,
        )),
        Err(error) => {
            warn!("Error fetching application: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching application".to_owned(),
                None,
            ))
        }
    }
}
