use crate::auth::AuthUser;
use crate::dto::{
    ResponseData, SupportDetails, SupportRequestBody, RESPONSE_BAD_REQUEST,
    RESPONSE_INTERNAL_ERROR, RESPONSE_OK, STATUS_PENDING,
};
use crate::pool::Db;
use lending_db_entity::db::support_requests::{
    ActiveModel as SupportActiveModel, Column as SupportColumn, Entity as Support,
};
use rocket::serde::json::Json;
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use sea_orm_rocket::Connection;
use tracing::{info, warn};
use uuid::Uuid;

#[post("/support", format = "application/json", data = "<support_request>")]
pub async fn submit(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
    support_request: Json<SupportRequestBody>,
) -> Json<ResponseData<SupportDetails>> {
    if support_request.message.trim().is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Please enter a message".to_owned(),
            None,
        ));
    }

    let now = chrono::Utc::now().timestamp();
    let id = Uuid::new_v4();
    let active_model = SupportActiveModel {
        id: ActiveValue::Set(id),
        user_id: ActiveValue::Set(auth_user.user_id),
        user_name: ActiveValue::Set(support_request.user_name.to_owned()),
        user_email: ActiveValue::Set(support_request.user_email.to_owned()),
        message: ActiveValue::Set(support_request.message.to_owned()),
        admin_reply: ActiveValue::Set(None),
        status: ActiveValue::Set(STATUS_PENDING.to_owned()),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    };

    let db = conn.into_inner();
    match Support::insert(active_model).exec(db).await {
        Ok(_) => {
            info!("Support request {} filed", id);
            let details = SupportDetails {
                id: id.to_string(),
                user_name: support_request.user_name.to_owned(),
                user_email: support_request.user_email.to_owned(),
                message: support_request.message.to_owned(),
                admin_reply: None,
                status: STATUS_PENDING.to_owned(),
                created_at: now,
            };
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some(details)))
        }
        Err(error) => {
            warn!("Could not insert support request: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Could not file support request".to_owned(),
                None,
            ))
        }
    }
}

#[get("/support/mine", format = "application/json")]
pub async fn mine(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<Vec<SupportDetails>>> {
    let db = conn.into_inner();
    let requests = Support::find()
        .filter(SupportColumn::UserId.eq(auth_user.user_id))
        .order_by_desc(SupportColumn::CreatedAt)
        .all(db)
        .await;

    match requests {
        Ok(requests) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(requests.iter().map(SupportDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Error fetching support requests: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching support requests".to_owned(),
                None,
            ))
        }
    }
}
