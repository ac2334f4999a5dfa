use crate::dto::{
    ResetCodeRequest, ResponseData, VerifyResetRequest, RESPONSE_BAD_REQUEST,
    RESPONSE_INTERNAL_ERROR, RESPONSE_OK,
};
use crate::phone;
use crate::pool::{Db, LendingConfig};
use crate::sms;
use lending_db_entity::db::password_reset_codes::{
    ActiveModel as ResetCodeActiveModel, Column as ResetCodeColumn, Entity as ResetCode,
};
use rand::Rng;
use rocket::serde::Serialize;
use rocket::{serde::json::Json, State};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use sea_orm_rocket::Connection;
use tracing::{info, warn};
use uuid::Uuid;

const CODE_VALIDITY_SECS: i64 = 5 * 60;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
struct PasswordUpdateRequest {
    phone_number: String,
    new_password: String,
}

#[post("/auth/send_reset_code", format = "application/json", data = "<reset_request>")]
pub async fn send_reset_code(
    conn: Connection<'_, Db>,
    lending_config: &State<LendingConfig>,
    client: &State<reqwest::Client>,
    reset_request: Json<ResetCodeRequest>,
) -> Json<ResponseData<String>> {
    if !phone::is_valid_phone(&reset_request.phone_number) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid phone number".to_owned(),
            None,
        ));
    }

    let formatted_phone = phone::format_sms_phone(&reset_request.phone_number);
    let code = rand::thread_rng().gen_range(100000..1000000).to_string();
    let message = format!(
        "Your Hela Loans password reset code is: {}. Valid for 5 minutes.",
        code
    );

    if let Err(error) = sms::send_sms(client, lending_config, &formatted_phone, &message).await {
        warn!("Could not send reset code: {}", error);
        return Json(ResponseData::new(
            RESPONSE_INTERNAL_ERROR,
            "Failed to send verification code".to_owned(),
            None,
        ));
    }

    let now = chrono::Utc::now().timestamp();
    let active_model = ResetCodeActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        phone_number: ActiveValue::Set(formatted_phone.to_owned()),
        code: ActiveValue::Set(code),
        expires_at: ActiveValue::Set(now + CODE_VALIDITY_SECS),
        used: ActiveValue::Set(false),
        created_at: ActiveValue::Set(now),
    };
    let db = conn.into_inner();
    match ResetCode::insert(active_model).exec(db).await {
        Ok(_) => {
            info!("Reset code issued to {}", formatted_phone);
            Json(ResponseData::new(
                RESPONSE_OK,
                "Verification code sent successfully".to_owned(),
                None,
            ))
        }
        Err(error) => {
            warn!("Could not store reset code: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Failed to send verification code".to_owned(),
                None,
            ))
        }
    }
}

/// The issued code is compared exactly against the stored row and
/// burned in the same guarded update; only then does the password
/// change get delegated to the auth service.
#[post("/auth/verify_reset_code", format = "application/json", data = "<verify_request>")]
pub async fn verify_reset_code(
    conn: Connection<'_, Db>,
    lending_config: &State<LendingConfig>,
    client: &State<reqwest::Client>,
    verify_request: Json<VerifyResetRequest>,
) -> Json<ResponseData<String>> {
    if verify_request.code.len() != 6 || !verify_request.code.chars().all(|c| c.is_ascii_digit()) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid verification code format".to_owned(),
            None,
        ));
    }
    if verify_request.new_password.len() < 6 {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Password must be at least 6 characters".to_owned(),
            None,
        ));
    }
    if !phone::is_valid_phone(&verify_request.phone_number) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid phone number".to_owned(),
            None,
        ));
    }

    let formatted_phone = phone::format_sms_phone(&verify_request.phone_number);
    let now = chrono::Utc::now().timestamp();
    let db = conn.into_inner();

    let reset_code = ResetCode::find()
        .filter(ResetCodeColumn::PhoneNumber.eq(formatted_phone.to_owned()))
        .filter(ResetCodeColumn::Code.eq(verify_request.code.to_owned()))
        .filter(ResetCodeColumn::Used.eq(false))
        .filter(ResetCodeColumn::ExpiresAt.gt(now))
        .order_by_desc(ResetCodeColumn::CreatedAt)
        .one(db)
        .await;
    let reset_code = match reset_code {
        Ok(Some(reset_code)) => reset_code,
        Ok(None) => {
            info!("No matching reset code for {}", formatted_phone);
            return Json(ResponseData::new(
                RESPONSE_BAD_REQUEST,
                "Invalid or expired code".to_owned(),
                None,
            ));
        }
        Err(error) => {
            warn!("Error fetching reset code: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error verifying code".to_owned(),
                None,
            ));
        }
    };

    // Single use: whoever burns the row first wins
    let burned = ResetCode::update_many()
        .col_expr(ResetCodeColumn::Used, Expr::value(true))
        .filter(ResetCodeColumn::Id.eq(reset_code.id))
        .filter(ResetCodeColumn::Used.eq(false))
        .exec(db)
        .await;
    match burned {
        Ok(result) => {
            if result.rows_affected == 0 {
                return Json(ResponseData::new(
                    RESPONSE_BAD_REQUEST,
                    "Invalid or expired code".to_owned(),
                    None,
                ));
            }
        }
        Err(error) => {
            warn!("Error invalidating reset code: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error verifying code".to_owned(),
                None,
            ));
        }
    }

    let url = lending_config.auth_api_node.to_owned() + "/admin/users/password";
    let payload = PasswordUpdateRequest {
        phone_number: formatted_phone.to_owned(),
        new_password: verify_request.new_password.to_owned(),
    };
    let result = client
        .post(url)
        .bearer_auth(&lending_config.auth_service_key)
        .json(&payload)
        .send()
        .await;
    match result {
        Ok(response) => {
            if response.status().is_success() {
                info!("Password reset for {}", formatted_phone);
                Json(ResponseData::new(
                    RESPONSE_OK,
                    "Password reset successfully".to_owned(),
                    None,
                ))
            } else {
                warn!("Auth service returned {}", response.status());
                Json(ResponseData::new(
                    RESPONSE_INTERNAL_ERROR,
                    "Failed to update password".to_owned(),
                    None,
                ))
            }
        }
        Err(error) => {
            warn!("Error connecting auth service: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Failed to update password".to_owned(),
                None,
            ))
        }
    }
}
