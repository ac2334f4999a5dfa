use crate::auth::AuthUser;
use crate::dto::{
    InitiatePaymentRequest, InitiatePaymentResponse, ResponseData, RESPONSE_BAD_REQUEST,
    RESPONSE_INTERNAL_ERROR, RESPONSE_OK,
};
use crate::paystack;
use crate::phone;
use crate::pool::{Db, LendingConfig};
use crate::reference;
use lending_db_entity::db::loan_disbursements::{
    ActiveModel as DisbursementActiveModel, Entity as Disbursement,
};
use rocket::{serde::json::Json, State};
use sea_orm::prelude::Decimal;
use sea_orm::{ActiveValue, EntityTrait};
use sea_orm_rocket::Connection;
use tracing::{info, warn};
use uuid::Uuid;

/// Opens a processing-fee charge with the gateway and records the
/// pending disbursement under the generated reference. The webhook
/// completes the flow.
#[post("/payments/initiate", format = "application/json", data = "<payment_request>")]
pub async fn initiate(
    conn: Connection<'_, Db>,
    lending_config: &State<LendingConfig>,
    client: &State<reqwest::Client>,
    _auth_user: AuthUser,
    payment_request: Json<InitiatePaymentRequest>,
) -> Json<ResponseData<InitiatePaymentResponse>> {
    if payment_request.amount <= 0 {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid amount".to_owned(),
            None,
        ));
    }
    if !phone::is_valid_phone(&payment_request.phone_number) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid phone number".to_owned(),
            None,
        ));
    }
    let application_id = match Uuid::parse_str(&payment_request.application_id) {
        Ok(application_id) => application_id,
        Err(error) => {
            warn!("Invalid application id: {}", error);
            return Json(ResponseData::new(
                RESPONSE_BAD_REQUEST,
                "Invalid application id".to_owned(),
                None,
            ));
        }
    };

    let formatted_phone = phone::format_gateway_phone(&payment_request.phone_number);
    let reference = reference::disbursement_reference(
        &application_id,
        chrono::Utc::now().timestamp_millis(),
    );

    let (display_text, error_message) = paystack::initiate_mobile_money_charge(
        client,
        lending_config,
        &formatted_phone,
        payment_request.amount,
        &payment_request.application_id,
        &reference,
    )
    .await;
    if !error_message.is_empty() {
        return Json(ResponseData::new(RESPONSE_BAD_REQUEST, error_message, None));
    }

    let now = chrono::Utc::now().timestamp();
    let active_model = DisbursementActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        application_id: ActiveValue::Set(application_id),
        loan_amount: ActiveValue::Set(Decimal::from(payment_request.amount)),
        processing_fee: ActiveValue::Set(Decimal::from(payment_request.amount)),
        transaction_code: ActiveValue::Set(reference.to_owned()),
        payment_verified: ActiveValue::Set(false),
        disbursed: ActiveValue::Set(false),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    };
    let db = conn.into_inner();
    match Disbursement::insert(active_model).exec(db).await {
        Ok(_) => {
            info!("Charge {} initiated for {}", reference, application_id);
            Json(ResponseData::new(
                RESPONSE_OK,
                "STK push sent. Check your phone for the M-Pesa prompt.".to_owned(),
                Some(InitiatePaymentResponse {
                    success: true,
                    reference,
                    display_text,
                }),
            ))
        }
        Err(error) => {
            warn!("Could not record pending disbursement: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Could not record payment".to_owned(),
                None,
            ))
        }
    }
}
