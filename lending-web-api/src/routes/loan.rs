use crate::auth::AuthUser;
use crate::dto::{
    decimal_to_i64, DisbursementDetails, ProceedRequest, ResponseData, RESPONSE_BAD_REQUEST,
    RESPONSE_INTERNAL_ERROR, RESPONSE_OK, STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED,
};
use crate::pool::{Db, LendingConfig};
use crate::reference;
use lending_db_entity::db::loan_applications::{
    Column as ApplicationColumn, Entity as Application,
};
use lending_db_entity::db::loan_disbursements::{
    ActiveModel as DisbursementActiveModel, Entity as Disbursement,
};
use lending_db_entity::db::user_savings::{Column as SavingsColumn, Entity as UserSavings};
use rocket::{serde::json::Json, State};
use sea_orm::prelude::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use sea_orm_rocket::Connection;
use tracing::{info, warn};
use uuid::Uuid;

/// The savings gate: a sufficient verified balance substitutes for the
/// processing-fee charge, approves the application, and records the
/// disbursement as payment-verified.
#[post("/loans/proceed", format = "application/json", data = "<proceed_request>")]
pub async fn proceed(
    conn: Connection<'_, Db>,
    lending_config: &State<LendingConfig>,
    auth_user: AuthUser,
    proceed_request: Json<ProceedRequest>,
) -> Json<ResponseData<DisbursementDetails>> {
    let application_id = match Uuid::parse_str(&proceed_request.application_id) {
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
    if proceed_request.amount <= 0 {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid loan amount".to_owned(),
            None,
        ));
    }

    let db = conn.into_inner();
    let application = Application::find()
        .filter(ApplicationColumn::Id.eq(application_id))
        .filter(ApplicationColumn::UserId.eq(auth_user.user_id))
        .one(db)
        .await;
    let application = match application {
        Ok(Some(application)) => application,
        Ok(None) => {
            return Json(ResponseData::new(
                RESPONSE_BAD_REQUEST,
                "No such application found".to_owned(),
                None,
            ));
        }
        Err(error) => {
            warn!("Error fetching application: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching application".to_owned(),
                None,
            ));
        }
    };

    if application.status.eq(STATUS_REJECTED) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Application was rejected".to_owned(),
            None,
        ));
    }
    if proceed_request.amount > application.loan_limit {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Amount exceeds your loan limit".to_owned(),
            None,
        ));
    }

    let savings = UserSavings::find()
        .filter(SavingsColumn::UserId.eq(auth_user.user_id))
        .one(db)
        .await;
    let balance = match savings {
        Ok(Some(savings)) => decimal_to_i64(&savings.balance),
        Ok(None) => 0,
        Err(error) => {
            warn!("Error fetching savings: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching savings".to_owned(),
                None,
            ));
        }
    };
    if balance < lending_config.min_savings_balance {
        let message = format!(
            "You need at least KES {} in savings to proceed",
            lending_config.min_savings_balance
        );
        return Json(ResponseData::new(RESPONSE_BAD_REQUEST, message, None));
    }

    let now = chrono::Utc::now().timestamp();
    if application.status.eq(STATUS_PENDING) {
        // Guarded transition: loses cleanly if an admin decided first
        let result = Application::update_many()
            .col_expr(ApplicationColumn::Status, Expr::value(STATUS_APPROVED))
            .col_expr(ApplicationColumn::UpdatedAt, Expr::value(now))
            .filter(ApplicationColumn::Id.eq(application_id))
            .filter(ApplicationColumn::Status.eq(STATUS_PENDING))
            .exec(db)
            .await;
        match result {
            Ok(result) => {
                if result.rows_affected == 0 {
                    // An admin decided first; only an approval may continue
                    info!("Application {} already decided", application_id);
                    let decided = Application::find()
                        .filter(ApplicationColumn::Id.eq(application_id))
                        .one(db)
                        .await;
                    match decided {
                        Ok(Some(decided)) if decided.status.eq(STATUS_APPROVED) => {}
                        Ok(_) => {
                            return Json(ResponseData::new(
                                RESPONSE_BAD_REQUEST,
                                "Application was rejected".to_owned(),
                                None,
                            ));
                        }
                        Err(error) => {
                            warn!("Error re-checking application: {}", error);
                            return Json(ResponseData::new(
                                RESPONSE_INTERNAL_ERROR,
                                "Error fetching application".to_owned(),
                                None,
                            ));
                        }
                    }
                }
            }
            Err(error) => {
                warn!("Error approving application: {}", error);
                return Json(ResponseData::new(
                    RESPONSE_INTERNAL_ERROR,
                    "Error approving application".to_owned(),
                    None,
                ));
            }
        }
    }

    let id = Uuid::new_v4();
    let transaction_code = reference::loan_reference(chrono::Utc::now().timestamp_millis());
    let active_model = DisbursementActiveModel {
        id: ActiveValue::Set(id),
        application_id: ActiveValue::Set(application_id),
        loan_amount: ActiveValue::Set(Decimal::from(proceed_request.amount)),
        processing_fee: ActiveValue::Set(Decimal::ZERO),
        transaction_code: ActiveValue::Set(transaction_code.to_owned()),
        payment_verified: ActiveValue::Set(true),
        disbursed: ActiveValue::Set(false),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    };
    match Disbursement::insert(active_model).exec(db).await {
        Ok(_) => {
            info!("Disbursement {} queued for {}", id, application_id);
            let details = DisbursementDetails {
                id: id.to_string(),
                application_id: application_id.to_string(),
                loan_amount: proceed_request.amount,
                processing_fee: 0,
                transaction_code,
                payment_verified: true,
                disbursed: false,
                created_at: now,
            };
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some(details)))
        }
        Err(error) => {
            warn!("Could not insert disbursement: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Could not create disbursement".to_owned(),
                None,
            ))
        }
    }
}
