use crate::auth::AuthUser;
use crate::dto::{
    decimal_to_i64, DepositDetails, DepositRequest, ResponseData, SavingsSummary,
    WithdrawalDetails, WithdrawalRequest, RESPONSE_BAD_REQUEST, RESPONSE_INTERNAL_ERROR,
    RESPONSE_OK, STATUS_PENDING,
};
use crate::phone;
use crate::pool::{Db, LendingConfig};
use lending_db_entity::db::savings_deposits::{
    ActiveModel as DepositActiveModel, Column as DepositColumn, Entity as Deposit,
};
use lending_db_entity::db::user_savings::{Column as SavingsColumn, Entity as UserSavings};
use lending_db_entity::db::withdrawals::{
    ActiveModel as WithdrawalActiveModel, Column as WithdrawalColumn, Entity as Withdrawal,
};
use rocket::{serde::json::Json, State};
use sea_orm::prelude::Decimal;
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use sea_orm_rocket::Connection;
use tracing::{info, warn};
use uuid::Uuid;

#[post("/savings/deposits", format = "application/json", data = "<deposit_request>")]
pub async fn submit_deposit(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
    deposit_request: Json<DepositRequest>,
) -> Json<ResponseData<DepositDetails>> {
    if deposit_request.amount <= 0 {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid deposit amount".to_owned(),
            None,
        ));
    }
    if deposit_request.mpesa_message.trim().is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Please paste the M-Pesa confirmation message".to_owned(),
            None,
        ));
    }

    let now = chrono::Utc::now().timestamp();
    let id = Uuid::new_v4();
    let active_model = DepositActiveModel {
        id: ActiveValue::Set(id),
        user_id: ActiveValue::Set(auth_user.user_id),
        amount: ActiveValue::Set(Decimal::from(deposit_request.amount)),
        mpesa_message: ActiveValue::Set(deposit_request.mpesa_message.to_owned()),
        transaction_code: ActiveValue::Set(deposit_request.transaction_code.to_owned()),
        verified: ActiveValue::Set(false),
        created_at: ActiveValue::Set(now),
    };

    let db = conn.into_inner();
    match Deposit::insert(active_model).exec(db).await {
        Ok(_) => {
            info!("Deposit {} submitted, pending verification", id);
            let details = DepositDetails {
                id: id.to_string(),
                user_id: auth_user.user_id.to_string(),
                amount: deposit_request.amount,
                mpesa_message: deposit_request.mpesa_message.to_owned(),
                transaction_code: deposit_request.transaction_code.to_owned(),
                verified: false,
                created_at: now,
            };
            Json(ResponseData::new(
                RESPONSE_OK,
                "Your deposit is pending verification".to_owned(),
                Some(details),
            ))
        }
        Err(error) => {
            warn!("Could not insert deposit: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Could not submit deposit".to_owned(),
                None,
            ))
        }
    }
}

/// Balance plus the deposit and withdrawal listings, fetched
/// concurrently the way the admin overview is.
#[get("/savings", format = "application/json")]
pub async fn summary(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<SavingsSummary>> {
    let db = conn.into_inner();

    let (savings, deposits, withdrawals) = tokio::join!(
        UserSavings::find()
            .filter(SavingsColumn::UserId.eq(auth_user.user_id))
            .one(db),
        Deposit::find()
            .filter(DepositColumn::UserId.eq(auth_user.user_id))
            .order_by_desc(DepositColumn::CreatedAt)
            .all(db),
        Withdrawal::find()
            .filter(WithdrawalColumn::UserId.eq(auth_user.user_id))
            .order_by_desc(WithdrawalColumn::CreatedAt)
            .all(db),
    );

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
    let deposits = match deposits {
        Ok(deposits) => deposits.iter().map(DepositDetails::new).collect(),
        Err(error) => {
            warn!("Error fetching deposits: {}", error);
            vec![]
        }
    };
    let withdrawals = match withdrawals {
        Ok(withdrawals) => withdrawals.iter().map(WithdrawalDetails::new).collect(),
        Err(error) => {
            warn!("Error fetching withdrawals: {}", error);
            vec![]
        }
    };

    Json(ResponseData::new(
        RESPONSE_OK,
        "".to_owned(),
        Some(SavingsSummary {
            balance,
            deposits,
            withdrawals,
        }),
    ))
}

#[post("/withdrawals", format = "application/json", data = "<withdrawal_request>")]
pub async fn request_withdrawal(
    conn: Connection<'_, Db>,
    lending_config: &State<LendingConfig>,
    auth_user: AuthUser,
    withdrawal_request: Json<WithdrawalRequest>,
) -> Json<ResponseData<WithdrawalDetails>> {
    if withdrawal_request.amount < lending_config.min_withdrawal_amount {
        let message = format!(
            "Minimum withdrawal amount is KES {}",
            lending_config.min_withdrawal_amount
        );
        return Json(ResponseData::new(RESPONSE_BAD_REQUEST, message, None));
    }
    if !phone::is_valid_phone(&withdrawal_request.phone_number) {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid phone number".to_owned(),
            None,
        ));
    }

    let db = conn.into_inner();

    // Advisory check for a friendly error; the authoritative guard is
    // the conditional debit at approval time.
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
    if withdrawal_request.amount > balance {
        let message = format!(
            "Insufficient balance. Your available balance is KES {}",
            balance
        );
        return Json(ResponseData::new(RESPONSE_BAD_REQUEST, message, None));
    }

    let now = chrono::Utc::now().timestamp();
    let id = Uuid::new_v4();
    let active_model = WithdrawalActiveModel {
        id: ActiveValue::Set(id),
        user_id: ActiveValue::Set(auth_user.user_id),
        amount: ActiveValue::Set(Decimal::from(withdrawal_request.amount)),
        phone_number: ActiveValue::Set(withdrawal_request.phone_number.to_owned()),
        status: ActiveValue::Set(STATUS_PENDING.to_owned()),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    };
    match Withdrawal::insert(active_model).exec(db).await {
        Ok(_) => {
            info!("Withdrawal {} requested", id);
            let details = WithdrawalDetails {
                id: id.to_string(),
                user_id: auth_user.user_id.to_string(),
                amount: withdrawal_request.amount,
                phone_number: withdrawal_request.phone_number.to_owned(),
                status: STATUS_PENDING.to_owned(),
                created_at: now,
            };
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some(details)))
        }
        Err(error) => {
            warn!("Could not insert withdrawal: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Could not request withdrawal".to_owned(),
                None,
            ))
        }
    }
}
