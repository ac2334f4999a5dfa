use crate::auth::{require_admin, AuthUser};
use crate::dto::{
    AdminOverview, ApplicationDecisionRequest, ApplicationDetails, DepositDetails,
    DisbursementDetails, ResponseData, SupportDetails, SupportReplyRequest, VerifyDepositRequest,
    WithdrawalAction, WithdrawalDecisionRequest, WithdrawalDetails, RESPONSE_BAD_REQUEST,
    RESPONSE_INTERNAL_ERROR, RESPONSE_OK, RESPONSE_UNAUTHORIZED, STATUS_APPROVED,
    STATUS_COMPLETED, STATUS_PENDING, STATUS_REJECTED, STATUS_RESOLVED,
};
use crate::pool::Db;
use crate::reconcile;
use crate::sql_stmt::{DB_BACKEND, DEBIT_SAVINGS};
use lending_db_entity::db::loan_applications::{
    Column as ApplicationColumn, Entity as Application,
};
use lending_db_entity::db::loan_disbursements::{
    Column as DisbursementColumn, Entity as Disbursement,
};
use lending_db_entity::db::savings_deposits::{Column as DepositColumn, Entity as Deposit};
use lending_db_entity::db::support_requests::{Column as SupportColumn, Entity as Support};
use lending_db_entity::db::withdrawals::{Column as WithdrawalColumn, Entity as Withdrawal};
use rocket::serde::json::Json;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Statement,
    TransactionTrait,
};
use sea_orm_rocket::Connection;
use tracing::{info, warn};
use uuid::Uuid;

fn unauthorized<T>(message: String) -> Json<ResponseData<T>> {
    Json(ResponseData::new(RESPONSE_UNAUTHORIZED, message, None))
}

fn parse_id<T>(id: &str) -> Result<Uuid, Json<ResponseData<T>>> {
    Uuid::parse_str(id).map_err(|error| {
        warn!("Invalid id: {}", error);
        Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Invalid id".to_owned(),
            None,
        ))
    })
}

/// The dashboard counters: five independent reads issued concurrently,
/// folded by the caller.
#[get("/admin/overview", format = "application/json")]
pub async fn overview(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<AdminOverview>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }

    let (applications, deposits, withdrawals, support, disbursements) = tokio::join!(
        Application::find().all(db),
        Deposit::find().all(db),
        Withdrawal::find().all(db),
        Support::find().all(db),
        Disbursement::find().all(db),
    );

    let (total_applications, pending_applications, approved_loans) = match applications {
        Ok(applications) => {
            let pending = applications
                .iter()
                .filter(|a| a.status.eq(STATUS_PENDING))
                .count() as i64;
            let approved = applications
                .iter()
                .filter(|a| a.status.eq(STATUS_APPROVED))
                .count() as i64;
            (applications.len() as i64, pending, approved)
        }
        Err(error) => {
            warn!("Error fetching applications: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching overview".to_owned(),
                None,
            ));
        }
    };
    let unverified_deposits = match deposits {
        Ok(deposits) => deposits.iter().filter(|d| !d.verified).count() as i64,
        Err(error) => {
            warn!("Error fetching deposits: {}", error);
            0
        }
    };
    let pending_withdrawals = match withdrawals {
        Ok(withdrawals) => withdrawals
            .iter()
            .filter(|w| w.status.eq(STATUS_PENDING))
            .count() as i64,
        Err(error) => {
            warn!("Error fetching withdrawals: {}", error);
            0
        }
    };
    let pending_support = match support {
        Ok(support) => support
            .iter()
            .filter(|s| s.status.eq(STATUS_PENDING))
            .count() as i64,
        Err(error) => {
            warn!("Error fetching support requests: {}", error);
            0
        }
    };
    let undisbursed_loans = match disbursements {
        Ok(disbursements) => disbursements
            .iter()
            .filter(|d| d.payment_verified && !d.disbursed)
            .count() as i64,
        Err(error) => {
            warn!("Error fetching disbursements: {}", error);
            0
        }
    };

    Json(ResponseData::new(
        RESPONSE_OK,
        "".to_owned(),
        Some(AdminOverview {
            total_applications,
            pending_applications,
            approved_loans,
            pending_support,
            pending_withdrawals,
            unverified_deposits,
            undisbursed_loans,
        }),
    ))
}

#[get("/admin/applications", format = "application/json")]
pub async fn list_applications(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<Vec<ApplicationDetails>>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    match Application::find()
        .order_by_desc(ApplicationColumn::CreatedAt)
        .all(db)
        .await
    {
        Ok(applications) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(applications.iter().map(ApplicationDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Error fetching applications: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching applications".to_owned(),
                None,
            ))
        }
    }
}

#[get("/admin/deposits", format = "application/json")]
pub async fn list_deposits(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<Vec<DepositDetails>>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    match Deposit::find()
        .order_by_desc(DepositColumn::CreatedAt)
        .all(db)
        .await
    {
        Ok(deposits) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(deposits.iter().map(DepositDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Error fetching deposits: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching deposits".to_owned(),
                None,
            ))
        }
    }
}

#[get("/admin/withdrawals", format = "application/json")]
pub async fn list_withdrawals(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<Vec<WithdrawalDetails>>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    match Withdrawal::find()
        .order_by_desc(WithdrawalColumn::CreatedAt)
        .all(db)
        .await
    {
        Ok(withdrawals) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(withdrawals.iter().map(WithdrawalDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Error fetching withdrawals: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching withdrawals".to_owned(),
                None,
            ))
        }
    }
}

#[get("/admin/support", format = "application/json")]
pub async fn list_support(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<Vec<SupportDetails>>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    match Support::find()
        .order_by_desc(SupportColumn::CreatedAt)
        .all(db)
        .await
    {
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

#[get("/admin/disbursements", format = "application/json")]
pub async fn list_disbursements(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
) -> Json<ResponseData<Vec<DisbursementDetails>>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    match Disbursement::find()
        .order_by_desc(DisbursementColumn::CreatedAt)
        .all(db)
        .await
    {
        Ok(disbursements) => Json(ResponseData::new(
            RESPONSE_OK,
            "".to_owned(),
            Some(disbursements.iter().map(DisbursementDetails::new).collect()),
        )),
        Err(error) => {
            warn!("Error fetching disbursements: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching disbursements".to_owned(),
                None,
            ))
        }
    }
}

/// pending -> approved | rejected, terminal either way. The filter on
/// the current status makes the race with the savings-gated flow a
/// clean no-op for whoever loses.
#[post(
    "/admin/applications/<id>/status",
    format = "application/json",
    data = "<decision_request>"
)]
pub async fn decide_application(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
    id: String,
    decision_request: Json<ApplicationDecisionRequest>,
) -> Json<ResponseData<String>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    let application_id = match parse_id(&id) {
        Ok(application_id) => application_id,
        Err(response) => return response,
    };

    let status = decision_request.status.to_string();
    let result = Application::update_many()
        .col_expr(ApplicationColumn::Status, Expr::value(status.to_owned()))
        .col_expr(
            ApplicationColumn::UpdatedAt,
            Expr::value(chrono::Utc::now().timestamp()),
        )
        .filter(ApplicationColumn::Id.eq(application_id))
        .filter(ApplicationColumn::Status.eq(STATUS_PENDING))
        .exec(db)
        .await;
    match result {
        Ok(result) => {
            if result.rows_affected == 0 {
                return Json(ResponseData::new(
                    RESPONSE_BAD_REQUEST,
                    "Application already decided or not found".to_owned(),
                    None,
                ));
            }
            info!("Application {} {}", application_id, status);
            Json(ResponseData::new(RESPONSE_OK, "".to_owned(), Some(status)))
        }
        Err(error) => {
            warn!("Error updating application: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error updating application".to_owned(),
                None,
            ))
        }
    }
}

/// Verification and the balance credit are one statement; verifying a
/// deposit twice credits nothing the second time.
#[post(
    "/admin/deposits/<id>/verify",
    format = "application/json",
    data = "<verify_request>"
)]
pub async fn verify_deposit(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
    id: String,
    verify_request: Json<VerifyDepositRequest>,
) -> Json<ResponseData<String>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    let deposit_id = match parse_id(&id) {
        Ok(deposit_id) => deposit_id,
        Err(response) => return response,
    };

    if !verify_request.verified {
        info!("Deposit {} rejected", deposit_id);
        return Json(ResponseData::new(
            RESPONSE_OK,
            "Deposit rejected".to_owned(),
            Some("rejected".to_owned()),
        ));
    }

    match reconcile::credit_verified_deposit_by_id(db, deposit_id).await {
        Ok(true) => {
            info!("Deposit {} verified and credited", deposit_id);
            Json(ResponseData::new(
                RESPONSE_OK,
                "Deposit verified".to_owned(),
                Some("verified".to_owned()),
            ))
        }
        Ok(false) => Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Deposit already verified or not found".to_owned(),
            None,
        )),
        Err(error) => {
            warn!("Error verifying deposit: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error verifying deposit".to_owned(),
                None,
            ))
        }
    }
}

/// Approval flips the status and debits the balance inside one
/// transaction; an insufficient balance rolls both back.
#[post(
    "/admin/withdrawals/<id>/decision",
    format = "application/json",
    data = "<decision_request>"
)]
pub async fn decide_withdrawal(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
    id: String,
    decision_request: Json<WithdrawalDecisionRequest>,
) -> Json<ResponseData<String>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    let withdrawal_id = match parse_id(&id) {
        Ok(withdrawal_id) => withdrawal_id,
        Err(response) => return response,
    };
    let now = chrono::Utc::now().timestamp();

    if decision_request.action == WithdrawalAction::Reject {
        let result = Withdrawal::update_many()
            .col_expr(WithdrawalColumn::Status, Expr::value(STATUS_REJECTED))
            .col_expr(WithdrawalColumn::UpdatedAt, Expr::value(now))
            .filter(WithdrawalColumn::Id.eq(withdrawal_id))
            .filter(WithdrawalColumn::Status.eq(STATUS_PENDING))
            .exec(db)
            .await;
        return match result {
            Ok(result) => {
                if result.rows_affected == 0 {
                    Json(ResponseData::new(
                        RESPONSE_BAD_REQUEST,
                        "Withdrawal already decided or not found".to_owned(),
                        None,
                    ))
                } else {
                    info!("Withdrawal {} rejected", withdrawal_id);
                    Json(ResponseData::new(
                        RESPONSE_OK,
                        "".to_owned(),
                        Some(STATUS_REJECTED.to_owned()),
                    ))
                }
            }
            Err(error) => {
                warn!("Error rejecting withdrawal: {}", error);
                Json(ResponseData::new(
                    RESPONSE_INTERNAL_ERROR,
                    "Error rejecting withdrawal".to_owned(),
                    None,
                ))
            }
        };
    }

    let withdrawal = Withdrawal::find()
        .filter(WithdrawalColumn::Id.eq(withdrawal_id))
        .filter(WithdrawalColumn::Status.eq(STATUS_PENDING))
        .one(db)
        .await;
    let withdrawal = match withdrawal {
        Ok(Some(withdrawal)) => withdrawal,
        Ok(None) => {
            return Json(ResponseData::new(
                RESPONSE_BAD_REQUEST,
                "Withdrawal already decided or not found".to_owned(),
                None,
            ));
        }
        Err(error) => {
            warn!("Error fetching withdrawal: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error fetching withdrawal".to_owned(),
                None,
            ));
        }
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(error) => {
            warn!("Error starting transaction: {}", error);
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error approving withdrawal".to_owned(),
                None,
            ));
        }
    };

    let flipped = Withdrawal::update_many()
        .col_expr(WithdrawalColumn::Status, Expr::value(STATUS_COMPLETED))
        .col_expr(WithdrawalColumn::UpdatedAt, Expr::value(now))
        .filter(WithdrawalColumn::Id.eq(withdrawal_id))
        .filter(WithdrawalColumn::Status.eq(STATUS_PENDING))
        .exec(&txn)
        .await;
    match flipped {
        Ok(result) => {
            if result.rows_affected == 0 {
                let _ = txn.rollback().await;
                return Json(ResponseData::new(
                    RESPONSE_BAD_REQUEST,
                    "Withdrawal already decided".to_owned(),
                    None,
                ));
            }
        }
        Err(error) => {
            warn!("Error approving withdrawal: {}", error);
            let _ = txn.rollback().await;
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error approving withdrawal".to_owned(),
                None,
            ));
        }
    }

    let debited = txn
        .execute(Statement::from_sql_and_values(
            DB_BACKEND,
            DEBIT_SAVINGS,
            vec![
                withdrawal.user_id.into(),
                withdrawal.amount.into(),
                now.into(),
            ],
        ))
        .await;
    match debited {
        Ok(result) => {
            if result.rows_affected() == 0 {
                let _ = txn.rollback().await;
                info!(
                    "Withdrawal {} refused: insufficient balance",
                    withdrawal_id
                );
                return Json(ResponseData::new(
                    RESPONSE_BAD_REQUEST,
                    "Insufficient balance for this withdrawal".to_owned(),
                    None,
                ));
            }
        }
        Err(error) => {
            warn!("Error debiting savings: {}", error);
            let _ = txn.rollback().await;
            return Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error approving withdrawal".to_owned(),
                None,
            ));
        }
    }

    match txn.commit().await {
        Ok(()) => {
            info!("Withdrawal {} completed", withdrawal_id);
            Json(ResponseData::new(
                RESPONSE_OK,
                "".to_owned(),
                Some(STATUS_COMPLETED.to_owned()),
            ))
        }
        Err(error) => {
            warn!("Error committing withdrawal: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error approving withdrawal".to_owned(),
                None,
            ))
        }
    }
}

/// Reply and resolution land in the same write, conditional on the
/// request still being open.
#[post(
    "/admin/support/<id>/reply",
    format = "application/json",
    data = "<reply_request>"
)]
pub async fn reply_support(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
    id: String,
    reply_request: Json<SupportReplyRequest>,
) -> Json<ResponseData<String>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    let request_id = match parse_id(&id) {
        Ok(request_id) => request_id,
        Err(response) => return response,
    };
    if reply_request.reply.trim().is_empty() {
        return Json(ResponseData::new(
            RESPONSE_BAD_REQUEST,
            "Please enter a reply".to_owned(),
            None,
        ));
    }

    let result = Support::update_many()
        .col_expr(
            SupportColumn::AdminReply,
            Expr::value(reply_request.reply.to_owned()),
        )
        .col_expr(SupportColumn::Status, Expr::value(STATUS_RESOLVED))
        .col_expr(
            SupportColumn::UpdatedAt,
            Expr::value(chrono::Utc::now().timestamp()),
        )
        .filter(SupportColumn::Id.eq(request_id))
        .filter(SupportColumn::Status.eq(STATUS_PENDING))
        .exec(db)
        .await;
    match result {
        Ok(result) => {
            if result.rows_affected == 0 {
                return Json(ResponseData::new(
                    RESPONSE_BAD_REQUEST,
                    "Request already resolved or not found".to_owned(),
                    None,
                ));
            }
            info!("Support request {} resolved", request_id);
            Json(ResponseData::new(
                RESPONSE_OK,
                "".to_owned(),
                Some(STATUS_RESOLVED.to_owned()),
            ))
        }
        Err(error) => {
            warn!("Error replying to support request: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error sending reply".to_owned(),
                None,
            ))
        }
    }
}

/// Funds leave only after the payment is verified; the filter keeps
/// `disbursed` unreachable otherwise.
#[post("/admin/disbursements/<id>/disburse", format = "application/json")]
pub async fn disburse(
    conn: Connection<'_, Db>,
    auth_user: AuthUser,
    id: String,
) -> Json<ResponseData<String>> {
    let db = conn.into_inner();
    if let Err(message) = require_admin(db, auth_user.user_id).await {
        return unauthorized(message);
    }
    let disbursement_id = match parse_id(&id) {
        Ok(disbursement_id) => disbursement_id,
        Err(response) => return response,
    };

    let result = Disbursement::update_many()
        .col_expr(DisbursementColumn::Disbursed, Expr::value(true))
        .col_expr(
            DisbursementColumn::UpdatedAt,
            Expr::value(chrono::Utc::now().timestamp()),
        )
        .filter(DisbursementColumn::Id.eq(disbursement_id))
        .filter(DisbursementColumn::PaymentVerified.eq(true))
        .filter(DisbursementColumn::Disbursed.eq(false))
        .exec(db)
        .await;
    match result {
        Ok(result) => {
            if result.rows_affected == 0 {
                return Json(ResponseData::new(
                    RESPONSE_BAD_REQUEST,
                    "Payment not verified yet, or already disbursed".to_owned(),
                    None,
                ));
            }
            info!("Disbursement {} marked disbursed", disbursement_id);
            Json(ResponseData::new(
                RESPONSE_OK,
                "".to_owned(),
                Some("disbursed".to_owned()),
            ))
        }
        Err(error) => {
            warn!("Error marking disbursement: {}", error);
            Json(ResponseData::new(
                RESPONSE_INTERNAL_ERROR,
                "Error marking disbursement".to_owned(),
                None,
            ))
        }
    }
}
