use crate::reference;
use crate::sql_stmt::{
    DB_BACKEND, MARK_DEPOSIT_FAILED, VERIFY_DEPOSIT_AND_CREDIT_BY_CODE,
    VERIFY_DEPOSIT_AND_CREDIT_BY_ID,
};
use hmac::{Hmac, Mac};
use lending_db_entity::db::loan_disbursements::{
    Column as DisbursementColumn, Entity as Disbursement,
};
use rocket::serde::{Deserialize, Serialize};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Statement,
};
use sea_orm::prelude::Decimal;
use sha2::Sha512;
use tracing::{info, warn};
use uuid::Uuid;

pub const EVENT_CHARGE_SUCCESS: &str = "charge.success";
pub const EVENT_CHARGE_FAILED: &str = "charge.failed";

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct GatewayEvent {
    pub event: String,
    pub data: GatewayCharge,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct GatewayCharge {
    pub reference: String,
    /// Smallest currency unit, cents
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
}

pub fn compute_signature(secret_key: &str, body: &str) -> Option<String> {
    let mut mac: Hmac<Sha512> = match Hmac::new_from_slice(secret_key.as_bytes()) {
        Ok(mac) => mac,
        Err(error) => {
            warn!("Invalid webhook key: {}", error);
            return None;
        }
    };
    mac.update(body.as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    Some(hex)
}

pub fn verify_signature(secret_key: &str, body: &str, signature: &str) -> bool {
    match compute_signature(secret_key, body) {
        Some(expected) => expected.eq(signature),
        None => false,
    }
}

/// Applies one gateway event. Safe against duplicate delivery: every
/// mutation is keyed on the unique reference and guarded on the state
/// it is about to leave.
pub async fn apply_event(db: &DatabaseConnection, event: &GatewayEvent) -> Result<(), DbErr> {
    match event.event.as_str() {
        EVENT_CHARGE_SUCCESS => apply_charge_success(db, &event.data).await,
        EVENT_CHARGE_FAILED => apply_charge_failed(db, &event.data).await,
        other => {
            info!("Ignoring gateway event: {}", other);
            Ok(())
        }
    }
}

async fn apply_charge_success(db: &DatabaseConnection, charge: &GatewayCharge) -> Result<(), DbErr> {
    if charge.reference.starts_with(reference::SAVINGS_REFERENCE_PREFIX) {
        if reference::savings_reference_user_id(&charge.reference).is_none() {
            warn!("Unparseable savings reference: {}", charge.reference);
            return Ok(());
        }
        let amount = Decimal::new(charge.amount, 2);
        let credited = credit_verified_deposit_by_code(db, &charge.reference, amount).await?;
        if credited {
            info!("Savings credited for reference {}", charge.reference);
        } else {
            info!(
                "Deposit already verified, nothing credited: {}",
                charge.reference
            );
        }
    }

    let result = Disbursement::update_many()
        .col_expr(DisbursementColumn::PaymentVerified, Expr::value(true))
        .col_expr(
            DisbursementColumn::UpdatedAt,
            Expr::value(chrono::Utc::now().timestamp()),
        )
        .filter(DisbursementColumn::TransactionCode.eq(charge.reference.to_owned()))
        .filter(DisbursementColumn::PaymentVerified.eq(false))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        info!("Disbursement payment verified: {}", charge.reference);
    }

    Ok(())
}

async fn apply_charge_failed(db: &DatabaseConnection, charge: &GatewayCharge) -> Result<(), DbErr> {
    info!(
        "Payment failed for {}: {}",
        charge.reference,
        charge
            .gateway_response
            .as_deref()
            .unwrap_or("no gateway response")
    );
    db.execute(Statement::from_sql_and_values(
        DB_BACKEND,
        MARK_DEPOSIT_FAILED,
        vec![charge.reference.to_owned().into()],
    ))
    .await?;
    Ok(())
}

/// Gateway path: keyed by transaction code, credits the confirmed amount.
pub async fn credit_verified_deposit_by_code(
    db: &DatabaseConnection,
    transaction_code: &str,
    amount: Decimal,
) -> Result<bool, DbErr> {
    let now = chrono::Utc::now().timestamp();
    let result = db
        .execute(Statement::from_sql_and_values(
            DB_BACKEND,
            VERIFY_DEPOSIT_AND_CREDIT_BY_CODE,
            vec![
                transaction_code.to_owned().into(),
                amount.into(),
                Uuid::new_v4().into(),
                now.into(),
            ],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Manual path: keyed by deposit id, credits the recorded amount. Same
/// uniform rule as the gateway path.
pub async fn credit_verified_deposit_by_id(
    db: &DatabaseConnection,
    deposit_id: Uuid,
) -> Result<bool, DbErr> {
    let now = chrono::Utc::now().timestamp();
    let result = db
        .execute(Statement::from_sql_and_values(
            DB_BACKEND,
            VERIFY_DEPOSIT_AND_CREDIT_BY_ID,
            vec![deposit_id.into(), Uuid::new_v4().into(), now.into()],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_and_tamper_evident() {
        let signature =
            compute_signature("sk_test_secret", "{\"event\":\"charge.success\"}").unwrap();
        assert_eq!(signature.len(), 128);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(verify_signature(
            "sk_test_secret",
            "{\"event\":\"charge.success\"}",
            &signature
        ));
        assert!(!verify_signature(
            "sk_test_secret",
            "{\"event\":\"charge.failed\"}",
            &signature
        ));
        assert!(!verify_signature(
            "sk_other_secret",
            "{\"event\":\"charge.success\"}",
            &signature
        ));
    }

    #[test]
    fn gateway_event_parses_paystack_payload() {
        let body = r#"{
            "event": "charge.success",
            "data": {
                "reference": "hela_savings_1f6e1c3a_8e1c_4c2e_9f6a_2d3b4c5d6e7f_1720000000000",
                "amount": 50000,
                "status": "success",
                "gateway_response": "Approved",
                "currency": "KES"
            }
        }"#;
        let event: GatewayEvent = rocket::serde::json::from_str(body).unwrap();
        assert_eq!(event.event, EVENT_CHARGE_SUCCESS);
        assert_eq!(event.data.amount, 50000);
        assert!(event
            .data
            .reference
            .starts_with(reference::SAVINGS_REFERENCE_PREFIX));
        // 50000 cents is 500 shillings
        assert_eq!(Decimal::new(event.data.amount, 2), Decimal::from(500));
    }

    #[test]
    fn failed_event_tolerates_missing_fields() {
        let body = r#"{"event":"charge.failed","data":{"reference":"hela_x_1"}}"#;
        let event: GatewayEvent = rocket::serde::json::from_str(body).unwrap();
        assert_eq!(event.event, EVENT_CHARGE_FAILED);
        assert_eq!(event.data.amount, 0);
        assert_eq!(event.data.gateway_response, None);
    }
}
