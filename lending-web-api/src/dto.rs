use lending_db_entity::db::loan_applications::Model as ApplicationModel;
use lending_db_entity::db::loan_disbursements::Model as DisbursementModel;
use lending_db_entity::db::savings_deposits::Model as DepositModel;
use lending_db_entity::db::support_requests::Model as SupportModel;
use lending_db_entity::db::withdrawals::Model as WithdrawalModel;
use rocket::serde::{Deserialize, Serialize};
use sea_orm::prelude::Decimal;
use strum_macros::Display;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ResponseData<T> {
    pub code: Option<u16>,
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ResponseData<T> {
    pub fn new(code: u16, message: String, data: Option<T>) -> ResponseData<T> {
        ResponseData {
            code: Some(code),
            status_code: None,
            message,
            data,
        }
    }
}

pub const RESPONSE_OK: u16 = 200;
pub const RESPONSE_BAD_REQUEST: u16 = 400;
pub const RESPONSE_UNAUTHORIZED: u16 = 401;
pub const RESPONSE_INTERNAL_ERROR: u16 = 500;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_RESOLVED: &str = "resolved";

pub const ROLE_ADMIN: &str = "admin";

/// Income bands offered on the application form.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize, Display)]
#[serde(crate = "rocket::serde")]
pub enum IncomeLevel {
    #[serde(rename = "below-20k")]
    #[strum(serialize = "below-20k")]
    Below20k,
    #[serde(rename = "20k-50k")]
    #[strum(serialize = "20k-50k")]
    From20kTo50k,
    #[serde(rename = "50k-100k")]
    #[strum(serialize = "50k-100k")]
    From50kTo100k,
    #[serde(rename = "above-100k")]
    #[strum(serialize = "above-100k")]
    Above100k,
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize, Display)]
#[serde(crate = "rocket::serde", rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EmploymentStatus {
    Employed,
    SelfEmployed,
    Student,
    Unemployed,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationRequest {
    pub full_name: String,
    pub id_number: String,
    pub whatsapp_number: String,
    pub contact_person_name: String,
    pub contact_person_phone: String,
    pub next_of_kin_name: String,
    pub next_of_kin_contact: String,
    pub occupation: String,
    pub employment_status: EmploymentStatus,
    pub income_level: IncomeLevel,
    pub loan_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationDetails {
    pub id: String,
    pub full_name: String,
    pub employment_status: String,
    pub income_level: String,
    pub loan_limit: i64,
    pub status: String,
    pub created_at: i64,
}

impl ApplicationDetails {
    pub fn new(application: &ApplicationModel) -> ApplicationDetails {
        ApplicationDetails {
            id: application.id.to_string(),
            full_name: application.full_name.to_owned(),
            employment_status: application.employment_status.to_owned(),
            income_level: application.income_level.to_owned(),
            loan_limit: application.loan_limit,
            status: application.status.to_owned(),
            created_at: application.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ProceedRequest {
    pub application_id: String,
    pub amount: i64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DisbursementDetails {
    pub id: String,
    pub application_id: String,
    pub loan_amount: i64,
    pub processing_fee: i64,
    pub transaction_code: String,
    pub payment_verified: bool,
    pub disbursed: bool,
    pub created_at: i64,
}

impl DisbursementDetails {
    pub fn new(disbursement: &DisbursementModel) -> DisbursementDetails {
        DisbursementDetails {
            id: disbursement.id.to_string(),
            application_id: disbursement.application_id.to_string(),
            loan_amount: decimal_to_i64(&disbursement.loan_amount),
            processing_fee: decimal_to_i64(&disbursement.processing_fee),
            transaction_code: disbursement.transaction_code.to_owned(),
            payment_verified: disbursement.payment_verified,
            disbursed: disbursement.disbursed,
            created_at: disbursement.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DepositRequest {
    pub amount: i64,
    pub mpesa_message: String,
    pub transaction_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DepositDetails {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub mpesa_message: String,
    pub transaction_code: Option<String>,
    pub verified: bool,
    pub created_at: i64,
}

impl DepositDetails {
    pub fn new(deposit: &DepositModel) -> DepositDetails {
        DepositDetails {
            id: deposit.id.to_string(),
            user_id: deposit.user_id.to_string(),
            amount: decimal_to_i64(&deposit.amount),
            mpesa_message: deposit.mpesa_message.to_owned(),
            transaction_code: deposit.transaction_code.to_owned(),
            verified: deposit.verified,
            created_at: deposit.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WithdrawalRequest {
    pub amount: i64,
    pub phone_number: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WithdrawalDetails {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub phone_number: String,
    pub status: String,
    pub created_at: i64,
}

impl WithdrawalDetails {
    pub fn new(withdrawal: &WithdrawalModel) -> WithdrawalDetails {
        WithdrawalDetails {
            id: withdrawal.id.to_string(),
            user_id: withdrawal.user_id.to_string(),
            amount: decimal_to_i64(&withdrawal.amount),
            phone_number: withdrawal.phone_number.to_owned(),
            status: withdrawal.status.to_owned(),
            created_at: withdrawal.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SavingsSummary {
    pub balance: i64,
    pub deposits: Vec<DepositDetails>,
    pub withdrawals: Vec<WithdrawalDetails>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SupportRequestBody {
    pub user_name: String,
    pub user_email: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SupportDetails {
    pub id: String,
    pub user_name: String,
    pub user_email: String,
    pub message: String,
    pub admin_reply: Option<String>,
    pub status: String,
    pub created_at: i64,
}

impl SupportDetails {
    pub fn new(request: &SupportModel) -> SupportDetails {
        SupportDetails {
            id: request.id.to_string(),
            user_name: request.user_name.to_owned(),
            user_email: request.user_email.to_owned(),
            message: request.message.to_owned(),
            admin_reply: request.admin_reply.to_owned(),
            status: request.status.to_owned(),
            created_at: request.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    pub phone_number: String,
    pub amount: i64,
    pub application_id: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct InitiatePaymentResponse {
    pub success: bool,
    pub reference: String,
    pub display_text: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Display)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationDecision {
    Approved,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationDecisionRequest {
    pub status: ApplicationDecision,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Display)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WithdrawalAction {
    Approve,
    Reject,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WithdrawalDecisionRequest {
    pub action: WithdrawalAction,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct VerifyDepositRequest {
    pub verified: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SupportReplyRequest {
    pub reply: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AdminOverview {
    pub total_applications: i64,
    pub pending_applications: i64,
    pub approved_loans: i64,
    pub pending_support: i64,
    pub pending_withdrawals: i64,
    pub unverified_deposits: i64,
    pub undisbursed_loans: i64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Display)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ResetCodeRequest {
    pub phone_number: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct VerifyResetRequest {
    pub phone_number: String,
    pub code: String,
    pub new_password: String,
}

/// Models store money as Decimal; the JSON surface speaks whole shillings.
pub fn decimal_to_i64(amount: &Decimal) -> i64 {
    i64::from_str_radix(&amount.trunc().to_string(), 10).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_level_round_trips_wire_names() {
        let level: IncomeLevel = rocket::serde::json::from_str("\"below-20k\"").unwrap();
        assert_eq!(level, IncomeLevel::Below20k);
        assert_eq!(level.to_string(), "below-20k");

        let level: IncomeLevel = rocket::serde::json::from_str("\"above-100k\"").unwrap();
        assert_eq!(level, IncomeLevel::Above100k);
    }

    #[test]
    fn employment_status_uses_kebab_case() {
        let status: EmploymentStatus = rocket::serde::json::from_str("\"self-employed\"").unwrap();
        assert_eq!(status, EmploymentStatus::SelfEmployed);
        assert_eq!(status.to_string(), "self-employed");
    }

    #[test]
    fn decimal_truncates_to_whole_shillings() {
        assert_eq!(decimal_to_i64(&Decimal::new(950050, 2)), 9500);
        assert_eq!(decimal_to_i64(&Decimal::from(500)), 500);
    }
}
