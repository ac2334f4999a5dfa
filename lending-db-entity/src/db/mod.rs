pub mod loan_applications;
pub mod loan_disbursements;
pub mod password_reset_codes;
pub mod savings_deposits;
pub mod support_requests;
pub mod user_roles;
pub mod user_savings;
pub mod withdrawals;
