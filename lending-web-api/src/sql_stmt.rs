use sea_orm::DbBackend;

pub const DB_BACKEND: DbBackend = DbBackend::Postgres;

/// Verify-and-credit in one statement: flipping `verified` and crediting
/// the balance cannot come apart, and a replayed event matches zero rows.
/// The gateway-confirmed amount overwrites the claimed one before the
/// credit so ledger and balance agree.
pub const VERIFY_DEPOSIT_AND_CREDIT_BY_CODE: &str = r#"WITH deposit AS (
    UPDATE savings_deposits SET verified = TRUE, amount = $2
    WHERE transaction_code = $1 AND verified = FALSE
    RETURNING user_id, amount)
INSERT INTO user_savings (id, user_id, balance, created_at, updated_at)
    SELECT $3, user_id, amount, $4, $4 FROM deposit
    ON CONFLICT (user_id)
    DO UPDATE SET balance = user_savings.balance + EXCLUDED.balance,
        updated_at = EXCLUDED.updated_at"#;

pub const VERIFY_DEPOSIT_AND_CREDIT_BY_ID: &str = r#"WITH deposit AS (
    UPDATE savings_deposits SET verified = TRUE
    WHERE id = $1 AND verified = FALSE
    RETURNING user_id, amount)
INSERT INTO user_savings (id, user_id, balance, created_at, updated_at)
    SELECT $2, user_id, amount, $3, $3 FROM deposit
    ON CONFLICT (user_id)
    DO UPDATE SET balance = user_savings.balance + EXCLUDED.balance,
        updated_at = EXCLUDED.updated_at"#;

/// Guarded so a late failure event never claws back a credited deposit.
pub const MARK_DEPOSIT_FAILED: &str = r#"UPDATE savings_deposits SET verified = FALSE
    WHERE transaction_code = $1 AND verified = FALSE"#;

/// Zero rows affected means insufficient funds; the caller rolls back.
pub const DEBIT_SAVINGS: &str = r#"UPDATE user_savings
    SET balance = balance - $2, updated_at = $3
    WHERE user_id = $1 AND balance >= $2"#;
