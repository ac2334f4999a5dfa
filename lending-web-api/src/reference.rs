use uuid::Uuid;

/// References route webhook events: `hela_savings_` marks a wallet
/// deposit, anything else is looked up as a disbursement charge.
pub const SAVINGS_REFERENCE_PREFIX: &str = "hela_savings_";

pub fn disbursement_reference(application_id: &Uuid, timestamp_millis: i64) -> String {
    format!("hela_{}_{}", application_id, timestamp_millis)
}

/// Savings-gated disbursements carry no gateway charge; the code only
/// has to satisfy the uniqueness constraint.
pub fn loan_reference(timestamp_millis: i64) -> String {
    format!("LOAN-{}", timestamp_millis)
}

/// Underscores replace the uuid hyphens so the reference stays a single
/// `_`-separated token list.
pub fn savings_reference(user_id: &Uuid, timestamp_millis: i64) -> String {
    format!(
        "{}{}_{}",
        SAVINGS_REFERENCE_PREFIX,
        user_id.to_string().replace('-', "_"),
        timestamp_millis
    )
}

pub fn savings_reference_user_id(reference: &str) -> Option<Uuid> {
    let parts: Vec<&str> = reference.split('_').collect();
    if parts.len() < 7 || parts[0] != "hela" || parts[1] != "savings" {
        return None;
    }
    Uuid::parse_str(&parts[2..7].join("-")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn savings_reference_round_trips_user_id() {
        let user_id = Uuid::new_v4();
        let reference = savings_reference(&user_id, 1720000000000);
        assert!(reference.starts_with(SAVINGS_REFERENCE_PREFIX));
        assert_eq!(savings_reference_user_id(&reference), Some(user_id));
    }

    #[test]
    fn disbursement_reference_is_not_a_savings_reference() {
        let application_id = Uuid::new_v4();
        let reference = disbursement_reference(&application_id, 1720000000000);
        assert!(reference.starts_with("hela_"));
        assert!(!reference.starts_with(SAVINGS_REFERENCE_PREFIX));
        assert_eq!(savings_reference_user_id(&reference), None);
    }

    #[test]
    fn malformed_references_yield_nothing() {
        assert_eq!(savings_reference_user_id("hela_savings_junk"), None);
        assert_eq!(savings_reference_user_id(""), None);
        assert_eq!(
            savings_reference_user_id("hela_savings_a_b_c_d_e_1720000000000"),
            None
        );
    }
}
