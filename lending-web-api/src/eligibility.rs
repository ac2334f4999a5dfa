use crate::dto::{EmploymentStatus, IncomeLevel};

pub const MIN_LOAN_LIMIT: i64 = 6200;
pub const MAX_LOAN_LIMIT: i64 = 30000;

/// Employment factor in percent, applied to the income-band base.
const EMPLOYED_FACTOR: i64 = 115;
const SELF_EMPLOYED_FACTOR: i64 = 105;
const STUDENT_FACTOR: i64 = 85;
const UNEMPLOYED_FACTOR: i64 = 75;

fn base_amount(income_level: IncomeLevel) -> i64 {
    match income_level {
        IncomeLevel::Below20k => 8000,
        IncomeLevel::From20kTo50k => 15000,
        IncomeLevel::From50kTo100k => 22000,
        IncomeLevel::Above100k => 28000,
    }
}

fn employment_factor(employment_status: EmploymentStatus) -> i64 {
    match employment_status {
        EmploymentStatus::Employed => EMPLOYED_FACTOR,
        EmploymentStatus::SelfEmployed => SELF_EMPLOYED_FACTOR,
        EmploymentStatus::Student => STUDENT_FACTOR,
        EmploymentStatus::Unemployed => UNEMPLOYED_FACTOR,
    }
}

/// Computes the loan limit for an applicant. Total over both enums, so
/// there is no unmatched case to fall through to a zero base.
pub fn loan_limit(income_level: IncomeLevel, employment_status: EmploymentStatus) -> i64 {
    let raw = base_amount(income_level) * employment_factor(employment_status) / 100;
    raw.clamp(MIN_LOAN_LIMIT, MAX_LOAN_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_INCOME: [IncomeLevel; 4] = [
        IncomeLevel::Below20k,
        IncomeLevel::From20kTo50k,
        IncomeLevel::From50kTo100k,
        IncomeLevel::Above100k,
    ];

    const ALL_EMPLOYMENT: [EmploymentStatus; 4] = [
        EmploymentStatus::Employed,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::Student,
        EmploymentStatus::Unemployed,
    ];

    #[test]
    fn every_pair_stays_within_bounds() {
        for income in ALL_INCOME {
            for employment in ALL_EMPLOYMENT {
                let limit = loan_limit(income, employment);
                assert!(
                    (MIN_LOAN_LIMIT..=MAX_LOAN_LIMIT).contains(&limit),
                    "{} / {} produced {}",
                    income,
                    employment,
                    limit
                );
            }
        }
    }

    #[test]
    fn employed_low_income_is_boosted_unclamped() {
        // 8000 * 1.15 = 9200, inside the band
        assert_eq!(
            loan_limit(IncomeLevel::Below20k, EmploymentStatus::Employed),
            9200
        );
    }

    #[test]
    fn employed_high_income_hits_the_cap() {
        // 28000 * 1.15 = 32200, clamped to 30000
        assert_eq!(
            loan_limit(IncomeLevel::Above100k, EmploymentStatus::Employed),
            MAX_LOAN_LIMIT
        );
    }

    #[test]
    fn unemployed_low_income_hits_the_floor() {
        // 8000 * 0.75 = 6000, clamped to 6200
        assert_eq!(
            loan_limit(IncomeLevel::Below20k, EmploymentStatus::Unemployed),
            MIN_LOAN_LIMIT
        );
    }

    #[test]
    fn self_employed_mid_income_floors_the_product() {
        assert_eq!(
            loan_limit(IncomeLevel::From20kTo50k, EmploymentStatus::SelfEmployed),
            15750
        );
        assert_eq!(
            loan_limit(IncomeLevel::From50kTo100k, EmploymentStatus::Student),
            18700
        );
    }

    #[test]
    fn deterministic_for_repeated_calls() {
        for _ in 0..3 {
            assert_eq!(
                loan_limit(IncomeLevel::From50kTo100k, EmploymentStatus::Employed),
                25300
            );
        }
    }
}
