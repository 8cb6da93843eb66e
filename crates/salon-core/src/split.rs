//! Revenue split calculation.
//!
//! A performed service splits its gross amount between the collaborator who
//! did the work and the owner. The owner share is derived by subtraction so
//! the two shares always sum back to the gross amount exactly, even when
//! the percentage multiplication rounds.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Result of splitting a gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub collaborator_share: f64,
    pub owner_share: f64,
}

/// Check that a share percent lies strictly between 0 and 100.
pub fn validate_percent(percent: f64) -> Result<()> {
    if !percent.is_finite() || percent <= 0.0 || percent >= 100.0 {
        return Err(Error::validation(format!(
            "share percent must be between 0 and 100 exclusive, got {percent}"
        )));
    }
    Ok(())
}

/// Check that a money amount is a positive finite number.
pub fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// Split a gross amount between collaborator and owner.
///
/// `collaborator_share = gross * percent / 100`; the owner keeps the rest.
pub fn split(gross: f64, percent: f64) -> Result<Split> {
    validate_amount(gross)?;
    validate_percent(percent)?;

    let collaborator_share = gross * percent / 100.0;
    let owner_share = gross - collaborator_share;

    Ok(Split {
        collaborator_share,
        owner_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sum_to_gross_exactly() {
        for gross in [0.01, 1.0, 99.99, 100.0, 12345.67] {
            for percent in [0.5, 10.0, 33.33, 40.0, 66.67, 99.5] {
                let s = split(gross, percent).unwrap();
                assert_eq!(s.collaborator_share + s.owner_share, gross);
            }
        }
    }

    #[test]
    fn collaborator_share_matches_formula() {
        let s = split(250.0, 35.0).unwrap();
        assert!((s.collaborator_share - 87.5).abs() < 1e-9);
        assert!((s.owner_share - 162.5).abs() < 1e-9);
    }

    #[test]
    fn forty_percent_of_one_hundred() {
        let s = split(100.0, 40.0).unwrap();
        assert_eq!(s.collaborator_share, 40.0);
        assert_eq!(s.owner_share, 60.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(split(0.0, 40.0).is_err());
        assert!(split(-5.0, 40.0).is_err());
        assert!(split(100.0, 0.0).is_err());
        assert!(split(100.0, 100.0).is_err());
        assert!(split(100.0, -3.0).is_err());
        assert!(split(f64::NAN, 40.0).is_err());
        assert!(split(100.0, f64::INFINITY).is_err());
    }

    #[test]
    fn deterministic() {
        let a = split(73.21, 41.5).unwrap();
        let b = split(73.21, 41.5).unwrap();
        assert_eq!(a, b);
    }
}
