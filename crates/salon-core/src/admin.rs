//! Administrator attendance register.
//!
//! Small presence sheet for the people running the salon: each admin can be
//! marked present or absent, and the register remembers when attendance was
//! last toggled.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::collaborator::validate_name;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    /// Database ID (None for rows not yet saved)
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    /// Currently marked present
    #[serde(default)]
    pub present: bool,
    /// When attendance was last toggled
    #[serde(default)]
    pub last_check: Option<NaiveDateTime>,
}

impl Admin {
    /// New admin, absent and with no attendance record yet.
    pub fn new(name: &str) -> Result<Self> {
        let name = validate_name(name)?;
        Ok(Admin {
            id: None,
            name,
            present: false,
            last_check: None,
        })
    }

    /// Flip presence and stamp the check time.
    pub fn toggle(&mut self, now: NaiveDateTime) {
        self.present = !self.present;
        self.last_check = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn new_admin_starts_absent_and_unchecked() {
        let admin = Admin::new("  Marta ").unwrap();
        assert_eq!(admin.name, "Marta");
        assert!(!admin.present);
        assert!(admin.last_check.is_none());
    }

    #[test]
    fn toggle_flips_presence_and_stamps_the_time() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut admin = Admin::new("Marta").unwrap();

        admin.toggle(now);
        assert!(admin.present);
        assert_eq!(admin.last_check, Some(now));

        admin.toggle(now);
        assert!(!admin.present);
    }

    #[test]
    fn rejects_empty_name() {
        assert!(Admin::new("   ").is_err());
    }
}
