//! Collaborator registry model.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::split::validate_percent;

/// Placeholder shown when a work log references a deleted collaborator.
pub const DELETED_COLLABORATOR: &str = "(deleted)";

/// Staff member paid a percentage of each service they perform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaborator {
    /// Database ID (None for rows not yet saved)
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    /// Share of gross revenue, strictly between 0 and 100.
    pub share_percent: f64,
}

impl Collaborator {
    /// Validate and build a new collaborator from raw input.
    pub fn new(name: &str, share_percent: f64) -> Result<Self> {
        let name = validate_name(name)?;
        validate_percent(share_percent)?;
        Ok(Collaborator {
            id: None,
            name,
            share_percent,
        })
    }
}

/// Trim and reject empty names.
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(crate::Error::validation("name must not be empty"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_name() {
        let c = Collaborator::new("  Ana  ", 40.0).unwrap();
        assert_eq!(c.name, "Ana");
        assert_eq!(c.share_percent, 40.0);
    }

    #[test]
    fn rejects_empty_name_and_boundary_percents() {
        assert!(Collaborator::new("   ", 40.0).is_err());
        assert!(Collaborator::new("Ana", 0.0).is_err());
        assert!(Collaborator::new("Ana", 100.0).is_err());
    }
}
