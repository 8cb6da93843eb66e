//! Service catalog model.
//!
//! A service carries its list price; the revenue share percent lives on the
//! collaborator, not here. The price is the default gross amount when a
//! work entry is recorded against the service.

use serde::{Deserialize, Serialize};

use crate::collaborator::validate_name;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Database ID (None for rows not yet saved)
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub price: f64,
}

impl Service {
    pub fn new(name: &str, price: f64) -> Result<Self> {
        let name = validate_name(name)?;
        if !price.is_finite() || price < 0.0 {
            return Err(Error::validation(format!(
                "service price must not be negative, got {price}"
            )));
        }
        Ok(Service {
            id: None,
            name,
            price,
        })
    }
}

/// Default catalog seeded into a fresh store.
pub fn default_catalog() -> Vec<Service> {
    [
        ("Corte de pelo", 15.0),
        ("Tinturado", 45.0),
        ("Ondulado", 35.0),
        ("Planchado", 25.0),
    ]
    .into_iter()
    .map(|(name, price)| Service {
        id: None,
        name: name.to_string(),
        price,
    })
    .collect()
}
