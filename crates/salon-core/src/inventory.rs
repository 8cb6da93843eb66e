//! Product inventory and its valuation.

use serde::{Deserialize, Serialize};

use crate::collaborator::validate_name;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Database ID (None for rows not yet saved)
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub stock: i64,
}

impl Product {
    pub fn new(
        name: &str,
        description: &str,
        cost_price: f64,
        sale_price: f64,
        stock: i64,
    ) -> Result<Self> {
        let name = validate_name(name)?;
        if !cost_price.is_finite() || cost_price <= 0.0 {
            return Err(Error::validation(format!(
                "cost price must be positive, got {cost_price}"
            )));
        }
        if !sale_price.is_finite() || sale_price <= 0.0 {
            return Err(Error::validation(format!(
                "sale price must be positive, got {sale_price}"
            )));
        }
        if stock < 0 {
            return Err(Error::validation(format!(
                "stock must not be negative, got {stock}"
            )));
        }
        Ok(Product {
            id: None,
            name,
            description: description.trim().to_string(),
            cost_price,
            sale_price,
            stock,
        })
    }
}

/// Inventory rollup over both price bases.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Valuation {
    pub total_cost: f64,
    pub total_sale: f64,
    /// `total_sale - total_cost`
    pub margin: f64,
}

/// Value the given stock at cost and at sale price.
pub fn valuation(products: &[Product]) -> Valuation {
    let mut v = Valuation::default();
    for p in products {
        let stock = p.stock as f64;
        v.total_cost += p.cost_price * stock;
        v.total_sale += p.sale_price * stock;
    }
    v.margin = v.total_sale - v.total_cost;
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valuation_sums_both_bases() {
        let products = vec![
            Product::new("Shampoo", "", 10.0, 15.0, 2).unwrap(),
            Product::new("Gel", "", 5.0, 8.0, 3).unwrap(),
        ];
        let v = valuation(&products);
        assert_eq!(v.total_cost, 35.0);
        assert_eq!(v.total_sale, 46.0);
        assert_eq!(v.margin, 11.0);
    }

    #[test]
    fn empty_inventory_values_to_zero() {
        assert_eq!(valuation(&[]), Valuation::default());
    }

    #[test]
    fn rejects_bad_fields() {
        assert!(Product::new("Shampoo", "", 0.0, 15.0, 2).is_err());
        assert!(Product::new("Shampoo", "", 10.0, -1.0, 2).is_err());
        assert!(Product::new("Shampoo", "", 10.0, 15.0, -2).is_err());
        assert!(Product::new("", "", 10.0, 15.0, 2).is_err());
    }
}
