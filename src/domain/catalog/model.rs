use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::CatalogError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_CATEGORY_LEN: usize = 50;

/// NUMERIC(10, 2) upper bound shared by prices and order totals: 99999999.99
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

// ============================================================================
// Catalog Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogItem {
    pub id: i64,
    pub food_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
}

/// Full set of writable fields, used for both create and full replacement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogItemDraft {
    pub food_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
}

#[cfg(test)]
impl CatalogItemDraft {
    pub fn new(food_name: impl Into<String>, price: Decimal) -> Self {
        Self {
            food_name: food_name.into(),
            category: None,
            description: None,
            price,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl CatalogItemDraft {
    /// Trim text fields, round the price to cents and enforce the column rules.
    pub fn validate(self) -> Result<Self, CatalogError> {
        let food_name = self.food_name.trim().to_string();
        if food_name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if food_name.chars().count() > MAX_NAME_LEN {
            return Err(CatalogError::NameTooLong { max: MAX_NAME_LEN });
        }

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(category) = &category {
            if category.chars().count() > MAX_CATEGORY_LEN {
                return Err(CatalogError::CategoryTooLong { max: MAX_CATEGORY_LEN });
            }
        }

        let price = self.price.round_dp(2);
        if price <= Decimal::ZERO {
            return Err(CatalogError::NonPositivePrice(self.price));
        }
        if price > max_amount() {
            return Err(CatalogError::PriceOutOfRange(self.price));
        }

        Ok(Self {
            food_name,
            category,
            description: self.description,
            price,
        })
    }
}
