use rust_decimal::Decimal;

// ============================================================================
// Catalog Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Food item not found: {0}")]
    NotFound(i64),

    #[error("Food name cannot be empty")]
    EmptyName,

    #[error("Food name exceeds {max} characters")]
    NameTooLong { max: usize },

    #[error("Category exceeds {max} characters")]
    CategoryTooLong { max: usize },

    #[error("Price must be greater than 0, got {0}")]
    NonPositivePrice(Decimal),

    #[error("Price {0} does not fit in 10 digits with 2 decimals")]
    PriceOutOfRange(Decimal),
}
