use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// `conflicting_id` is `None` when the store constraint caught the
    /// overlap rather than the application check.
    #[error("Discount window overlaps an existing window for product {product_id}")]
    OverlapConflict {
        product_id: DbId,
        conflicting_id: Option<DbId>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
