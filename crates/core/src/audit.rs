//! Audit logging constants and utility functions.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the repository layer and the HTTP layer.

use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for audit log entries.
pub mod action_types {
    pub const DISCOUNT_CREATE: &str = "discount_create";
    pub const DISCOUNT_UPDATE: &str = "discount_update";
    pub const DISCOUNT_DELETE: &str = "discount_delete";
    pub const PRODUCT_CREATE: &str = "product_create";
    pub const PRODUCT_DELETE: &str = "product_delete";
}

// ---------------------------------------------------------------------------
// Entity type constants
// ---------------------------------------------------------------------------

/// Entity types recorded alongside an action.
pub mod entity_types {
    pub const DISCOUNT: &str = "discount";
    pub const PRODUCT: &str = "product";
}

// ---------------------------------------------------------------------------
// Details payload
// ---------------------------------------------------------------------------

/// Build the `details_json` payload for a mutation: `{"old": ..., "new": ...}`.
///
/// Absent snapshots are stored as `null` so every entry has the same shape.
pub fn change_details(old: Option<Value>, new: Option<Value>) -> Value {
    json!({
        "old": old.unwrap_or(Value::Null),
        "new": new.unwrap_or(Value::Null),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
