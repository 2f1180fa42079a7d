//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods that must run inside a caller-owned transaction accept any
//! `PgExecutor`, so both `&PgPool` and `&mut *tx` work.

pub mod audit_repo;
pub mod discount_repo;
pub mod product_repo;

pub use audit_repo::AuditLogRepo;
pub use discount_repo::DiscountRepo;
pub use product_repo::ProductRepo;
