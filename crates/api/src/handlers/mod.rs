pub mod audit;
pub mod discount;
pub mod pricing;
pub mod product;
