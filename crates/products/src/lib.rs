//! Products domain module.
//!
//! Business rules for product records (validation, full-replace updates,
//! soft delete), implemented as pure logic: no IO, no HTTP, no storage.

pub mod product;

pub use product::{MAX_NAME_LEN, Product, ProductFields, ProductInput};
