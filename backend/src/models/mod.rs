//! Database models for the Survey Equipment Ledger
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
pub use shared::types::Pagination;
