//! Shared types and models for the Survey Equipment Ledger
//!
//! This crate contains the bookkeeping rules shared between the backend,
//! the web front end (via WASM), and the test suites: stock and serial
//! allocation, invoice numbering, and the installment receivables ledger.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
