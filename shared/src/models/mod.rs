//! Domain models for the Survey Equipment Ledger

mod catalog;
mod customer;
mod dashboard;
mod payment;
mod sale;
mod user;

pub use catalog::*;
pub use customer::*;
pub use dashboard::*;
pub use payment::*;
pub use sale::*;
pub use user::*;
