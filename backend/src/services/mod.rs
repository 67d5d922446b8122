//! Business logic services for the Survey Equipment Ledger

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidationError;

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod notification;
pub mod payments;
pub mod receivables;
pub mod sales;

pub use accounts::AccountService;
pub use auth::AuthService;
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use notification::NotificationService;
pub use payments::PaymentService;
pub use receivables::ReceivablesService;
pub use sales::SalesService;

/// Calendar date on the host clock
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `validator` hook rejecting negative money amounts
pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    shared::validate_amount(*value).map_err(|msg| {
        let mut err = ValidationError::new("non_negative");
        err.message = Some(msg.into());
        err
    })
}
