//! HTTP request handlers

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod equipment_types;
pub mod health;
pub mod notification;
pub mod payments;
pub mod sales;
pub mod suppliers;
pub mod tools;

pub use auth::*;
pub use customers::*;
pub use dashboard::*;
pub use equipment_types::*;
pub use health::*;
pub use notification::*;
pub use payments::*;
pub use sales::*;
pub use suppliers::*;
pub use tools::*;

use crate::services::{AccountService, NotificationService};
use crate::AppState;

/// Account service wired to the configured mail relay
fn account_service(state: &AppState) -> AccountService {
    AccountService::new(state.db.clone(), notification_service(state))
}

fn notification_service(state: &AppState) -> NotificationService {
    NotificationService::new(state.mail.clone(), &state.config.mail)
}
