//! Customer installment receivables
//!
//! The derived fields of a [`Customer`] (`amount_left`, `progress`,
//! `status`) are never stored on their own authority: they are recomputed
//! from `total_selling_price`, `amount_paid`, and `date_next_installment`
//! every time the record is saved.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days ahead of an installment date at which a customer becomes due soon
pub const DUE_SOON_WINDOW_DAYS: u64 = 7;

/// Payment standing of a customer's installment plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "receivable_status", rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
pub enum ReceivableStatus {
    #[default]
    OnTrack,
    DueSoon,
    Overdue,
    FullyPaid,
}

impl ReceivableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceivableStatus::OnTrack => "on-track",
            ReceivableStatus::DueSoon => "due-soon",
            ReceivableStatus::Overdue => "overdue",
            ReceivableStatus::FullyPaid => "fully-paid",
        }
    }

    /// Classify a receivable as of `today`
    pub fn evaluate(
        amount_left: Decimal,
        date_next_installment: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        if amount_left <= Decimal::ZERO {
            return ReceivableStatus::FullyPaid;
        }

        let Some(due) = date_next_installment else {
            return ReceivableStatus::OnTrack;
        };

        if due < today {
            return ReceivableStatus::Overdue;
        }

        let window_end = today
            .checked_add_days(Days::new(DUE_SOON_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX);
        if due <= window_end {
            ReceivableStatus::DueSoon
        } else {
            ReceivableStatus::OnTrack
        }
    }
}

/// Outstanding balance on an installment plan
pub fn amount_left(total_selling_price: Decimal, amount_paid: Decimal) -> Decimal {
    total_selling_price - amount_paid
}

/// Share of the selling price already paid, as a percentage in 0..=100.
///
/// A plan with nothing to pay counts as complete.
pub fn payment_progress(total_selling_price: Decimal, amount_paid: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    if total_selling_price <= Decimal::ZERO {
        return hundred;
    }

    let progress = (amount_paid / total_selling_price * hundred).round_dp(2);
    progress.clamp(Decimal::ZERO, hundred)
}

/// A customer and their installment receivable
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub state: Option<String>,
    pub is_activated: bool,
    pub total_selling_price: Decimal,
    pub amount_paid: Decimal,
    pub amount_left: Decimal,
    pub progress: Decimal,
    pub status: ReceivableStatus,
    pub date_next_installment: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-controlled inputs of a receivable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub total_selling_price: Decimal,
    pub amount_paid: Decimal,
    pub date_next_installment: Option<NaiveDate>,
}

/// Derived receivable fields for a plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceivableSnapshot {
    pub amount_left: Decimal,
    pub progress: Decimal,
    pub status: ReceivableStatus,
}

impl InstallmentPlan {
    pub fn snapshot(&self, today: NaiveDate) -> ReceivableSnapshot {
        let left = amount_left(self.total_selling_price, self.amount_paid);
        ReceivableSnapshot {
            amount_left: left,
            progress: payment_progress(self.total_selling_price, self.amount_paid),
            status: ReceivableStatus::evaluate(left, self.date_next_installment, today),
        }
    }
}

impl Customer {
    pub fn plan(&self) -> InstallmentPlan {
        InstallmentPlan {
            total_selling_price: self.total_selling_price,
            amount_paid: self.amount_paid,
            date_next_installment: self.date_next_installment,
        }
    }

    /// Refresh the derived fields; run before every save
    pub fn recalculate(&mut self, today: NaiveDate) {
        let snapshot = self.plan().snapshot(today);
        self.amount_left = snapshot.amount_left;
        self.progress = snapshot.progress;
        self.status = snapshot.status;
    }
}
