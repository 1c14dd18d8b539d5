//! # Item Loans
//!
//! Physical items lent between friends. Returning is a one-way
//! transition; reminders are computed on read from the interval
//! fields, there is no scheduler.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use khata_core::ValidationError;

use crate::error::PrivateError;

/// Default days between reminders for a loan.
pub const DEFAULT_REMINDER_INTERVAL_DAYS: u32 = 3;

/// Lifecycle status of an item loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// The item is out.
    Active,
    /// The item came back. Terminal.
    Returned,
}

/// Fields the caller provides when recording an item loan.
#[derive(Debug, Clone)]
pub struct NewItemLoan {
    /// Account borrowing the item.
    pub borrower_id: Uuid,
    /// Name of the item.
    pub item_name: String,
    /// Free-text description.
    pub item_description: Option<String>,
    /// When the item was handed over.
    pub lent_date: NaiveDate,
    /// When it is expected back, if agreed.
    pub expected_return_date: Option<NaiveDate>,
    /// Whether reminders should fire for this loan.
    pub reminder_enabled: bool,
    /// Days between reminders; defaults when absent.
    pub reminder_interval_days: Option<u32>,
}

/// An item lent by one private account to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemLoan {
    /// Unique id.
    pub id: Uuid,
    /// Lending account.
    pub owner_id: Uuid,
    /// Borrowing account.
    pub borrower_id: Uuid,
    /// Name of the item.
    pub item_name: String,
    /// Free-text description.
    pub item_description: Option<String>,
    /// When the item was handed over.
    pub lent_date: NaiveDate,
    /// When it is expected back, if agreed.
    pub expected_return_date: Option<NaiveDate>,
    /// Current status.
    pub status: LoanStatus,
    /// Whether reminders fire for this loan.
    pub reminder_enabled: bool,
    /// Days between reminders.
    pub reminder_interval_days: u32,
    /// Last time a reminder went out, if ever.
    pub last_reminder_sent_at: Option<DateTime<Utc>>,
    /// When the loan was recorded.
    pub created_at: DateTime<Utc>,
}

impl ItemLoan {
    /// Record a new loan from `owner_id`.
    pub fn new(owner_id: Uuid, new: NewItemLoan, now: DateTime<Utc>) -> Result<Self, PrivateError> {
        if owner_id == new.borrower_id {
            return Err(PrivateError::SelfTarget);
        }
        let item_name = new.item_name.trim();
        if item_name.is_empty() {
            return Err(ValidationError::Required { field: "item_name" }.into());
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            borrower_id: new.borrower_id,
            item_name: item_name.to_owned(),
            item_description: new.item_description.filter(|d| !d.trim().is_empty()),
            lent_date: new.lent_date,
            expected_return_date: new.expected_return_date,
            status: LoanStatus::Active,
            reminder_enabled: new.reminder_enabled,
            reminder_interval_days: new
                .reminder_interval_days
                .unwrap_or(DEFAULT_REMINDER_INTERVAL_DAYS),
            last_reminder_sent_at: None,
            created_at: now,
        })
    }

    /// Mark the item returned. Repeating the transition is an error.
    pub fn mark_returned(&mut self) -> Result<(), PrivateError> {
        if self.status == LoanStatus::Returned {
            return Err(PrivateError::AlreadyReturned);
        }
        self.status = LoanStatus::Returned;
        Ok(())
    }

    /// Whether a reminder is due at `now`: the loan is active with
    /// reminders on, and either none was ever sent or the interval has
    /// elapsed since the last one.
    pub fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        if self.status != LoanStatus::Active || !self.reminder_enabled {
            return false;
        }
        match self.last_reminder_sent_at {
            None => true,
            Some(last) => now >= last + Duration::days(i64::from(self.reminder_interval_days)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn loan() -> ItemLoan {
        ItemLoan::new(
            Uuid::new_v4(),
            NewItemLoan {
                borrower_id: Uuid::new_v4(),
                item_name: "Drill".into(),
                item_description: None,
                lent_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                expected_return_date: None,
                reminder_enabled: true,
                reminder_interval_days: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn self_loan_rejected() {
        let me = Uuid::new_v4();
        let err = ItemLoan::new(
            me,
            NewItemLoan {
                borrower_id: me,
                item_name: "Drill".into(),
                item_description: None,
                lent_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                expected_return_date: None,
                reminder_enabled: true,
                reminder_interval_days: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, PrivateError::SelfTarget);
    }

    #[test]
    fn interval_defaults_to_three_days() {
        assert_eq!(loan().reminder_interval_days, 3);
    }

    #[test]
    fn return_is_one_way() {
        let mut item = loan();
        item.mark_returned().unwrap();
        assert_eq!(item.status, LoanStatus::Returned);
        assert_eq!(item.mark_returned(), Err(PrivateError::AlreadyReturned));
    }

    #[test]
    fn reminder_due_when_never_sent() {
        assert!(loan().reminder_due(Utc::now()));
    }

    #[test]
    fn reminder_due_follows_interval() {
        let mut item = loan();
        let sent = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        item.last_reminder_sent_at = Some(sent);
        assert!(!item.reminder_due(sent + Duration::days(2)));
        assert!(item.reminder_due(sent + Duration::days(3)));
    }

    #[test]
    fn no_reminders_when_disabled_or_returned() {
        let mut item = loan();
        item.reminder_enabled = false;
        assert!(!item.reminder_due(Utc::now()));

        let mut returned = loan();
        returned.mark_returned().unwrap();
        assert!(!returned.reminder_due(Utc::now()));
    }
}
