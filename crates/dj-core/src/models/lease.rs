//! Lease contracts attached to assets.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{apply, apply_opt, apply_text};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum LeaseStatus {
    Upcoming,
    Active,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LeaseContract {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub contract_number: String,
    pub vendor: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Monthly cost in euro cents.
    pub monthly_rate_cents: Option<i64>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaseContract {
    pub fn new(
        asset_id: Uuid,
        contract_number: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            asset_id,
            contract_number: contract_number.into(),
            vendor: None,
            start_date,
            end_date,
            monthly_rate_cents: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Status relative to `today`. Both boundary dates count as active.
    pub fn status_on(&self, today: NaiveDate) -> LeaseStatus {
        if today < self.start_date {
            LeaseStatus::Upcoming
        } else if today > self.end_date {
            LeaseStatus::Expired
        } else {
            LeaseStatus::Active
        }
    }

    /// True when the lease ends within `days` days from `today` and has not ended yet.
    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        let remaining = (self.end_date - today).num_days();
        self.is_active && (0..=days).contains(&remaining)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LeaseUpdate {
    pub contract_number: Option<String>,
    pub vendor: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub monthly_rate_cents: Option<i64>,
    pub notes: Option<String>,
}

impl LeaseUpdate {
    pub fn apply_to(self, lease: &mut LeaseContract) {
        apply(&mut lease.contract_number, self.contract_number);
        apply_text(&mut lease.vendor, self.vendor);
        apply(&mut lease.start_date, self.start_date);
        apply(&mut lease.end_date, self.end_date);
        apply_opt(&mut lease.monthly_rate_cents, self.monthly_rate_cents);
        apply_text(&mut lease.notes, self.notes);
        lease.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_boundaries() {
        let lease = LeaseContract::new(Uuid::new_v4(), "L-1", date(2024, 1, 1), date(2026, 12, 31));
        assert_eq!(lease.status_on(date(2023, 12, 31)), LeaseStatus::Upcoming);
        assert_eq!(lease.status_on(date(2024, 1, 1)), LeaseStatus::Active);
        assert_eq!(lease.status_on(date(2026, 12, 31)), LeaseStatus::Active);
        assert_eq!(lease.status_on(date(2027, 1, 1)), LeaseStatus::Expired);
    }

    #[test]
    fn test_expires_within() {
        let lease = LeaseContract::new(Uuid::new_v4(), "L-2", date(2024, 1, 1), date(2025, 3, 31));
        assert!(lease.expires_within(date(2025, 3, 1), 30));
        assert!(!lease.expires_within(date(2025, 1, 1), 30));
        assert!(!lease.expires_within(date(2025, 4, 1), 30));
    }
}
