//! Monthly figures over a set of budgets.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use engine::{Budget, BudgetStatus, MoneyCents};

use crate::DocumentError;

/// A calendar month, `YYYY-MM` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

impl ReportMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, DocumentError> {
        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return Err(DocumentError::InvalidMonth(format!("{year}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// Month that contains `at`, as seen in `tz`.
    pub fn containing(at: DateTime<Utc>, tz: Tz) -> Self {
        let local = at.with_timezone(&tz);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    fn start_in(self, tz: Tz) -> Result<DateTime<Utc>, DocumentError> {
        let day = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| DocumentError::InvalidMonth(self.to_string()))?;
        // A DST change at midnight skips 00:00, so fall back to the first
        // instant that exists that day.
        (0..3)
            .filter_map(|hour| day.and_hms_opt(hour, 0, 0))
            .find_map(|naive| tz.from_local_datetime(&naive).earliest())
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| DocumentError::InvalidMonth(self.to_string()))
    }

    /// Half-open UTC range `[start, end)` covering the month in `tz`.
    pub fn bounds(self, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>), DocumentError> {
        Ok((self.start_in(tz)?, self.next().start_in(tz)?))
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ReportMonth {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DocumentError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

/// Totals shown on the analysis sheet of the monthly report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonthlySummary {
    pub total: usize,
    pub approved: usize,
    pub draft: usize,
    pub rejected: usize,
    /// Sum of final amounts over every budget, whatever its status.
    pub revenue: MoneyCents,
    /// `revenue / total`, zero for an empty month.
    pub average_ticket: MoneyCents,
}

impl MonthlySummary {
    pub fn from_budgets(budgets: &[Budget]) -> Self {
        let count = |status: BudgetStatus| budgets.iter().filter(|b| b.status == status).count();
        let revenue: MoneyCents = budgets.iter().map(|b| b.final_amount).sum();
        let total = budgets.len();

        Self {
            total,
            approved: count(BudgetStatus::Approved),
            draft: count(BudgetStatus::Draft),
            rejected: count(BudgetStatus::Rejected),
            revenue,
            average_ticket: i64::try_from(total)
                .ok()
                .and_then(|n| revenue.checked_div(n))
                .unwrap_or(MoneyCents::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::{BudgetNumber, BudgetText};
    use uuid::Uuid;

    use super::*;

    fn budget(seq: u32, status: BudgetStatus, final_cents: i64) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            number: BudgetNumber::new(2026, seq).unwrap(),
            title: format!("Job {seq}"),
            customer_id: None,
            subtotal: MoneyCents::new(final_cents),
            discount_percent: None,
            discount_amount: None,
            discount_type: None,
            final_amount: MoneyCents::new(final_cents),
            text: BudgetText::default(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summary_counts_and_averages() {
        let budgets = vec![
            budget(1, BudgetStatus::Approved, 90_000),
            budget(2, BudgetStatus::Draft, 10_000),
            budget(3, BudgetStatus::Rejected, 20_000),
            budget(4, BudgetStatus::Approved, 40_000),
        ];
        let summary = MonthlySummary::from_budgets(&budgets);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.approved, 2);
        assert_eq!(summary.draft, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.revenue, MoneyCents::new(160_000));
        assert_eq!(summary.average_ticket, MoneyCents::new(40_000));
    }

    #[test]
    fn empty_month_has_zero_average() {
        let summary = MonthlySummary::from_budgets(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_ticket, MoneyCents::ZERO);
    }

    #[test]
    fn month_parsing_and_bounds() {
        let month: ReportMonth = "2026-03".parse().unwrap();
        assert_eq!(month.to_string(), "2026-03");
        assert!("2026-13".parse::<ReportMonth>().is_err());
        assert!("2026-3".parse::<ReportMonth>().is_err());
        assert!("march".parse::<ReportMonth>().is_err());

        let (start, end) = month.bounds(chrono_tz::America::Sao_Paulo).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 4, 1, 3, 0, 0).unwrap());

        let december: ReportMonth = "2026-12".parse().unwrap();
        let (_, end) = december.bounds(chrono_tz::UTC).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn containing_uses_local_month() {
        let at = Utc.with_ymd_and_hms(2026, 4, 1, 1, 0, 0).unwrap();
        let month = ReportMonth::containing(at, chrono_tz::America::Sao_Paulo);
        assert_eq!(month, ReportMonth::new(2026, 3).unwrap());
    }
}
