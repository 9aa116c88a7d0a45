use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// The workshop issuing the documents.
#[derive(Clone, Debug)]
pub struct CompanyProfile {
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Dates on documents and report months are computed in this zone.
    pub timezone: Tz,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "Marcenaria MDF".to_string(),
            tax_id: None,
            phone: None,
            email: None,
            address: None,
            timezone: chrono_tz::America::Sao_Paulo,
        }
    }
}

impl CompanyProfile {
    /// `dd/mm/YYYY HH:MM` in the company time zone.
    pub fn format_datetime(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone)
            .format(DATE_TIME_FORMAT)
            .to_string()
    }

    /// Same as [`Self::format_datetime`] with the Portuguese "às" joiner.
    pub fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone)
            .format("%d/%m/%Y às %H:%M")
            .to_string()
    }
}
