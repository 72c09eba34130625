use chrono::NaiveDate;

use crate::config::DateDisplay;
use crate::errors::{LedgerError, Result};

const DMY_FORMAT: &str = "%d/%m/%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

/// Accepts `DD/MM/YYYY` or `YYYY-MM-DD`.
pub fn parse_date_input(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DMY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_FORMAT))
        .map_err(|_| {
            LedgerError::InvalidInput(format!(
                "`{}` is not a date (use DD/MM/YYYY or YYYY-MM-DD)",
                trimmed
            ))
        })
}

pub fn format_date(date: NaiveDate, display: DateDisplay) -> String {
    match display {
        DateDisplay::Dmy => date.format(DMY_FORMAT).to_string(),
        DateDisplay::Iso => date.format(ISO_FORMAT).to_string(),
    }
}
