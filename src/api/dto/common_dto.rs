//! Query parameter types and helpers shared across endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::TrackerError;

/// Date wire format of every endpoint.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Optional `?date=` parameter.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateParams {
    /// Calendar date as `YYYY-MM-DD`. Defaults to today in the tracker's
    /// offset.
    #[serde(default)]
    pub date: Option<String>,
}

impl DateParams {
    /// Resolves the parameter, falling back to `today`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidDate`] if the value is not
    /// `YYYY-MM-DD`.
    pub fn resolve(&self, today: NaiveDate) -> Result<NaiveDate, TrackerError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(today),
            Some(raw) => parse_date(raw),
        }
    }
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidDate`] on any other shape.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| TrackerError::InvalidDate(raw.to_string()))
}

/// Returns a required, non-blank parameter.
///
/// # Errors
///
/// Returns [`TrackerError::MissingParameter`] when absent or blank.
pub fn required<'a>(
    value: Option<&'a str>,
    name: &'static str,
) -> Result<&'a str, TrackerError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TrackerError::MissingParameter(name)),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        let Some(d) = NaiveDate::from_ymd_opt(2026, 1, 15) else {
            panic!("valid date");
        };
        d
    }

    #[test]
    fn blank_date_means_today() {
        assert!(matches!(DateParams::default().resolve(today()), Ok(d) if d == today()));
        let blank = DateParams {
            date: Some("  ".to_string()),
        };
        assert!(matches!(blank.resolve(today()), Ok(d) if d == today()));
    }

    #[test]
    fn explicit_date_is_parsed() {
        let params = DateParams {
            date: Some("2025-12-24".to_string()),
        };
        let Ok(date) = params.resolve(today()) else {
            panic!("date parses");
        };
        assert_eq!(date.to_string(), "2025-12-24");
    }

    #[test]
    fn malformed_date_is_rejected() {
        for raw in ["12/24/2025", "2025-13-01", "yesterday"] {
            assert!(matches!(parse_date(raw), Err(TrackerError::InvalidDate(_))));
        }
    }

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(matches!(
            required(None, "resort"),
            Err(TrackerError::MissingParameter("resort"))
        ));
        assert!(matches!(
            required(Some(" "), "terrain"),
            Err(TrackerError::MissingParameter("terrain"))
        ));
        assert!(matches!(required(Some(" brighton "), "resort"), Ok("brighton")));
    }
}
