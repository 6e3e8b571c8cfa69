//! Column conversions for the SQLite backend, which stores identifiers,
//! timestamps and dates as TEXT.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use super::DbError;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DbError> {
    Ok(Uuid::parse_str(value)?)
}

pub(crate) fn parse_opt_uuid(value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value.as_deref().map(parse_uuid).transpose()
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
    Ok(NaiveDate::parse_from_str(value, DATE_FORMAT)?)
}

pub(crate) fn parse_opt_date(value: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    value.as_deref().map(parse_date).transpose()
}

/// Fixed-width RFC 3339 so that TEXT ordering matches chronological ordering.
pub(crate) fn timestamp_str(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn date_str(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn opt_date_str(value: &Option<NaiveDate>) -> Option<String> {
    value.as_ref().map(date_str)
}

pub(crate) fn opt_uuid_str(value: &Option<Uuid>) -> Option<String> {
    value.map(|id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_round_trip_and_ordering() {
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let late = early + chrono::Duration::milliseconds(1500);
        let early_s = timestamp_str(&early);
        let late_s = timestamp_str(&late);
        assert!(early_s < late_s);
        assert_eq!(parse_timestamp(&early_s).unwrap(), early);
        assert!(early_s.ends_with('Z'));
    }

    #[test]
    fn test_date_round_trip() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(date_str(&d), "2024-02-29");
        assert_eq!(parse_date("2024-02-29").unwrap(), d);
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_optional_helpers() {
        assert_eq!(parse_opt_uuid(None).unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(parse_opt_uuid(Some(id.to_string())).unwrap(), Some(id));
        assert!(matches!(
            parse_opt_uuid(Some("nope".into())),
            Err(DbError::Serialization(_))
        ));
        assert_eq!(opt_date_str(&None), None);
    }
}
