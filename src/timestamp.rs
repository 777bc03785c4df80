//! UTC timestamps with second precision and inclusive ranges of them.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{
    Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::{format_description, time},
};

use crate::Error;

/// The format timestamps are stored in.
///
/// All timestamps are UTC with a fixed width, so comparing the strings in SQL
/// gives the same order as comparing the instants.
const STORAGE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// The format of calendar days, e.g. "2025-10-31".
const DAY_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// An instant in time, normalised to UTC and truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Normalise `date_time` to UTC and drop any fraction of a second.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimestamp] if the instant cannot be
    /// represented in UTC, e.g. "9999-12-31T23:59:59-01:00".
    pub fn new(date_time: OffsetDateTime) -> Result<Self, Error> {
        date_time
            .checked_to_offset(UtcOffset::UTC)
            .map(Self::from_utc)
            .ok_or_else(|| Error::InvalidTimestamp(format!("{date_time} is out of range in UTC")))
    }

    /// The current time.
    pub fn now() -> Self {
        Self::from_utc(OffsetDateTime::now_utc())
    }

    // The earliest supported instant is a whole second, so truncation stays in range.
    fn from_utc(utc: OffsetDateTime) -> Self {
        Self(utc - Duration::nanoseconds(i64::from(utc.nanosecond())))
    }

    /// The wrapped date time, always in UTC.
    pub fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    fn to_storage_string(self) -> Result<String, time::error::Format> {
        self.0.format(STORAGE_FORMAT)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(formatted) => write!(f, "{formatted}"),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

impl TryFrom<OffsetDateTime> for Timestamp {
    type Error = Error;

    fn try_from(value: OffsetDateTime) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time::serde::rfc3339::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let date_time = time::serde::rfc3339::deserialize(deserializer)?;

        Timestamp::new(date_time).map_err(de::Error::custom)
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.to_storage_string()
            .map(ToSqlOutput::from)
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        PrimitiveDateTime::parse(value.as_str()?, STORAGE_FORMAT)
            .map(|date_time| Timestamp(date_time.assume_utc()))
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An inclusive range of timestamps where the start is not after the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// The first instant in the range.
    pub start: Timestamp,
    /// The last instant in the range.
    pub end: Timestamp,
}

impl DateRange {
    /// Create a date range.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidDateRange] if `start` is after `end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }

        Ok(Self { start, end })
    }

    /// The calendar month `month` of `year` as seen from `offset`, from the
    /// first second of its first day to the last second of its last day.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimestamp] if the year is out of range.
    pub fn for_month(year: i32, month: Month, offset: UtcOffset) -> Result<Self, Error> {
        let first_day = Date::from_calendar_date(year, month, 1)
            .map_err(|error| Error::InvalidTimestamp(error.to_string()))?;
        let (next_year, next_month) = match month {
            Month::December => (year + 1, Month::January),
            _ => (year, month.next()),
        };
        let first_day_of_next_month = Date::from_calendar_date(next_year, next_month, 1)
            .map_err(|error| Error::InvalidTimestamp(error.to_string()))?;

        let start = PrimitiveDateTime::new(first_day, Time::MIDNIGHT).assume_offset(offset);
        let end = PrimitiveDateTime::new(first_day_of_next_month, Time::MIDNIGHT)
            .assume_offset(offset)
            - Duration::seconds(1);

        Self::new(Timestamp::new(start)?, Timestamp::new(end)?)
    }

    /// The range from `start` to `end`, where bounds given as calendar days
    /// cover the whole day in the timezone `offset`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimestamp] if a day cannot be represented in
    /// UTC, or an [Error::InvalidDateRange] if the start is after the end.
    pub fn from_bounds(
        start: RangeBound,
        end: RangeBound,
        offset: UtcOffset,
    ) -> Result<Self, Error> {
        Self::new(start.first_instant(offset)?, end.last_instant(offset)?)
    }

    /// Parse a month string such as "2025-10" into the range covering that
    /// month in the timezone `offset`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidMonth] if `month` is not in the format YYYY-MM.
    pub fn parse_month(month: &str, offset: UtcOffset) -> Result<Self, Error> {
        let invalid_month = || Error::InvalidMonth(month.to_owned());

        let (year, month_number) = month.trim().split_once('-').ok_or_else(invalid_month)?;
        let year: i32 = year.parse().map_err(|_| invalid_month())?;
        let month_number: u8 = month_number.parse().map_err(|_| invalid_month())?;
        let month_number = Month::try_from(month_number).map_err(|_| invalid_month())?;

        Self::for_month(year, month_number, offset)
    }

    /// The calendar month containing `now` in the timezone `offset`.
    pub fn current_month(now: Timestamp, offset: UtcOffset) -> Result<Self, Error> {
        let local = now
            .as_offset_date_time()
            .checked_to_offset(offset)
            .ok_or_else(|| Error::InvalidTimestamp(format!("{now} is out of range at {offset}")))?;

        Self::for_month(local.year(), local.month(), offset)
    }
}

/// One end of a date range, either an exact instant or a whole calendar day.
///
/// Deserializes from an RFC3339 timestamp or a day in the format YYYY-MM-DD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// An exact instant.
    Instant(Timestamp),
    /// A calendar day in the local timezone.
    Day(Date),
}

impl RangeBound {
    /// The instant itself, or local midnight at the start of the day.
    pub fn first_instant(self, offset: UtcOffset) -> Result<Timestamp, Error> {
        match self {
            RangeBound::Instant(timestamp) => Ok(timestamp),
            RangeBound::Day(day) => Timestamp::new(
                PrimitiveDateTime::new(day, Time::MIDNIGHT).assume_offset(offset),
            ),
        }
    }

    /// The instant itself, or the last second of the day in local time.
    pub fn last_instant(self, offset: UtcOffset) -> Result<Timestamp, Error> {
        match self {
            RangeBound::Instant(timestamp) => Ok(timestamp),
            RangeBound::Day(day) => Timestamp::new(
                PrimitiveDateTime::new(day, time!(23:59:59)).assume_offset(offset),
            ),
        }
    }
}

impl Serialize for RangeBound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RangeBound::Instant(timestamp) => timestamp.serialize(serializer),
            RangeBound::Day(day) => {
                let text = day.format(DAY_FORMAT).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&text)
            }
        }
    }
}

impl<'de> Deserialize<'de> for RangeBound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let text = text.trim();

        if let Ok(day) = Date::parse(text, DAY_FORMAT) {
            return Ok(RangeBound::Day(day));
        }

        let date_time = OffsetDateTime::parse(text, &Rfc3339).map_err(|_| {
            de::Error::custom(format!(
                "{text:?} is neither a day (YYYY-MM-DD) nor an RFC3339 timestamp"
            ))
        })?;

        Timestamp::new(date_time)
            .map(RangeBound::Instant)
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod timestamp_tests {
    use rusqlite::Connection;
    use time::macros::{datetime, offset};

    use crate::{Error, timestamp::Timestamp};

    #[test]
    fn new_normalises_to_utc_and_whole_seconds() {
        let timestamp = Timestamp::new(datetime!(2025-10-01 09:30:15.75 +8)).unwrap();

        assert_eq!(
            timestamp.as_offset_date_time(),
            datetime!(2025-10-01 01:30:15 UTC)
        );
    }

    #[test]
    fn new_rejects_instants_past_the_end_of_utc() {
        let result = Timestamp::new(datetime!(9999-12-31 23:59:59 -1));

        assert!(
            matches!(result, Err(Error::InvalidTimestamp(_))),
            "got {result:?}"
        );
    }

    #[test]
    fn deserialize_rejects_instants_past_the_end_of_utc() {
        let result = serde_json::from_str::<Timestamp>("\"9999-12-31T23:59:59-01:00\"");

        assert!(result.is_err());
    }

    #[test]
    fn serializes_as_rfc3339() {
        let timestamp = Timestamp::new(datetime!(2025-10-01 09:00:00 UTC)).unwrap();

        assert_eq!(
            serde_json::to_string(&timestamp).unwrap(),
            "\"2025-10-01T09:00:00Z\""
        );
    }

    #[test]
    fn deserializes_offsets() {
        let timestamp: Timestamp = serde_json::from_str("\"2025-10-01T09:00:00+02:00\"").unwrap();

        assert_eq!(
            timestamp,
            Timestamp::new(datetime!(2025-10-01 07:00:00 UTC)).unwrap()
        );
    }

    #[test]
    fn database_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        let want = Timestamp::new(datetime!(2025-10-31 23:59:59 UTC)).unwrap();

        let got: Timestamp = conn
            .query_row("SELECT ?1", [want], |row| row.get(0))
            .unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn stored_strings_sort_like_instants() {
        let conn = Connection::open_in_memory().unwrap();
        let earlier = Timestamp::new(datetime!(2025-10-01 09:00:00 +10)).unwrap();
        let later = Timestamp::new(datetime!(2025-10-01 01:00:00 UTC)).unwrap();

        let is_less: bool = conn
            .query_row("SELECT ?1 < ?2", [earlier, later], |row| row.get(0))
            .unwrap();

        assert!(is_less);
        assert_eq!(offset!(UTC), later.as_offset_date_time().offset());
    }
}
