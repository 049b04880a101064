//! Wall-clock helpers: date/time parsing, half-open minute intervals and time windows.
//!
//! Slot arithmetic is done in whole minutes since midnight so that adding a
//! duration can never silently wrap past midnight the way `NaiveTime + Duration`
//! does.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Minutes in a day; no interval may end after this.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns [`BookingError::InvalidInput`] for anything else.
pub fn parse_date(s: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidInput(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

/// Parse a time of day in `HH:MM` or `HH:MM:SS` form.
///
/// # Errors
///
/// Returns [`BookingError::InvalidInput`] for anything else.
pub fn parse_time(s: &str) -> Result<NaiveTime, BookingError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| BookingError::InvalidInput(format!("invalid time '{s}', expected HH:MM")))
}

/// Whole minutes since midnight. Seconds are truncated.
#[must_use]
pub fn minutes_of(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Time of day for a minute offset, `None` at or past midnight.
#[must_use]
pub fn time_at(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// A half-open interval `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Interval of `duration` minutes starting at `start`.
    #[must_use]
    pub fn starting_at(start: NaiveTime, duration: u32) -> Self {
        let start = minutes_of(start);
        Self::new(start, start + duration)
    }

    /// `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`; touching intervals do not.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A non-empty window of the day, such as working hours or a lunch break.
///
/// Serializes as `{"start": "09:00", "end": "19:00"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
}

#[derive(Deserialize)]
struct RawWindow {
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = BookingError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Create a window.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInput`] unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, BookingError> {
        // Truncate to whole minutes so the stored value matches the interval math.
        let start = time_at(minutes_of(start)).unwrap_or(start);
        let end = time_at(minutes_of(end)).unwrap_or(end);
        if start >= end {
            return Err(BookingError::InvalidInput(format!(
                "window start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both ends from `HH:MM` strings.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInput`] for malformed times or `start >= end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, BookingError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::new(minutes_of(self.start), minutes_of(self.end))
    }

    /// Overlap of two windows, `None` if they do not intersect.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    #[must_use]
    pub fn contains_window(&self, other: &Self) -> bool {
        self.interval().contains(&other.interval())
    }
}

/// Serde adapter for `HH:MM` times. Deserialization also accepts `HH:MM:SS`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as `HH:MM`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    /// Deserialize from `HH:MM` or `HH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Fails on malformed input.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_time(&s).map_err(serde::de::Error::custom)
    }

    /// `Option<NaiveTime>` variant.
    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Serialize as `HH:MM` or `null`.
        ///
        /// # Errors
        ///
        /// Propagates serializer errors.
        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => serializer.collect_str(&time.format("%H:%M")),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize from `HH:MM`, `HH:MM:SS` or `null`.
        ///
        /// # Errors
        ///
        /// Fails on malformed input.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|s| crate::types::clock::parse_time(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-12-25").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
        );
        assert!(matches!(
            parse_date("25/12/2024"),
            Err(BookingError::InvalidInput(_))
        ));
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_time_accepts_seconds() {
        assert_eq!(parse_time("09:30").unwrap(), parse_time("09:30:00").unwrap());
        assert!(parse_time("9h30").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_half_open_overlap() {
        let nine = Interval::new(540, 570);
        assert!(nine.overlaps(&Interval::new(555, 585)));
        // touching at the boundary is not a conflict
        assert!(!nine.overlaps(&Interval::new(570, 600)));
        assert!(!Interval::new(510, 540).overlaps(&nine));
    }

    #[test]
    fn test_time_at_midnight_is_none() {
        assert_eq!(time_at(MINUTES_PER_DAY), None);
        assert_eq!(time_at(18 * 60 + 30), Some(parse_time("18:30").unwrap()));
    }

    #[test]
    fn test_window_requires_start_before_end() {
        assert!(TimeWindow::parse("19:00", "09:00").is_err());
        assert!(TimeWindow::parse("09:00", "09:00").is_err());
        assert!(TimeWindow::parse("09:00", "19:00").is_ok());
    }

    #[test]
    fn test_window_intersection() {
        let barber = TimeWindow::parse("09:00", "19:00").unwrap();
        let shop = TimeWindow::parse("08:00", "18:00").unwrap();
        let both = barber.intersect(&shop).unwrap();
        assert_eq!(both, TimeWindow::parse("09:00", "18:00").unwrap());

        let night = TimeWindow::parse("20:00", "22:00").unwrap();
        assert!(barber.intersect(&night).is_none());
    }

    #[test]
    fn test_window_serde() {
        let window = TimeWindow::parse("12:00", "13:00").unwrap();
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(json, r#"{"start":"12:00","end":"13:00"}"#);
        assert!(serde_json::from_str::<TimeWindow>(r#"{"start":"13:00","end":"12:00"}"#).is_err());
    }
}
