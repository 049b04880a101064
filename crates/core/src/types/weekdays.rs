//! Sets of weekdays, numbered 0 (Sunday) through 6 (Saturday).

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// A set of weekdays stored as a 7-bit mask.
///
/// Serializes as a sorted array of day numbers (`[1, 2, 3, 4, 5, 6]` is Monday to
/// Saturday), the same numbering used by the storage `SMALLINT[]` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WorkDays(u8);

impl WorkDays {
    /// No days.
    pub const NONE: Self = Self(0);
    /// Every day of the week.
    pub const ALL: Self = Self(0b111_1111);
    /// Monday through Saturday, the usual barbershop week.
    pub const MON_TO_SAT: Self = Self(0b111_1110);

    /// Build a set from day numbers.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInput`] for any number above 6.
    pub fn from_days<I>(days: I) -> Result<Self, BookingError>
    where
        I: IntoIterator<Item = u8>,
    {
        days.into_iter().try_fold(Self::NONE, |set, day| {
            if day > 6 {
                Err(BookingError::InvalidInput(format!(
                    "weekday must be between 0 (Sunday) and 6 (Saturday), got {day}"
                )))
            } else {
                Ok(Self(set.0 | (1 << day)))
            }
        })
    }

    /// Returns `true` if the weekday is in the set.
    #[must_use]
    pub fn contains(self, weekday: Weekday) -> bool {
        // Sunday = 0 .. Saturday = 6
        let day = weekday.num_days_from_sunday();
        self.0 & (1 << day) != 0
    }

    /// Returns `true` if the weekday of `date` is in the set.
    #[must_use]
    pub fn contains_date(self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Day numbers in ascending order.
    #[must_use]
    pub fn days(self) -> Vec<u8> {
        (0..7).filter(|day| self.0 & (1 << day) != 0).collect()
    }
}

impl TryFrom<Vec<u8>> for WorkDays {
    type Error = BookingError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_days(days)
    }
}

impl From<WorkDays> for Vec<u8> {
    fn from(set: WorkDays) -> Self {
        set.days()
    }
}
