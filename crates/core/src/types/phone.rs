//! Client phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("phone must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that never appears in a phone number.
    #[error("phone contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// Too few or too many digits.
    #[error("phone must contain between {min} and {max} digits")]
    DigitCount {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A client phone number as typed by the front desk, e.g. `(11) 99999-1111`.
///
/// ## Constraints
///
/// - Length: 1-20 characters (the storage column width)
/// - Only digits, spaces and `+ ( ) - .`
/// - Between 8 and 15 digits (E.164 maximum)
///
/// ## Examples
///
/// ```
/// use royal_barber_core::Phone;
///
/// assert!(Phone::parse("(11) 99999-1111").is_ok());
/// assert!(Phone::parse("+55 11 98888-2222").is_ok());
///
/// assert!(Phone::parse("").is_err());          // empty
/// assert!(Phone::parse("call me").is_err());   // letters
/// assert!(Phone::parse("123").is_err());       // too few digits
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Maximum stored length.
    pub const MAX_LENGTH: usize = 20;
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 8;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 20 characters
    /// - Contains anything other than digits, spaces and `+ ( ) - .`
    /// - Has fewer than 8 or more than 15 digits
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(PhoneError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_digit() || matches!(c, ' ' | '+' | '(' | ')' | '-' | '.')))
        {
            return Err(PhoneError::InvalidCharacter(bad));
        }

        let digits = s.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(PhoneError::DigitCount {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone as typed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Only the digits, useful for lookups and dialing.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_phones() {
        assert!(Phone::parse("(11) 99999-1111").is_ok());
        assert!(Phone::parse("11999991111").is_ok());
        assert!(Phone::parse("+55 (11) 4444-6666").is_ok());
        assert!(Phone::parse("555.123.4567").is_ok());
    }

    #[test]
    fn test_parse_trims() {
        let phone = Phone::parse("  (11) 88888-2222 ").unwrap();
        assert_eq!(phone.as_str(), "(11) 88888-2222");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Phone::parse("   "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Phone::parse("+55 (11) 99999-1111 99"),
            Err(PhoneError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            Phone::parse("11 9999x1111"),
            Err(PhoneError::InvalidCharacter('x'))
        );
    }

    #[test]
    fn test_parse_digit_count() {
        assert!(matches!(
            Phone::parse("(11) 99"),
            Err(PhoneError::DigitCount { .. })
        ));
    }

    #[test]
    fn test_digits() {
        let phone = Phone::parse("(11) 77777-3333").unwrap();
        assert_eq!(phone.digits(), "11777773333");
    }

    #[test]
    fn test_serde_validates() {
        let phone: Phone = serde_json::from_str("\"(11) 55555-5555\"").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"(11) 55555-5555\"");
        assert!(serde_json::from_str::<Phone>("\"nope\"").is_err());
    }
}
