//! Wall-clock access in the configured event timezone.

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, AppResult};

/// Source of "now" for scheduling decisions.
///
/// Event dates and times are stored without an offset and interpreted in a
/// single configured timezone, so every comparison goes through this clock.
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    tz: Tz,
    frozen: Option<NaiveDateTime>,
}

impl LocalClock {
    /// Create a clock for the given timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz, frozen: None }
    }

    /// A clock stuck at `at`, for tests.
    #[must_use]
    pub const fn frozen(at: NaiveDateTime) -> Self {
        Self {
            tz: Tz::UTC,
            frozen: Some(at),
        }
    }

    /// Create a clock from an IANA timezone name such as `Europe/Berlin`.
    pub fn from_name(name: &str) -> AppResult<Self> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|e| AppError::Config(format!("Invalid timezone {name}: {e}")))
    }

    /// The configured timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Current local time in the configured timezone.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.frozen
            .unwrap_or_else(|| Utc::now().with_timezone(&self.tz).naive_local())
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        let clock = LocalClock::from_name("Europe/Berlin").unwrap();
        assert_eq!(clock.timezone(), Tz::Europe__Berlin);
    }

    #[test]
    fn test_from_name_invalid() {
        let err = LocalClock::from_name("Mars/Olympus").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_utc_now_matches_system() {
        let now = LocalClock::default().now();
        let diff = (Utc::now().naive_utc() - now).num_seconds().abs();
        assert!(diff < 5);
    }

    #[test]
    fn test_frozen_clock() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(LocalClock::frozen(at).now(), at);
    }
}
