use std::fmt;
use std::ops::Add;

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Leave duration kept as a whole number of half-days so that `1.5` days is
/// exact. Serialised as a plain JSON number.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeaveDays(u32);

impl LeaveDays {
    pub const ZERO: LeaveDays = LeaveDays(0);

    pub const fn from_half_days(half_days: u32) -> Self {
        Self(half_days)
    }

    pub const fn whole(days: u32) -> Self {
        Self(days * 2)
    }

    pub const fn half_days(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Inclusive span between two dates, less half a day on the final day
    /// when `is_half_day` is set. `None` if `to` precedes `from`.
    pub fn for_span(from: NaiveDate, to: NaiveDate, is_half_day: bool) -> Option<Self> {
        if from > to {
            return None;
        }
        let span = u32::try_from((to - from).num_days() + 1).ok()?;
        let half_days = span.checked_mul(2)?;
        Some(Self(if is_half_day { half_days - 1 } else { half_days }))
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Accepts only non-negative multiples of 0.5.
    pub fn from_f64(value: f64) -> Option<Self> {
        let doubled = value * 2.0;
        if !doubled.is_finite() || doubled < 0.0 || doubled.fract() != 0.0 || doubled > f64::from(u32::MAX) {
            return None;
        }
        Some(Self(doubled as u32))
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for LeaveDays {
    type Output = LeaveDays;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for LeaveDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl Serialize for LeaveDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for LeaveDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        LeaveDays::from_f64(value)
            .ok_or_else(|| D::Error::custom("days must be a non-negative multiple of 0.5"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[rstest]
    #[case(date(2026, 1, 15), date(2026, 1, 16), false, 4)]
    #[case(date(2026, 1, 15), date(2026, 1, 16), true, 3)]
    #[case(date(2026, 2, 1), date(2026, 2, 1), false, 2)]
    #[case(date(2026, 2, 1), date(2026, 2, 1), true, 1)]
    #[case(date(2026, 2, 27), date(2026, 3, 2), false, 8)]
    fn span_is_inclusive(
        #[case] from: NaiveDate,
        #[case] to: NaiveDate,
        #[case] half_day: bool,
        #[case] expected_half_days: u32,
    ) {
        let days = LeaveDays::for_span(from, to, half_day).expect("valid span");
        assert_eq!(days.half_days(), expected_half_days);
    }

    #[test]
    fn reversed_span_is_rejected() {
        assert_eq!(LeaveDays::for_span(date(2026, 1, 16), date(2026, 1, 15), false), None);
    }

    #[test]
    fn renders_half_days() {
        assert_eq!(LeaveDays::from_half_days(3).to_string(), "1.5");
        assert_eq!(LeaveDays::whole(2).to_string(), "2");
    }

    #[test]
    fn json_number_form() {
        let json = serde_json::to_string(&LeaveDays::from_half_days(3)).expect("serialise");
        assert_eq!(json, "1.5");
        let parsed: LeaveDays = serde_json::from_str("2.5").expect("deserialise");
        assert_eq!(parsed.half_days(), 5);
        assert!(serde_json::from_str::<LeaveDays>("0.3").is_err());
        assert!(serde_json::from_str::<LeaveDays>("-1").is_err());
    }
}
