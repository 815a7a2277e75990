use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Balance-accounting period, written `2025-26`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicYear {
    start: i32,
}

impl AcademicYear {
    pub fn starting(start: i32) -> Self {
        Self { start }
    }

    pub fn start_year(self) -> i32 {
        self.start
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start, (self.start + 1).rem_euclid(100))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("academic year must look like 2025-26, got {0:?}")]
pub struct AcademicYearParseError(pub String);

impl FromStr for AcademicYear {
    type Err = AcademicYearParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AcademicYearParseError(s.to_string());
        let (head, tail) = s.trim().split_once('-').ok_or_else(err)?;
        let digits = |part: &str, len: usize| {
            part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(head, 4) || !digits(tail, 2) {
            return Err(err());
        }
        let start: i32 = head.parse().map_err(|_| err())?;
        let end: i32 = tail.parse().map_err(|_| err())?;
        if (start + 1).rem_euclid(100) != end {
            return Err(err());
        }
        Ok(Self { start })
    }
}

impl Serialize for AcademicYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AcademicYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Maps calendar dates onto academic years.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AcademicCalendar {
    start_month: u32,
}

impl AcademicCalendar {
    /// `start_month` is 1-based; out-of-range values fall back to June.
    pub fn new(start_month: u32) -> Self {
        let start_month = if (1..=12).contains(&start_month) { start_month } else { 6 };
        Self { start_month }
    }

    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    pub fn year_of(&self, date: NaiveDate) -> AcademicYear {
        if date.month() >= self.start_month {
            AcademicYear::starting(date.year())
        } else {
            AcademicYear::starting(date.year() - 1)
        }
    }
}

impl Default for AcademicCalendar {
    fn default() -> Self {
        Self::new(6)
    }
}
