use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

const FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The current day in the local timezone. Call once per operation and pass
    /// the key along, so one operation never straddles midnight.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// `None` once the subtraction runs past the earliest representable date.
    pub fn days_before(self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(Self)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date key `{0}`, expected YYYY-MM-DD")]
pub struct DateKeyError(String);

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields; the ledger key must round-trip exactly.
        let key = NaiveDate::parse_from_str(s, FORMAT)
            .map(Self)
            .map_err(|_| DateKeyError(s.to_string()))?;
        if key.to_string() != s {
            return Err(DateKeyError(s.to_string()));
        }
        Ok(key)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub fn today_key() -> DateKey {
    DateKey::today()
}

pub fn last_n_days(n: usize) -> Vec<DateKey> {
    last_n_days_from(DateKey::today(), n)
}

/// Oldest first, ending at `today`. Stops early at the earliest representable date.
pub fn last_n_days_from(today: DateKey, n: usize) -> Vec<DateKey> {
    let n = u64::try_from(n).unwrap_or(u64::MAX);
    let mut days: Vec<DateKey> = (0..n)
        .map_while(|offset| today.days_before(offset))
        .collect();
    days.reverse();
    days
}
