// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A calendar-day abstract data type.

use std::fmt;

use anyhow::bail;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days between the proleptic-Gregorian day 1 (0001-01-01) and the Unix
/// epoch (1970-01-01).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_162;

/// A date, stored as a signed count of days since the Unix epoch.
///
/// In one-to-one correspondence with a (year, month, day) triple under the
/// proleptic Gregorian calendar; carries no time of day and no time zone.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Date(i32);

impl Date {
    pub fn new(days: i32) -> Date {
        Date(days)
    }

    /// Constructs a `Date` from a calendar triple, rejecting invalid
    /// combinations (month out of range, day past the month's length).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Date, anyhow::Error> {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(d) => Ok(Date::from_naive(d)),
            None => bail!("invalid date: {}-{}-{}", year, month, day),
        }
    }

    /// Days since the Unix epoch; negative for dates before 1970-01-01.
    pub fn days(&self) -> i32 {
        self.0
    }

    pub fn checked_add_days(&self, days: i32) -> Option<Date> {
        self.0.checked_add(days).map(Date)
    }

    /// Returns `None` for day counts past chrono's ±262,000-year range.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        let days_from_ce = self.0.checked_add(UNIX_EPOCH_DAYS_FROM_CE + 1)?;
        NaiveDate::from_num_days_from_ce_opt(days_from_ce)
    }

    pub fn from_naive(d: NaiveDate) -> Date {
        Date(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE - 1)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_naive() {
            Some(d) => write!(f, "{}", d),
            None => write!(f, "{}d", self.0),
        }
    }
}

/// Reports whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// The number of days in the given month, accounting for leap Februaries.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => unreachable!("month out of range: {}", month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_day_zero() {
        assert_eq!(Date::from_ymd(1970, 1, 1).unwrap(), Date::new(0));
        assert_eq!(Date::from_ymd(1970, 1, 2).unwrap(), Date::new(1));
        assert_eq!(Date::from_ymd(1969, 12, 31).unwrap(), Date::new(-1));
    }

    #[test]
    fn ymd_round_trip() {
        for days in [-141_427, -1, 0, 1, 18_262, 20_148] {
            let d = Date::new(days);
            assert_eq!(Date::from_naive(d.to_naive().unwrap()), d);
        }
        assert_eq!(Date::new(18_262).to_string(), "2020-01-01");
    }

    #[test]
    fn to_naive_rejects_out_of_range() {
        assert_eq!(Date::new(i32::MAX).to_naive(), None);
        assert_eq!(Date::new(i32::MIN).to_naive(), None);
        assert!(Date::new(95_000_000).to_naive().is_some());
    }

    #[test]
    fn from_ymd_rejects_invalid() {
        assert!(Date::from_ymd(2023, 2, 29).is_err());
        assert!(Date::from_ymd(2023, 13, 1).is_err());
        assert!(Date::from_ymd(2024, 2, 29).is_ok());
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 4), 30);
    }
}
