// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Datetime units and the broken-down civil representation.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::adt::date::{is_leap_year, Date};

/// The closed set of datetime units understood by truncation, shifting, and
/// differencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DateTimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl DateTimeUnit {
    /// True for the sub-day units (millisecond through hour).
    ///
    /// Every unit is exactly one of time-granularity or date-granularity;
    /// the two predicates partition the enum.
    pub fn is_time_unit(&self) -> bool {
        matches!(
            self,
            DateTimeUnit::Millisecond
                | DateTimeUnit::Second
                | DateTimeUnit::Minute
                | DateTimeUnit::Hour
        )
    }

    pub fn is_date_unit(&self) -> bool {
        !self.is_time_unit()
    }
}

impl FromStr for DateTimeUnit {
    type Err = String;

    /// Case-insensitive exact keyword match; no abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "millisecond" => Ok(DateTimeUnit::Millisecond),
            "second" => Ok(DateTimeUnit::Second),
            "minute" => Ok(DateTimeUnit::Minute),
            "hour" => Ok(DateTimeUnit::Hour),
            "day" => Ok(DateTimeUnit::Day),
            "week" => Ok(DateTimeUnit::Week),
            "month" => Ok(DateTimeUnit::Month),
            "quarter" => Ok(DateTimeUnit::Quarter),
            "year" => Ok(DateTimeUnit::Year),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for DateTimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DateTimeUnit::Millisecond => "millisecond",
            DateTimeUnit::Second => "second",
            DateTimeUnit::Minute => "minute",
            DateTimeUnit::Hour => "hour",
            DateTimeUnit::Day => "day",
            DateTimeUnit::Week => "week",
            DateTimeUnit::Month => "month",
            DateTimeUnit::Quarter => "quarter",
            DateTimeUnit::Year => "year",
        })
    }
}

/// A broken-down civil date and time, relative to whatever zone it was
/// produced in.
///
/// `day_of_week` is 0=Sunday through 6=Saturday; `day_of_year` is 0-based.
/// Both are bookkeeping derived from the (year, month, day) triple and are
/// not consulted when rebuilding an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub day_of_week: u32,
    pub day_of_year: u32,
}

impl DateTimeFields {
    pub fn from_naive(n: &NaiveDateTime) -> DateTimeFields {
        DateTimeFields {
            year: n.year(),
            month: n.month(),
            day: n.day(),
            hour: n.hour(),
            minute: n.minute(),
            second: n.second(),
            day_of_week: n.weekday().num_days_from_sunday(),
            day_of_year: n.ordinal0(),
        }
    }

    /// Breaks a calendar day down, or `None` when the day count exceeds
    /// chrono's representable range.
    pub fn from_date(d: Date) -> Option<DateTimeFields> {
        let n = d.to_naive()?;
        Some(DateTimeFields {
            year: n.year(),
            month: n.month(),
            day: n.day(),
            hour: 0,
            minute: 0,
            second: 0,
            day_of_week: n.weekday().num_days_from_sunday(),
            day_of_year: n.ordinal0(),
        })
    }

    /// Rebuilds the civil value these fields describe, or `None` when the
    /// triple is not a valid calendar date.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)
    }

    /// The ISO weekday, 1=Monday through 7=Sunday.
    pub fn iso_day_of_week(&self) -> u32 {
        if self.day_of_week == 0 {
            7
        } else {
            self.day_of_week
        }
    }

    /// The ISO-8601 week of year, in `[1, 53]`.
    ///
    /// Week 1 is the week containing the year's first Thursday; a
    /// provisional week number of 0 means the date belongs to the previous
    /// year's last week, and 53 must be confirmed against the year's length.
    pub fn iso_week(&self) -> u32 {
        let yday = i64::from(self.day_of_year) + 1;
        let wday = i64::from(self.iso_day_of_week());
        let week = (10 + yday - wday) / 7;

        // Day of year (1-based) of the Monday of this date's week.
        let monday_of_week = yday - (wday - 1);

        if week == 0 {
            // Belongs to the previous year's last week. That year has 53
            // weeks only if it ended on a Thursday (this year's first Monday
            // is January 4) or was a leap year ending on a Friday (first
            // Monday on January 3).
            let first_monday_of_year = 1 + (monday_of_week + 6) % 7;
            if first_monday_of_year == 4
                || (is_leap_year(self.year - 1) && first_monday_of_year == 3)
            {
                53
            } else {
                52
            }
        } else if week == 53 {
            // A 53rd week must leave at least 3 days of the year after its
            // Monday; otherwise the date is week 1 of the next year.
            let days_in_year = if is_leap_year(self.year) { 366 } else { 365 };
            if days_in_year - monday_of_week < 3 {
                1
            } else {
                53
            }
        } else {
            week as u32
        }
    }

    /// The ISO-8601 week-numbering year, which differs from the calendar
    /// year for dates near year boundaries.
    pub fn iso_year_of_week(&self) -> i32 {
        let wday = self.iso_day_of_week() as i32;
        let day = self.day as i32;
        if self.month == 12 && day >= 29 && day - wday >= 28 {
            // Late December in the same week as next January 1, with that
            // January 1 on a Thursday or earlier.
            self.year + 1
        } else if self.month == 1 && day <= 3 && wday - (day - 1) >= 5 {
            // Early January in the same week as January 1, with January 1 on
            // a Friday or later.
            self.year - 1
        } else {
            self.year
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn unit_parsing() {
        assert_eq!("year".parse(), Ok(DateTimeUnit::Year));
        assert_eq!("QUARTER".parse(), Ok(DateTimeUnit::Quarter));
        assert_eq!("Millisecond".parse(), Ok(DateTimeUnit::Millisecond));
        assert_eq!("mon".parse::<DateTimeUnit>(), Err("mon".to_string()));
        assert_eq!("months".parse::<DateTimeUnit>(), Err("months".to_string()));
        assert_eq!("".parse::<DateTimeUnit>(), Err("".to_string()));
    }

    #[test]
    fn unit_taxonomy_partitions() {
        use DateTimeUnit::*;
        for unit in [
            Millisecond, Second, Minute, Hour, Day, Week, Month, Quarter, Year,
        ] {
            assert_ne!(unit.is_time_unit(), unit.is_date_unit());
        }
        assert!(Hour.is_time_unit());
        assert!(Day.is_date_unit());
        assert!(Week.is_date_unit());
    }

    fn fields(year: i32, month: u32, day: u32) -> DateTimeFields {
        DateTimeFields::from_date(Date::from_ymd(year, month, day).unwrap()).unwrap()
    }

    #[test]
    fn iso_week_concrete() {
        // 2024-12-30 is the Monday of 2025's week 1.
        assert_eq!(fields(2024, 12, 30).iso_week(), 1);
        assert_eq!(fields(2024, 12, 30).iso_year_of_week(), 2025);
        // 2023-01-01 is a Sunday, closing 2022's week 52.
        assert_eq!(fields(2023, 1, 1).iso_week(), 52);
        assert_eq!(fields(2023, 1, 1).iso_year_of_week(), 2022);
        // 2021-01-01 falls in 2020's week 53 (2020 is a 53-week year).
        assert_eq!(fields(2021, 1, 1).iso_week(), 53);
        assert_eq!(fields(2021, 1, 1).iso_year_of_week(), 2020);
        // 2022-01-01 is a Saturday and 2021 is a 52-week year.
        assert_eq!(fields(2022, 1, 1).iso_week(), 52);
        // 2017-01-01 is a Sunday; leap 2016 ended on a Saturday, so it is
        // a 52-week year too.
        assert_eq!(fields(2017, 1, 1).iso_week(), 52);
        assert_eq!(fields(2017, 1, 1).iso_year_of_week(), 2016);
        // 2005-01-01 is a Saturday but leap 2004 ran 53 weeks.
        assert_eq!(fields(2005, 1, 1).iso_week(), 53);
        // Mid-year dates keep their calendar year.
        assert_eq!(fields(2024, 7, 4).iso_year_of_week(), 2024);
    }

    #[test]
    fn iso_week_matches_chrono_over_two_centuries() {
        let start = Date::from_ymd(1900, 1, 1).unwrap().days();
        let end = Date::from_ymd(2100, 12, 31).unwrap().days();
        let mut prev_week = None;
        for days in start..=end {
            let d = Date::new(days);
            let f = DateTimeFields::from_date(d).unwrap();
            let week = f.iso_week();
            let iso = d.to_naive().unwrap().iso_week();
            assert!((1..=53).contains(&week), "week {} for {}", week, d);
            assert_eq!(week, iso.week(), "week mismatch for {}", d);
            assert_eq!(f.iso_year_of_week(), iso.year(), "year mismatch for {}", d);
            if let Some(prev) = prev_week {
                assert!(
                    week == prev || week == prev + 1 || week == 1,
                    "week jumped from {} to {} at {}",
                    prev,
                    week,
                    d
                );
            }
            prev_week = Some(week);
        }
    }

    proptest! {
        #[test]
        fn fields_round_trip(days in -50_000i32..50_000) {
            let d = Date::new(days);
            let f = DateTimeFields::from_date(d).unwrap();
            let rebuilt = f.to_naive().unwrap();
            prop_assert_eq!(rebuilt.date(), d.to_naive().unwrap());
            prop_assert_eq!(f.iso_day_of_week(), d.to_naive().unwrap().weekday().number_from_monday());
        }
    }
}
