// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Timezone handling.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, Offset, TimeZone};
use chrono_tz::Tz;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::adt::timestamp::Timestamp;

/// A timezone, either a fixed UTC offset or a named IANA zone with its full
/// transition history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timezone {
    FixedOffset(FixedOffset),
    Tz(Tz),
}

// `chrono::FixedOffset` carries no serde support, so serialize through the
// textual form, which `FromStr` accepts back.
impl Serialize for Timezone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| D::Error::custom(format!("invalid timezone: {}", e)))
    }
}

impl Timezone {
    pub fn utc() -> Timezone {
        Timezone::Tz(Tz::UTC)
    }

    /// The UTC offset in effect at `ts`, in seconds east of Greenwich.
    ///
    /// Instants outside chrono's representable range are clamped to its
    /// bounds before the lookup; the nearest recorded rule applies.
    pub fn offset_at(&self, ts: Timestamp) -> i32 {
        match self {
            Timezone::FixedOffset(offset) => offset.local_minus_utc(),
            Timezone::Tz(tz) => {
                let utc = match ts.to_naive() {
                    Some(n) => n,
                    None if ts.seconds() < 0 => DateTime::<chrono::Utc>::MIN_UTC.naive_utc(),
                    None => DateTime::<chrono::Utc>::MAX_UTC.naive_utc(),
                };
                tz.offset_from_utc_datetime(&utc).fix().local_minus_utc()
            }
        }
    }

    /// The UTC offset for a local wall-clock reading, in seconds east.
    ///
    /// Ambiguous local times (the repeated hour at a backward transition)
    /// resolve to the earlier offset. Local times skipped by a forward
    /// transition borrow the offset that would apply to the same reading
    /// interpreted as UTC.
    pub fn offset_from_local(&self, local: Timestamp) -> i32 {
        match self {
            Timezone::FixedOffset(offset) => offset.local_minus_utc(),
            Timezone::Tz(tz) => {
                let naive = match local.to_naive() {
                    Some(n) => n,
                    None if local.seconds() < 0 => DateTime::<chrono::Utc>::MIN_UTC.naive_utc(),
                    None => DateTime::<chrono::Utc>::MAX_UTC.naive_utc(),
                };
                match tz.offset_from_local_datetime(&naive) {
                    LocalResult::Single(offset) => offset.fix().local_minus_utc(),
                    LocalResult::Ambiguous(earliest, _latest) => {
                        earliest.fix().local_minus_utc()
                    }
                    LocalResult::None => {
                        tz.offset_from_utc_datetime(&naive).fix().local_minus_utc()
                    }
                }
            }
        }
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for Timezone {
    type Err = String;

    /// Parses an IANA zone name (case-insensitively) or a fixed offset of
    /// the form `[+|-]HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(tz) = Tz::from_str_insensitive(s) {
            return Ok(Timezone::Tz(tz));
        }
        if let Some(offset) = parse_fixed_offset(s) {
            return Ok(Timezone::FixedOffset(offset));
        }
        Err(s.to_string())
    }
}

fn parse_fixed_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Timezone::FixedOffset(offset) => write!(f, "{}", offset),
            Timezone::Tz(tz) => write!(f, "{}", tz.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing() {
        assert_eq!("UTC".parse(), Ok(Timezone::Tz(Tz::UTC)));
        assert_eq!(
            "america/los_angeles".parse(),
            Ok(Timezone::Tz(Tz::America__Los_Angeles))
        );
        assert_eq!(
            "+05:30".parse(),
            Ok(Timezone::FixedOffset(
                FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
            ))
        );
        assert_eq!(
            "-08:00".parse(),
            Ok(Timezone::FixedOffset(FixedOffset::west_opt(8 * 3600).unwrap()))
        );
        assert_eq!("pacific".parse::<Timezone>(), Err("pacific".to_string()));
        assert_eq!("+5".parse::<Timezone>(), Err("+5".to_string()));
        assert_eq!("+25:00".parse::<Timezone>(), Err("+25:00".to_string()));
    }

    #[test]
    fn offsets_across_dst() {
        let la: Timezone = "America/Los_Angeles".parse().unwrap();
        // One hour before the 2024 spring-forward transition (2024-03-10
        // 02:00 local), still PST.
        assert_eq!(la.offset_at(Timestamp::from_seconds(1_710_063_000)), -28800);
        // One hour after, PDT.
        assert_eq!(la.offset_at(Timestamp::from_seconds(1_710_070_200)), -25200);
    }

    #[test]
    fn local_gap_and_overlap() {
        let la: Timezone = "America/Los_Angeles".parse().unwrap();
        // 2024-03-10 02:30 local does not exist; the fallback treats the
        // reading as a UTC instant, which lands before the transition.
        let gap = Timestamp::from_naive(
            &chrono::NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(2, 30, 0)
                .unwrap(),
        );
        assert_eq!(la.offset_from_local(gap), -28800);
        // 2024-11-03 01:30 local occurs twice; the earlier reading (PDT)
        // wins.
        let overlap = Timestamp::from_naive(
            &chrono::NaiveDate::from_ymd_opt(2024, 11, 3)
                .unwrap()
                .and_hms_opt(1, 30, 0)
                .unwrap(),
        );
        assert_eq!(la.offset_from_local(overlap), -25200);
    }

    #[test]
    fn fixed_offsets_ignore_instant() {
        let tz: Timezone = "+05:30".parse().unwrap();
        assert_eq!(tz.offset_at(Timestamp::from_seconds(0)), 19800);
        assert_eq!(tz.offset_at(Timestamp::from_seconds(i64::MAX)), 19800);
        assert_eq!(tz.offset_from_local(Timestamp::from_seconds(-1)), 19800);
    }
}
