// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! An absolute-instant abstract data type, and an instant paired with the
//! time zone it was expressed in.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::adt::date::Date;
use crate::timezone::Timezone;

pub const NANOS_PER_SECOND: u32 = 1_000_000_000;
pub const NANOS_PER_MILLI: u32 = 1_000_000;
pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const SECONDS_PER_DAY: i64 = 86_400;
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// An absolute point in time: seconds since the Unix epoch plus a
/// non-negative nanosecond fraction.
///
/// `seconds` may be negative (pre-epoch instants); `nanos` is always reduced
/// to `[0, 1_000_000_000)`, so the represented instant is
/// `seconds + nanos / 1e9` even when `seconds` is negative. An instant one
/// nanosecond before the epoch is `Timestamp::new(-1, 999_999_999)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    /// Constructs a new `Timestamp`, carrying excess nanoseconds into the
    /// seconds component.
    pub fn new(seconds: i64, nanos: u32) -> Timestamp {
        let carry = nanos / NANOS_PER_SECOND;
        Timestamp {
            seconds: seconds.wrapping_add(i64::from(carry)),
            nanos: nanos % NANOS_PER_SECOND,
        }
    }

    pub fn from_seconds(seconds: i64) -> Timestamp {
        Timestamp { seconds, nanos: 0 }
    }

    /// Constructs a `Timestamp` from milliseconds since the epoch, dividing
    /// toward negative infinity so that pre-epoch instants land in the
    /// correct second.
    pub fn from_millis(millis: i64) -> Timestamp {
        let seconds = millis.div_euclid(MILLIS_PER_SECOND);
        let subsec_millis = millis.rem_euclid(MILLIS_PER_SECOND) as u32;
        Timestamp {
            seconds,
            nanos: subsec_millis * NANOS_PER_MILLI,
        }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Returns milliseconds since the epoch, truncating sub-millisecond
    /// digits toward negative infinity.
    ///
    /// Instants outside the millisecond-representable range wrap
    /// deterministically (two's complement); they do not panic.
    pub fn to_millis(&self) -> i64 {
        self.seconds
            .wrapping_mul(MILLIS_PER_SECOND)
            .wrapping_add(i64::from(self.nanos / NANOS_PER_MILLI))
    }

    /// Adds a signed number of milliseconds, wrapping on overflow.
    ///
    /// Day-time interval arithmetic intentionally wraps rather than
    /// saturating or erroring; the wraparound is deterministic and tested.
    pub fn wrapping_add_millis(&self, millis: i64) -> Timestamp {
        Timestamp::from_millis(self.to_millis().wrapping_add(millis))
    }

    /// The calendar day containing this instant, dividing toward negative
    /// infinity: an instant one nanosecond before a day boundary belongs to
    /// the previous day.
    ///
    /// Returns `None` when the day count exceeds the `Date` range.
    pub fn to_date(&self) -> Option<Date> {
        let days = self.seconds.div_euclid(SECONDS_PER_DAY);
        i32::try_from(days).ok().map(Date::new)
    }

    /// The civil (UTC) date and time of this instant, or `None` if the
    /// instant is outside chrono's representable range.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp(self.seconds, self.nanos).map(|dt| dt.naive_utc())
    }

    pub fn from_naive(n: &NaiveDateTime) -> Timestamp {
        let utc = n.and_utc();
        // `timestamp_subsec_nanos` can report leap-second nanos >= 1e9;
        // `new` carries the excess.
        Timestamp::new(utc.timestamp(), utc.timestamp_subsec_nanos())
    }

    /// Shifts this UTC instant to the zone's local clock, evaluating the
    /// zone's offset at this instant.
    pub fn to_timezone(&self, tz: &Timezone) -> Timestamp {
        let offset = tz.offset_at(*self);
        Timestamp::new(self.seconds.wrapping_add(i64::from(offset)), self.nanos)
    }

    /// Interprets this value as the zone's local clock and shifts it back to
    /// UTC, evaluating the offset on the local side of the conversion.
    pub fn to_utc(&self, tz: &Timezone) -> Timestamp {
        let offset = tz.offset_from_local(*self);
        Timestamp::new(self.seconds.wrapping_sub(i64::from(offset)), self.nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_naive() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "{}s+{}ns", self.seconds, self.nanos),
        }
    }
}

/// An instant paired with the time zone it should be interpreted in.
///
/// Unlike a plain [`Timestamp`], which is interpreted in whatever zone the
/// caller supplies, a `TimestampWithTz` remembers its own zone; calendar
/// operations on it ignore the session zone entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampWithTz {
    timestamp: Timestamp,
    tz: Timezone,
}

impl TimestampWithTz {
    pub fn new(timestamp: Timestamp, tz: Timezone) -> TimestampWithTz {
        TimestampWithTz { timestamp, tz }
    }

    /// Reinterprets a local wall-clock reading in `tz` as an absolute
    /// instant.
    pub fn from_local(local: Timestamp, tz: Timezone) -> TimestampWithTz {
        TimestampWithTz {
            timestamp: local.to_utc(&tz),
            tz,
        }
    }

    /// The absolute (UTC) instant.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn timezone(&self) -> Timezone {
        self.tz
    }

    /// The instant shifted into the attached zone's local clock.
    pub fn local(&self) -> Timestamp {
        self.timestamp.to_timezone(&self.tz)
    }

    /// The attached zone's offset from UTC, in seconds, at this instant.
    pub fn offset_seconds(&self) -> i32 {
        self.tz.offset_at(self.timestamp)
    }
}
