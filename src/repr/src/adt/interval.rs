// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The day-time interval type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adt::timestamp::MILLIS_PER_DAY;

/// A signed span of physical time, stored as whole milliseconds.
///
/// Day-time intervals carry no calendar component: a day here is always
/// exactly 86,400,000 milliseconds, regardless of timezone transitions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub struct IntervalDayTime(pub i64);

impl IntervalDayTime {
    pub fn from_millis(millis: i64) -> IntervalDayTime {
        IntervalDayTime(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    /// Whether this interval is an exact multiple of a day. Date arithmetic
    /// only accepts such intervals.
    pub fn is_whole_days(&self) -> bool {
        self.0 % MILLIS_PER_DAY == 0
    }

    /// The number of whole days, truncated toward zero.
    pub fn days(&self) -> i64 {
        self.0 / MILLIS_PER_DAY
    }

    pub fn checked_neg(&self) -> Option<IntervalDayTime> {
        self.0.checked_neg().map(IntervalDayTime)
    }
}

impl fmt::Display for IntervalDayTime {
    /// Renders as `D HH:MM:SS.mmm` with the sign factored out front.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        // i64::MIN has no positive counterpart; widen before taking abs.
        let mut rest = i128::from(self.0).unsigned_abs();
        let days = rest / MILLIS_PER_DAY as u128;
        rest %= MILLIS_PER_DAY as u128;
        let hours = rest / 3_600_000;
        rest %= 3_600_000;
        let minutes = rest / 60_000;
        rest %= 60_000;
        let seconds = rest / 1_000;
        let millis = rest % 1_000;
        write!(
            f,
            "{} {:02}:{:02}:{:02}.{:03}",
            days, hours, minutes, seconds, millis
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_days() {
        assert!(IntervalDayTime(0).is_whole_days());
        assert!(IntervalDayTime(MILLIS_PER_DAY).is_whole_days());
        assert!(IntervalDayTime(-3 * MILLIS_PER_DAY).is_whole_days());
        assert!(!IntervalDayTime(MILLIS_PER_DAY + 1).is_whole_days());
        assert!(!IntervalDayTime(-1).is_whole_days());
    }

    #[test]
    fn days_truncate_toward_zero() {
        assert_eq!(IntervalDayTime(MILLIS_PER_DAY - 1).days(), 0);
        assert_eq!(IntervalDayTime(-(MILLIS_PER_DAY - 1)).days(), 0);
        assert_eq!(IntervalDayTime(2 * MILLIS_PER_DAY + 5).days(), 2);
        assert_eq!(IntervalDayTime(-2 * MILLIS_PER_DAY - 5).days(), -2);
    }

    #[test]
    fn display() {
        assert_eq!(IntervalDayTime(0).to_string(), "0 00:00:00.000");
        assert_eq!(
            IntervalDayTime(MILLIS_PER_DAY + 3_723_004).to_string(),
            "1 01:02:03.004"
        );
        assert_eq!(IntervalDayTime(-1_500).to_string(), "-0 00:00:01.500");
        assert_eq!(
            IntervalDayTime(i64::MIN).to_string(),
            "-106751991167 07:12:55.808"
        );
    }
}
