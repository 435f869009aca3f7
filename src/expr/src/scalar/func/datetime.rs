// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Truncation, shifting, differencing, and field extraction for dates and
//! timestamps.
//!
//! Each operation comes in up to three shapes, resolved at bind time by the
//! caller: plain [`Timestamp`] (interpreted per the session's
//! [`FuncContext`]), [`Date`], and [`TimestampWithTz`] (which carries its
//! own zone and ignores the session zone). String-unit entry points parse
//! and delegate to an `*_inner` twin taking the pre-parsed unit, so a
//! caller with a constant unit argument can parse once and skip the
//! per-row work.

use std::cmp;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

use rill_repr::adt::date::{days_in_month, Date};
use rill_repr::adt::datetime::{DateTimeFields, DateTimeUnit};
use rill_repr::adt::interval::IntervalDayTime;
use rill_repr::adt::timestamp::{
    Timestamp, TimestampWithTz, MILLIS_PER_DAY, MILLIS_PER_SECOND, NANOS_PER_MILLI,
};
use rill_repr::timezone::Timezone;

use crate::scalar::func::FuncContext;
use crate::scalar::EvalError;

pub fn parse_units(units: &str) -> Result<DateTimeUnit, EvalError> {
    units.parse().map_err(EvalError::UnknownUnits)
}

/// Best-effort variant of [`parse_units`] for constant-folding decisions.
pub fn try_parse_units(units: &str) -> Option<DateTimeUnit> {
    units.parse().ok()
}

/// Parses a unit for use with date values, which have no time of day to
/// operate on.
pub fn parse_date_units(units: &str) -> Result<DateTimeUnit, EvalError> {
    let unit = parse_units(units)?;
    if unit.is_time_unit() {
        return Err(EvalError::InvalidDateField(units.to_string()));
    }
    Ok(unit)
}

pub fn try_parse_date_units(units: &str) -> Option<DateTimeUnit> {
    parse_date_units(units).ok()
}

/// Parses a unit for timestamp truncation, which does not accept
/// `millisecond`. Shifting and differencing accept it; use
/// [`parse_units`] there.
pub fn parse_timestamp_units(units: &str) -> Result<DateTimeUnit, EvalError> {
    let unit = parse_units(units)?;
    if unit == DateTimeUnit::Millisecond {
        return Err(EvalError::InvalidTimestampField(units.to_string()));
    }
    Ok(unit)
}

pub fn parse_timezone(tz: &str) -> Result<Timezone, EvalError> {
    tz.parse().map_err(EvalError::InvalidTimezone)
}

/// Breaks a timestamp down in the given zone's local clock, or in UTC when
/// no zone applies.
pub fn timestamp_fields(
    ts: Timestamp,
    tz: Option<Timezone>,
) -> Result<DateTimeFields, EvalError> {
    let local = match tz {
        Some(tz) => ts.to_timezone(&tz),
        None => ts,
    };
    let naive = local.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
    Ok(DateTimeFields::from_naive(&naive))
}

/// Breaks a plain timestamp down per the session's adjustment policy.
pub fn timestamp_fields_in_context(
    ctx: &FuncContext,
    ts: Timestamp,
) -> Result<DateTimeFields, EvalError> {
    timestamp_fields(ts, ctx.operating_timezone())
}

/// Breaks a zoned timestamp down in its own attached zone.
pub fn zoned_fields(ts: TimestampWithTz) -> Result<DateTimeFields, EvalError> {
    timestamp_fields(ts.timestamp(), Some(ts.timezone()))
}

// Field extraction. These take the broken-down form so the three input
// shapes share one implementation; the caller picks the right breakdown
// helper above.

pub fn extract_year(f: &DateTimeFields) -> i64 {
    f.year.into()
}

pub fn extract_quarter(f: &DateTimeFields) -> i64 {
    ((f.month - 1) / 3 + 1).into()
}

pub fn extract_month(f: &DateTimeFields) -> i64 {
    f.month.into()
}

pub fn extract_day(f: &DateTimeFields) -> i64 {
    f.day.into()
}

pub fn extract_hour(f: &DateTimeFields) -> i64 {
    f.hour.into()
}

pub fn extract_minute(f: &DateTimeFields) -> i64 {
    f.minute.into()
}

pub fn extract_second(f: &DateTimeFields) -> i64 {
    f.second.into()
}

/// The ISO weekday, 1=Monday through 7=Sunday.
pub fn extract_day_of_week(f: &DateTimeFields) -> i64 {
    f.iso_day_of_week().into()
}

/// The day of year, 1-based.
pub fn extract_day_of_year(f: &DateTimeFields) -> i64 {
    (f.day_of_year + 1).into()
}

pub fn extract_week(f: &DateTimeFields) -> i64 {
    f.iso_week().into()
}

pub fn extract_year_of_week(f: &DateTimeFields) -> i64 {
    f.iso_year_of_week().into()
}

/// The millisecond of the second, in `[0, 1000)`.
pub fn extract_millisecond(ts: Timestamp) -> i64 {
    (ts.nanos() / NANOS_PER_MILLI).into()
}

/// The calendar day containing the instant, read in the session's operating
/// zone. Pre-epoch instants floor toward the previous day.
pub fn extract_date(ctx: &FuncContext, ts: Timestamp) -> Result<Date, EvalError> {
    let local = match ctx.operating_timezone() {
        Some(tz) => ts.to_timezone(&tz),
        None => ts,
    };
    local.to_date().ok_or(EvalError::TimestampOutOfRange)
}

/// The calendar day a zoned value falls on in its own zone.
pub fn extract_date_tz(ts: TimestampWithTz) -> Result<Date, EvalError> {
    ts.local().to_date().ok_or(EvalError::TimestampOutOfRange)
}

pub fn last_day_of_month(f: &DateTimeFields) -> Result<Date, EvalError> {
    Date::from_ymd(f.year, f.month, days_in_month(f.year, f.month))
        .map_err(|_| EvalError::TimestampOutOfRange)
}

pub fn to_unixtime(ts: Timestamp) -> f64 {
    ts.seconds() as f64 + f64::from(ts.nanos()) / 1e9
}

pub fn from_unixtime(unixtime: f64) -> Result<Timestamp, EvalError> {
    if !unixtime.is_finite() {
        return Err(EvalError::TimestampOutOfRange);
    }
    let seconds = unixtime.floor();
    // 2^63 is exactly representable; anything at or past it no longer fits.
    if seconds < -9_223_372_036_854_775_808.0 || seconds >= 9_223_372_036_854_775_808.0 {
        return Err(EvalError::TimestampOutOfRange);
    }
    let nanos = ((unixtime - seconds) * 1e9) as u32;
    Ok(Timestamp::new(seconds as i64, nanos))
}

/// The hour component of the zone offset in effect, truncated toward zero.
pub fn timezone_hour(ts: TimestampWithTz) -> i64 {
    i64::from(ts.offset_seconds() / 3600)
}

/// The minute component of the zone offset in effect, in `(-60, 60)`.
pub fn timezone_minute(ts: TimestampWithTz) -> i64 {
    i64::from((ts.offset_seconds() / 60) % 60)
}

// Truncation.

pub fn date_trunc(ctx: &FuncContext, units: &str, ts: Timestamp) -> Result<Timestamp, EvalError> {
    let unit = parse_timestamp_units(units)?;
    date_trunc_inner(ctx, unit, ts)
}

pub fn date_trunc_inner(
    ctx: &FuncContext,
    unit: DateTimeUnit,
    ts: Timestamp,
) -> Result<Timestamp, EvalError> {
    truncate_timestamp(unit, ts, ctx.operating_timezone())
}

pub fn date_trunc_date(units: &str, date: Date) -> Result<Date, EvalError> {
    let unit = parse_date_units(units)?;
    date_trunc_date_inner(unit, date)
}

pub fn date_trunc_date_inner(unit: DateTimeUnit, date: Date) -> Result<Date, EvalError> {
    if unit.is_time_unit() {
        return Err(EvalError::InvalidDateField(unit.to_string()));
    }
    let fields = DateTimeFields::from_date(date).ok_or(EvalError::TimestampOutOfRange)?;
    let fields = truncate_fields(fields, unit);
    let naive = fields.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
    Ok(Date::from_naive(naive.date()))
}

pub fn date_trunc_tz(units: &str, ts: TimestampWithTz) -> Result<TimestampWithTz, EvalError> {
    let unit = parse_timestamp_units(units)?;
    date_trunc_tz_inner(unit, ts)
}

pub fn date_trunc_tz_inner(
    unit: DateTimeUnit,
    ts: TimestampWithTz,
) -> Result<TimestampWithTz, EvalError> {
    let truncated = truncate_timestamp(unit, ts.timestamp(), Some(ts.timezone()))?;
    Ok(TimestampWithTz::new(truncated, ts.timezone()))
}

fn truncate_timestamp(
    unit: DateTimeUnit,
    ts: Timestamp,
    tz: Option<Timezone>,
) -> Result<Timestamp, EvalError> {
    if unit == DateTimeUnit::Millisecond {
        return Err(EvalError::InvalidTimestampField(unit.to_string()));
    }
    if unit == DateTimeUnit::Second {
        // Zone offsets are whole seconds, so zeroing the fraction needs no
        // breakdown.
        return Ok(Timestamp::new(ts.seconds(), 0));
    }
    let local = match tz {
        Some(tz) => ts.to_timezone(&tz),
        None => ts,
    };
    let naive = local.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
    let fields = truncate_fields(DateTimeFields::from_naive(&naive), unit);
    let truncated = fields.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
    let result = Timestamp::from_naive(&truncated);
    Ok(match tz {
        Some(tz) => result.to_utc(&tz),
        None => result,
    })
}

/// Zeroes every component finer than `unit`, cascading.
///
/// The `day_of_week` and `day_of_year` bookkeeping is stale afterward;
/// callers rebuild from the (year, month, day) triple.
fn truncate_fields(mut f: DateTimeFields, unit: DateTimeUnit) -> DateTimeFields {
    use DateTimeUnit::*;
    if unit == Year {
        f.month = 1;
    }
    if unit == Quarter {
        f.month = (f.month - 1) / 3 * 3 + 1;
    }
    if unit == Week {
        // Roll back to the most recent Monday, crossing into the previous
        // month (or year) when the Monday falls there.
        let days_back = f.iso_day_of_week() - 1;
        if f.day > days_back {
            f.day -= days_back;
        } else {
            if f.month == 1 {
                f.month = 12;
                f.year -= 1;
            } else {
                f.month -= 1;
            }
            f.day = days_in_month(f.year, f.month) - (days_back - f.day);
        }
    }
    if matches!(unit, Year | Quarter | Month) {
        f.day = 1;
    }
    if matches!(unit, Year | Quarter | Month | Week | Day) {
        f.hour = 0;
    }
    if matches!(unit, Year | Quarter | Month | Week | Day | Hour) {
        f.minute = 0;
    }
    if !matches!(unit, Millisecond | Second) {
        f.second = 0;
    }
    f
}

// Shifting.

fn cast_count(count: i64) -> Result<i32, EvalError> {
    i32::try_from(count).map_err(|_| EvalError::IntegerOutOfRange)
}

pub fn date_add(
    ctx: &FuncContext,
    units: &str,
    count: i64,
    ts: Timestamp,
) -> Result<Timestamp, EvalError> {
    let unit = parse_units(units)?;
    date_add_inner(ctx, unit, count, ts)
}

/// Adds `count` units to a plain timestamp.
///
/// Time units shift the absolute instant, preserving the zone offset in
/// effect. Date units shift the session zone's wall clock and re-resolve
/// the offset afterward, so adding a day across a DST transition lands on
/// the same local time, 23 or 25 physical hours later.
pub fn date_add_inner(
    ctx: &FuncContext,
    unit: DateTimeUnit,
    count: i64,
    ts: Timestamp,
) -> Result<Timestamp, EvalError> {
    let count = cast_count(count)?;
    if unit.is_time_unit() {
        return add_to_timestamp(ts, unit, count);
    }
    match ctx.operating_timezone() {
        None => add_to_timestamp(ts, unit, count),
        Some(tz) => Ok(add_to_timestamp(ts.to_timezone(&tz), unit, count)?.to_utc(&tz)),
    }
}

pub fn date_add_date(units: &str, count: i64, date: Date) -> Result<Date, EvalError> {
    let unit = parse_date_units(units)?;
    date_add_date_inner(unit, count, date)
}

pub fn date_add_date_inner(unit: DateTimeUnit, count: i64, date: Date) -> Result<Date, EvalError> {
    if unit.is_time_unit() {
        return Err(EvalError::InvalidDateField(unit.to_string()));
    }
    let count = cast_count(count)?;
    let naive = date.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
    let shifted = add_to_naive_date(naive, unit, count)?;
    Ok(Date::from_naive(shifted))
}

pub fn date_add_tz(
    units: &str,
    count: i64,
    ts: TimestampWithTz,
) -> Result<TimestampWithTz, EvalError> {
    let unit = parse_units(units)?;
    date_add_tz_inner(unit, count, ts)
}

/// Like [`date_add_inner`], but in the value's own attached zone.
pub fn date_add_tz_inner(
    unit: DateTimeUnit,
    count: i64,
    ts: TimestampWithTz,
) -> Result<TimestampWithTz, EvalError> {
    let count = cast_count(count)?;
    let tz = ts.timezone();
    let shifted = if unit.is_time_unit() {
        add_to_timestamp(ts.timestamp(), unit, count)?
    } else {
        add_to_timestamp(ts.local(), unit, count)?.to_utc(&tz)
    };
    Ok(TimestampWithTz::new(shifted, tz))
}

fn add_to_timestamp(ts: Timestamp, unit: DateTimeUnit, count: i32) -> Result<Timestamp, EvalError> {
    use DateTimeUnit::*;
    match unit {
        Millisecond => Ok(ts.wrapping_add_millis(count.into())),
        Second => Ok(Timestamp::new(
            ts.seconds().wrapping_add(count.into()),
            ts.nanos(),
        )),
        Minute => Ok(Timestamp::new(
            ts.seconds().wrapping_add(i64::from(count) * 60),
            ts.nanos(),
        )),
        Hour => Ok(Timestamp::new(
            ts.seconds().wrapping_add(i64::from(count) * 3600),
            ts.nanos(),
        )),
        Day | Week | Month | Quarter | Year => {
            let naive = ts.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
            let date = add_to_naive_date(naive.date(), unit, count)?;
            Ok(Timestamp::from_naive(&date.and_time(naive.time())))
        }
    }
}

/// Calendar date shift. Month-granularity additions clamp the day of month
/// to the target month's length, so Jan 31 plus one month is the last day
/// of February.
fn add_to_naive_date(
    date: NaiveDate,
    unit: DateTimeUnit,
    count: i32,
) -> Result<NaiveDate, EvalError> {
    use DateTimeUnit::*;
    let shifted = match unit {
        Day => date.checked_add_signed(Duration::days(count.into())),
        Week => date.checked_add_signed(Duration::days(i64::from(count) * 7)),
        Month | Quarter | Year => {
            let per_unit = match unit {
                Month => 1,
                Quarter => 3,
                Year => 12,
                _ => unreachable!(),
            };
            let months = i64::from(count) * per_unit;
            if months >= 0 {
                u32::try_from(months)
                    .ok()
                    .and_then(|m| date.checked_add_months(Months::new(m)))
            } else {
                u32::try_from(-months)
                    .ok()
                    .and_then(|m| date.checked_sub_months(Months::new(m)))
            }
        }
        Millisecond | Second | Minute | Hour => {
            unreachable!("time unit {unit} applied to a calendar date")
        }
    };
    shifted.ok_or(EvalError::TimestampOutOfRange)
}

// Differencing.

pub fn date_diff(
    ctx: &FuncContext,
    units: &str,
    from: Timestamp,
    to: Timestamp,
) -> Result<i64, EvalError> {
    let unit = parse_units(units)?;
    date_diff_inner(ctx, unit, from, to)
}

/// The signed count of `unit` boundaries-worth of elapsed span from `from`
/// to `to`, truncated toward zero.
///
/// With a session zone, time units align both operands by the offset in
/// effect at `from` so the span is measured against one consistent clock;
/// date units read each operand on the zone's own wall clock, honoring any
/// offset change between them.
pub fn date_diff_inner(
    ctx: &FuncContext,
    unit: DateTimeUnit,
    from: Timestamp,
    to: Timestamp,
) -> Result<i64, EvalError> {
    match ctx.operating_timezone() {
        None => diff_timestamp(unit, from, to),
        Some(tz) => {
            let from_local = from.to_timezone(&tz);
            let to_local = if unit.is_time_unit() {
                let offset = i64::from(tz.offset_at(from));
                Timestamp::new(to.seconds().wrapping_add(offset), to.nanos())
            } else {
                to.to_timezone(&tz)
            };
            diff_timestamp(unit, from_local, to_local)
        }
    }
}

pub fn date_diff_date(units: &str, from: Date, to: Date) -> Result<i64, EvalError> {
    let unit = parse_date_units(units)?;
    date_diff_date_inner(unit, from, to)
}

pub fn date_diff_date_inner(unit: DateTimeUnit, from: Date, to: Date) -> Result<i64, EvalError> {
    use DateTimeUnit::*;
    let days = i64::from(to.days()) - i64::from(from.days());
    match unit {
        Day => Ok(days),
        Week => Ok(days / 7),
        Month | Quarter | Year => {
            let from = from
                .to_naive()
                .ok_or(EvalError::TimestampOutOfRange)?
                .and_time(NaiveTime::MIN);
            let to = to
                .to_naive()
                .ok_or(EvalError::TimestampOutOfRange)?
                .and_time(NaiveTime::MIN);
            let months = diff_months(&from, &to);
            Ok(match unit {
                Month => months,
                Quarter => months / 3,
                Year => months / 12,
                _ => unreachable!(),
            })
        }
        Millisecond | Second | Minute | Hour => Err(EvalError::InvalidDateField(unit.to_string())),
    }
}

pub fn date_diff_tz(
    units: &str,
    from: TimestampWithTz,
    to: TimestampWithTz,
) -> Result<i64, EvalError> {
    let unit = parse_units(units)?;
    date_diff_tz_inner(unit, from, to)
}

/// Like [`date_diff_inner`], but each operand is read on its own attached
/// zone's wall clock, for every unit; the session zone plays no part. The
/// same instant carried in two zones therefore differs by the offset
/// delta even for time units.
pub fn date_diff_tz_inner(
    unit: DateTimeUnit,
    from: TimestampWithTz,
    to: TimestampWithTz,
) -> Result<i64, EvalError> {
    diff_timestamp(unit, from.local(), to.local())
}

fn diff_timestamp(unit: DateTimeUnit, from: Timestamp, to: Timestamp) -> Result<i64, EvalError> {
    use DateTimeUnit::*;
    let millis = || to.to_millis().wrapping_sub(from.to_millis());
    match unit {
        Millisecond => Ok(millis()),
        Second => Ok(millis() / MILLIS_PER_SECOND),
        Minute => Ok(millis() / 60_000),
        Hour => Ok(millis() / 3_600_000),
        Day => Ok(millis() / MILLIS_PER_DAY),
        Week => Ok(millis() / (7 * MILLIS_PER_DAY)),
        Month | Quarter | Year => {
            let from = from.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
            let to = to.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
            let months = diff_months(&from, &to);
            Ok(match unit {
                Month => months,
                Quarter => months / 3,
                Year => months / 12,
                _ => unreachable!(),
            })
        }
    }
}

/// Whole calendar months from `from` to `to`, truncated toward zero and
/// sign-symmetric.
///
/// The comparison day on the `from` side is clamped to the target month's
/// length, so Jan 31 to the last day of February counts as a full month.
fn diff_months(from: &NaiveDateTime, to: &NaiveDateTime) -> i64 {
    if from > to {
        return -diff_months(to, from);
    }
    let mut months = (i64::from(to.year()) - i64::from(from.year())) * 12
        + (i64::from(to.month()) - i64::from(from.month()));
    let from_day = cmp::min(from.day(), days_in_month(to.year(), to.month()));
    if (to.day(), to.time()) < (from_day, from.time()) {
        months -= 1;
    }
    months
}

// Day-time interval arithmetic.

/// Interval addition wraps on overflow rather than erroring; see
/// [`Timestamp::wrapping_add_millis`].
pub fn timestamp_add_interval(ts: Timestamp, interval: IntervalDayTime) -> Timestamp {
    ts.wrapping_add_millis(interval.millis())
}

pub fn timestamp_sub_interval(ts: Timestamp, interval: IntervalDayTime) -> Timestamp {
    ts.wrapping_add_millis(interval.millis().wrapping_neg())
}

pub fn date_add_interval(date: Date, interval: IntervalDayTime) -> Result<Date, EvalError> {
    if !interval.is_whole_days() {
        return Err(EvalError::NonWholeDayInterval);
    }
    let days = i32::try_from(interval.days()).map_err(|_| EvalError::TimestampOutOfRange)?;
    date.checked_add_days(days)
        .ok_or(EvalError::TimestampOutOfRange)
}

pub fn date_sub_interval(date: Date, interval: IntervalDayTime) -> Result<Date, EvalError> {
    let negated = interval
        .checked_neg()
        .ok_or(EvalError::TimestampOutOfRange)?;
    date_add_interval(date, negated)
}

/// The exact millisecond span from `rhs` to `lhs`; negative when `lhs`
/// precedes `rhs`.
pub fn timestamp_sub_timestamp(lhs: Timestamp, rhs: Timestamp) -> IntervalDayTime {
    IntervalDayTime(lhs.to_millis().wrapping_sub(rhs.to_millis()))
}
