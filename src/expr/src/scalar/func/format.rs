// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Pattern-based datetime formatting and parsing.
//!
//! Two dialects compile to the same item list: the MySQL `%`-token set
//! (`date_format`/`date_parse`) and the Joda letter-repetition set
//! (`format_datetime`/`parse_datetime`). A compiled [`DateTimeFormatter`]
//! is immutable and cheap to share; callers with a constant pattern compile
//! once and reuse it across rows, everyone else pays for a recompile per
//! row.

use chrono::{FixedOffset, NaiveDate, NaiveTime, Weekday};

use rill_repr::adt::datetime::DateTimeFields;
use rill_repr::adt::timestamp::{Timestamp, TimestampWithTz};
use rill_repr::timezone::Timezone;

use crate::scalar::func::FuncContext;
use crate::scalar::EvalError;

pub mod joda;
pub mod mysql;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// Indexed by ISO weekday minus one.
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A numeric pattern field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    /// Signed calendar year.
    Year,
    /// Year modulo 100; parses with a 1970-pivoted century.
    TwoDigitYear,
    /// ISO week-numbering year.
    WeekYear,
    Month,
    Day,
    /// 1-based day of year.
    DayOfYear,
    /// ISO week of year.
    WeekOfYear,
    Hour24,
    /// Clock hour, 1 through 12.
    Hour12,
    Minute,
    Second,
    /// 0=Sunday through 6=Saturday.
    DayOfWeekSunday0,
    /// 1=Monday through 7=Sunday.
    IsoDayOfWeek,
}

impl NumericField {
    fn max_digits(&self) -> usize {
        match self {
            NumericField::Year | NumericField::WeekYear => 6,
            NumericField::TwoDigitYear => 2,
            NumericField::DayOfYear => 3,
            _ => 2,
        }
    }
}

/// One compiled element of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatItem {
    Literal(String),
    Numeric { field: NumericField, width: usize },
    MonthName { abbreviated: bool },
    WeekdayName { abbreviated: bool },
    /// AM/PM marker.
    Halfday,
    /// Fractional seconds, printed to the given number of digits.
    Fraction(usize),
    /// Zone offset as `+HH:MM`; parses `+HH:MM`, `+HHMM`, or `Z`.
    TimezoneOffset,
    /// Zone display name. Format-only.
    TimezoneName,
    /// AD/BC marker.
    Era,
}

impl FormatItem {
    /// Whether parsing this item consumes a digit run, which forces the
    /// preceding numeric field to its exact width.
    fn consumes_digits(&self) -> bool {
        matches!(self, FormatItem::Numeric { .. } | FormatItem::Fraction(_))
    }
}

/// A local wall-clock reading recovered from text, plus the explicit zone
/// offset if the pattern carried one and the input supplied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDateTime {
    pub timestamp: Timestamp,
    pub offset_seconds: Option<i32>,
}

/// A compiled pattern. Immutable once built; shareable across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeFormatter {
    pattern: String,
    items: Vec<FormatItem>,
}

impl DateTimeFormatter {
    pub fn compile_mysql(pattern: &str) -> Result<DateTimeFormatter, EvalError> {
        Ok(DateTimeFormatter {
            pattern: pattern.to_string(),
            items: mysql::compile(pattern)?,
        })
    }

    pub fn compile_joda(pattern: &str) -> Result<DateTimeFormatter, EvalError> {
        Ok(DateTimeFormatter {
            pattern: pattern.to_string(),
            items: joda::compile(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Worst-case output byte length when formatting into `tz`, for output
    /// buffer pre-sizing.
    pub fn max_result_size(&self, tz: Option<&Timezone>) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                FormatItem::Literal(l) => l.len(),
                // One extra byte for a possible sign.
                FormatItem::Numeric { field, width } => field.max_digits().max(*width) + 1,
                FormatItem::MonthName { abbreviated } | FormatItem::WeekdayName { abbreviated } => {
                    if *abbreviated {
                        3
                    } else {
                        9
                    }
                }
                FormatItem::Halfday | FormatItem::Era => 2,
                FormatItem::Fraction(width) => *width,
                FormatItem::TimezoneOffset => 6,
                FormatItem::TimezoneName => tz.map_or(3, |t| t.to_string().len()),
            })
            .sum()
    }

    /// Formats `ts` in the given zone's local clock, or in UTC when none.
    pub fn format(&self, ts: Timestamp, tz: Option<Timezone>) -> Result<String, EvalError> {
        let offset = tz.as_ref().map_or(0, |t| t.offset_at(ts));
        let local = match tz {
            Some(ref t) => ts.to_timezone(t),
            None => ts,
        };
        let naive = local.to_naive().ok_or(EvalError::TimestampOutOfRange)?;
        let fields = DateTimeFields::from_naive(&naive);
        let mut out = String::with_capacity(self.max_result_size(tz.as_ref()));
        for item in &self.items {
            format_item(item, &fields, local.nanos(), offset, tz.as_ref(), &mut out);
        }
        Ok(out)
    }

    /// Parses `input` back into a local wall-clock reading. The whole input
    /// must be consumed.
    pub fn parse(&self, input: &str) -> Result<ParsedDateTime, EvalError> {
        if self.items.contains(&FormatItem::TimezoneName) {
            return Err(EvalError::UnsupportedDateTimeFormat("z".to_string()));
        }
        let err = || EvalError::ParseDateTime {
            input: input.to_string(),
            pattern: self.pattern.clone(),
        };
        let mut fields = ParsedFields::default();
        let mut rest = input;
        for (i, item) in self.items.iter().enumerate() {
            let exact = self
                .items
                .get(i + 1)
                .is_some_and(FormatItem::consumes_digits);
            rest = parse_item(item, exact, rest, &mut fields).ok_or_else(err)?;
        }
        if !rest.is_empty() {
            return Err(err());
        }
        fields.resolve().ok_or_else(err)
    }
}

fn format_item(
    item: &FormatItem,
    f: &DateTimeFields,
    nanos: u32,
    offset: i32,
    tz: Option<&Timezone>,
    out: &mut String,
) {
    match item {
        FormatItem::Literal(l) => out.push_str(l),
        FormatItem::Numeric { field, width } => {
            let value = numeric_value(*field, f);
            out.push_str(&format!("{:0width$}", value, width = *width));
        }
        FormatItem::MonthName { abbreviated } => {
            let name = MONTHS[(f.month - 1) as usize];
            out.push_str(if *abbreviated { &name[..3] } else { name });
        }
        FormatItem::WeekdayName { abbreviated } => {
            let name = WEEKDAYS[(f.iso_day_of_week() - 1) as usize];
            out.push_str(if *abbreviated { &name[..3] } else { name });
        }
        FormatItem::Halfday => out.push_str(if f.hour < 12 { "AM" } else { "PM" }),
        FormatItem::Fraction(width) => {
            let digits = format!("{:09}", nanos);
            if *width <= digits.len() {
                out.push_str(&digits[..*width]);
            } else {
                out.push_str(&digits);
                for _ in digits.len()..*width {
                    out.push('0');
                }
            }
        }
        FormatItem::TimezoneOffset => {
            let sign = if offset < 0 { '-' } else { '+' };
            let abs = offset.unsigned_abs();
            out.push_str(&format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60));
        }
        FormatItem::TimezoneName => match tz {
            Some(tz) => out.push_str(&tz.to_string()),
            None => out.push_str("UTC"),
        },
        FormatItem::Era => out.push_str(if f.year > 0 { "AD" } else { "BC" }),
    }
}

fn numeric_value(field: NumericField, f: &DateTimeFields) -> i64 {
    match field {
        NumericField::Year => f.year.into(),
        NumericField::TwoDigitYear => f.year.rem_euclid(100).into(),
        NumericField::WeekYear => f.iso_year_of_week().into(),
        NumericField::Month => f.month.into(),
        NumericField::Day => f.day.into(),
        NumericField::DayOfYear => (f.day_of_year + 1).into(),
        NumericField::WeekOfYear => f.iso_week().into(),
        NumericField::Hour24 => f.hour.into(),
        NumericField::Hour12 => {
            let h = f.hour % 12;
            if h == 0 { 12 } else { h.into() }
        }
        NumericField::Minute => f.minute.into(),
        NumericField::Second => f.second.into(),
        NumericField::DayOfWeekSunday0 => f.day_of_week.into(),
        NumericField::IsoDayOfWeek => f.iso_day_of_week().into(),
    }
}

#[derive(Debug, Default)]
struct ParsedFields {
    year: Option<i64>,
    two_digit_year: Option<i64>,
    week_year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    day_of_year: Option<i64>,
    week: Option<i64>,
    day_of_week: Option<i64>,
    hour24: Option<i64>,
    hour12: Option<i64>,
    pm: Option<bool>,
    minute: Option<i64>,
    second: Option<i64>,
    nanos: u32,
    bc: bool,
    offset_seconds: Option<i32>,
}

impl ParsedFields {
    fn resolve(self) -> Option<ParsedDateTime> {
        let year = match (self.year, self.two_digit_year) {
            (Some(y), _) => y,
            // MySQL century pivot: 00-69 map to 2000s, 70-99 to 1900s.
            (None, Some(y2)) if y2 < 70 => 2000 + y2,
            (None, Some(y2)) => 1900 + y2,
            (None, None) => 1970,
        };
        let year = i32::try_from(if self.bc { 1 - year } else { year }).ok()?;

        let date = if let Some(w) = self.week {
            // Without a week-year in the pattern, the calendar year (or its
            // default) numbers the weeks.
            let week_year = match self.week_year {
                Some(wy) => i32::try_from(wy).ok()?,
                None => year,
            };
            let weekday = match self.day_of_week.unwrap_or(1) {
                1 => Weekday::Mon,
                2 => Weekday::Tue,
                3 => Weekday::Wed,
                4 => Weekday::Thu,
                5 => Weekday::Fri,
                6 => Weekday::Sat,
                7 => Weekday::Sun,
                _ => return None,
            };
            NaiveDate::from_isoywd_opt(week_year, u32::try_from(w).ok()?, weekday)?
        } else if let Some(doy) = self.day_of_year {
            NaiveDate::from_yo_opt(year, u32::try_from(doy).ok()?)?
        } else {
            NaiveDate::from_ymd_opt(
                year,
                u32::try_from(self.month.unwrap_or(1)).ok()?,
                u32::try_from(self.day.unwrap_or(1)).ok()?,
            )?
        };

        let hour = match (self.hour24, self.hour12) {
            (Some(h), _) => h,
            (None, Some(h)) => {
                if !(1..=12).contains(&h) {
                    return None;
                }
                h % 12 + if self.pm == Some(true) { 12 } else { 0 }
            }
            (None, None) => 0,
        };
        let time = NaiveTime::from_hms_nano_opt(
            u32::try_from(hour).ok()?,
            u32::try_from(self.minute.unwrap_or(0)).ok()?,
            u32::try_from(self.second.unwrap_or(0)).ok()?,
            self.nanos,
        )?;

        Some(ParsedDateTime {
            timestamp: Timestamp::from_naive(&date.and_time(time)),
            offset_seconds: self.offset_seconds,
        })
    }
}

fn parse_item<'a>(
    item: &FormatItem,
    exact: bool,
    s: &'a str,
    p: &mut ParsedFields,
) -> Option<&'a str> {
    match item {
        FormatItem::Literal(l) => s.strip_prefix(l.as_str()),
        FormatItem::Numeric { field, width } => {
            let max = if exact {
                *width
            } else {
                field.max_digits().max(*width)
            };
            let signed = matches!(field, NumericField::Year | NumericField::WeekYear);
            let (value, rest) = scan_int(s, max, exact, signed)?;
            let slot = match field {
                NumericField::Year => &mut p.year,
                NumericField::TwoDigitYear => &mut p.two_digit_year,
                NumericField::WeekYear => &mut p.week_year,
                NumericField::Month => &mut p.month,
                NumericField::Day => &mut p.day,
                NumericField::DayOfYear => &mut p.day_of_year,
                NumericField::WeekOfYear => &mut p.week,
                NumericField::Hour24 => &mut p.hour24,
                NumericField::Hour12 => &mut p.hour12,
                NumericField::Minute => &mut p.minute,
                NumericField::Second => &mut p.second,
                NumericField::DayOfWeekSunday0 => {
                    p.day_of_week = Some(if value == 0 { 7 } else { value });
                    return Some(rest);
                }
                NumericField::IsoDayOfWeek => &mut p.day_of_week,
            };
            *slot = Some(value);
            Some(rest)
        }
        FormatItem::MonthName { abbreviated } => {
            for (i, name) in MONTHS.iter().enumerate() {
                let candidate = if *abbreviated { &name[..3] } else { *name };
                if let Some(rest) = strip_prefix_ci(s, candidate) {
                    p.month = Some(i as i64 + 1);
                    return Some(rest);
                }
            }
            None
        }
        FormatItem::WeekdayName { abbreviated } => {
            for (i, name) in WEEKDAYS.iter().enumerate() {
                let candidate = if *abbreviated { &name[..3] } else { *name };
                if let Some(rest) = strip_prefix_ci(s, candidate) {
                    p.day_of_week = Some(i as i64 + 1);
                    return Some(rest);
                }
            }
            None
        }
        FormatItem::Halfday => {
            if let Some(rest) = strip_prefix_ci(s, "AM") {
                p.pm = Some(false);
                Some(rest)
            } else if let Some(rest) = strip_prefix_ci(s, "PM") {
                p.pm = Some(true);
                Some(rest)
            } else {
                None
            }
        }
        FormatItem::Fraction(width) => {
            let n = s
                .bytes()
                .take(*width)
                .take_while(|b| b.is_ascii_digit())
                .count();
            if n == 0 {
                return None;
            }
            let (digits, rest) = s.split_at(n);
            let value: u32 = digits.parse().ok()?;
            p.nanos = value * 10u32.pow(9 - n as u32);
            Some(rest)
        }
        FormatItem::TimezoneOffset => {
            if let Some(rest) = s.strip_prefix('Z').or_else(|| s.strip_prefix('z')) {
                p.offset_seconds = Some(0);
                return Some(rest);
            }
            let (sign, rest) = match s.as_bytes().first()? {
                b'+' => (1, &s[1..]),
                b'-' => (-1, &s[1..]),
                _ => return None,
            };
            let (hours, rest) = scan_int(rest, 2, true, false)?;
            let rest = rest.strip_prefix(':').unwrap_or(rest);
            let (minutes, rest) = scan_int(rest, 2, true, false)?;
            if hours > 23 || minutes > 59 {
                return None;
            }
            p.offset_seconds = Some(sign * (hours as i32 * 3600 + minutes as i32 * 60));
            Some(rest)
        }
        // Rejected up front in `parse`.
        FormatItem::TimezoneName => None,
        FormatItem::Era => {
            if let Some(rest) = strip_prefix_ci(s, "AD") {
                p.bc = false;
                Some(rest)
            } else if let Some(rest) = strip_prefix_ci(s, "BC") {
                p.bc = true;
                Some(rest)
            } else {
                None
            }
        }
    }
}

fn scan_int(s: &str, max: usize, exact: bool, signed: bool) -> Option<(i64, &str)> {
    if signed {
        if let Some(rest) = s.strip_prefix('-') {
            let (v, rest) = scan_int(rest, max, exact, false)?;
            return Some((-v, rest));
        }
        if let Some(rest) = s.strip_prefix('+') {
            return scan_int(rest, max, exact, false);
        }
    }
    let n = s
        .bytes()
        .take(max)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if n == 0 || (exact && n != max) {
        return None;
    }
    let (digits, rest) = s.split_at(n);
    Some((digits.parse().ok()?, rest))
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

// MySQL-dialect entry points.

pub fn date_format(ctx: &FuncContext, pattern: &str, ts: Timestamp) -> Result<String, EvalError> {
    tracing::debug!(pattern, "recompiling mysql datetime format");
    let formatter = DateTimeFormatter::compile_mysql(pattern)?;
    date_format_inner(ctx, &formatter, ts)
}

pub fn date_format_inner(
    ctx: &FuncContext,
    formatter: &DateTimeFormatter,
    ts: Timestamp,
) -> Result<String, EvalError> {
    formatter.format(ts, ctx.operating_timezone())
}

pub fn date_parse(ctx: &FuncContext, pattern: &str, input: &str) -> Result<Timestamp, EvalError> {
    tracing::debug!(pattern, "recompiling mysql datetime format");
    let formatter = DateTimeFormatter::compile_mysql(pattern)?;
    date_parse_inner(ctx, &formatter, input)
}

/// Parses per the MySQL dialect, which has no zone-offset token, so the
/// wall-clock result always resolves against the session zone (UTC when the
/// session has none).
pub fn date_parse_inner(
    ctx: &FuncContext,
    formatter: &DateTimeFormatter,
    input: &str,
) -> Result<Timestamp, EvalError> {
    let parsed = formatter.parse(input)?;
    Ok(resolve_to_utc(parsed, ctx.session_timezone))
}

// Joda-dialect entry points.

pub fn format_datetime(ctx: &FuncContext, pattern: &str, ts: Timestamp) -> Result<String, EvalError> {
    tracing::debug!(pattern, "recompiling joda datetime format");
    let formatter = DateTimeFormatter::compile_joda(pattern)?;
    format_datetime_inner(ctx, &formatter, ts)
}

pub fn format_datetime_inner(
    ctx: &FuncContext,
    formatter: &DateTimeFormatter,
    ts: Timestamp,
) -> Result<String, EvalError> {
    formatter.format(ts, ctx.operating_timezone())
}

pub fn format_datetime_tz(
    pattern: &str,
    ts: TimestampWithTz,
) -> Result<String, EvalError> {
    let formatter = DateTimeFormatter::compile_joda(pattern)?;
    formatter.format(ts.timestamp(), Some(ts.timezone()))
}

pub fn parse_datetime(
    ctx: &FuncContext,
    pattern: &str,
    input: &str,
) -> Result<TimestampWithTz, EvalError> {
    tracing::debug!(pattern, "recompiling joda datetime format");
    let formatter = DateTimeFormatter::compile_joda(pattern)?;
    parse_datetime_inner(ctx, &formatter, input)
}

/// Parses per the Joda dialect. An explicit offset in the input pins the
/// result to that fixed-offset zone; otherwise the session zone (or UTC)
/// applies.
pub fn parse_datetime_inner(
    ctx: &FuncContext,
    formatter: &DateTimeFormatter,
    input: &str,
) -> Result<TimestampWithTz, EvalError> {
    let parsed = formatter.parse(input)?;
    match parsed.offset_seconds {
        Some(offset) => {
            let fixed = FixedOffset::east_opt(offset)
                .ok_or_else(|| EvalError::InvalidTimezone(format!("{offset}")))?;
            let utc = Timestamp::new(
                parsed.timestamp.seconds().wrapping_sub(offset.into()),
                parsed.timestamp.nanos(),
            );
            Ok(TimestampWithTz::new(utc, Timezone::FixedOffset(fixed)))
        }
        None => {
            let tz = ctx.session_timezone.unwrap_or_default();
            Ok(TimestampWithTz::from_local(parsed.timestamp, tz))
        }
    }
}

fn resolve_to_utc(parsed: ParsedDateTime, fallback: Option<Timezone>) -> Timestamp {
    match parsed.offset_seconds {
        Some(offset) => Timestamp::new(
            parsed.timestamp.seconds().wrapping_sub(offset.into()),
            parsed.timestamp.nanos(),
        ),
        None => match fallback {
            Some(tz) => parsed.timestamp.to_utc(&tz),
            None => parsed.timestamp,
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::scalar::func::datetime::parse_timezone;

    fn ts(s: &str) -> Timestamp {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        Timestamp::from_naive(&naive)
    }

    #[test]
    fn mysql_format_basics() {
        let ctx = FuncContext::utc();
        let t = ts("2024-02-29 13:05:09");
        assert_eq!(
            date_format(&ctx, "%Y-%m-%d %H:%i:%S", t),
            Ok("2024-02-29 13:05:09".to_string())
        );
        assert_eq!(
            date_format(&ctx, "%W, %M %e, %Y", t),
            Ok("Thursday, February 29, 2024".to_string())
        );
        assert_eq!(
            date_format(&ctx, "%a %b %c %k %l %p", t),
            Ok("Thu Feb 2 13 1 PM".to_string())
        );
        assert_eq!(date_format(&ctx, "%r", t), Ok("01:05:09 PM".to_string()));
        assert_eq!(date_format(&ctx, "%T", t), Ok("13:05:09".to_string()));
        assert_eq!(date_format(&ctx, "%j %v %w", t), Ok("060 09 4".to_string()));
        assert_eq!(date_format(&ctx, "100%%", t), Ok("100%".to_string()));
        assert_eq!(
            date_format(&ctx, "%f", Timestamp::new(0, 123_456_789)),
            Ok("123456".to_string())
        );
    }

    #[test]
    fn mysql_format_rejects_unsupported_tokens() {
        let ctx = FuncContext::utc();
        let t = ts("2024-02-29 13:05:09");
        assert_eq!(
            date_format(&ctx, "%U", t),
            Err(EvalError::UnsupportedDateTimeFormat("%U".to_string()))
        );
        assert_eq!(
            date_format(&ctx, "%X-%V", t),
            Err(EvalError::UnsupportedDateTimeFormat("%X".to_string()))
        );
        // Unlisted specifiers pass the character through.
        assert_eq!(date_format(&ctx, "%q", t), Ok("q".to_string()));
    }

    #[test]
    fn mysql_parse_basics() {
        let ctx = FuncContext::utc();
        assert_eq!(
            date_parse(&ctx, "%Y-%m-%d %H:%i:%S", "2024-02-29 13:05:09"),
            Ok(ts("2024-02-29 13:05:09"))
        );
        // Missing fields default to 1970-01-01 midnight.
        assert_eq!(date_parse(&ctx, "%H:%i", "13:05"), Ok(ts("1970-01-01 13:05:00")));
        assert_eq!(date_parse(&ctx, "%Y", "2024"), Ok(ts("2024-01-01 00:00:00")));
        // Two-digit years pivot at 70.
        assert_eq!(date_parse(&ctx, "%y-%m", "69-06"), Ok(ts("2069-06-01 00:00:00")));
        assert_eq!(date_parse(&ctx, "%y-%m", "70-06"), Ok(ts("1970-06-01 00:00:00")));
        // 12-hour clock.
        assert_eq!(
            date_parse(&ctx, "%l:%i %p", "12:30 AM"),
            Ok(ts("1970-01-01 00:30:00"))
        );
        assert_eq!(
            date_parse(&ctx, "%l:%i %p", "12:30 PM"),
            Ok(ts("1970-01-01 12:30:00"))
        );
        // Month names, case-insensitively.
        assert_eq!(
            date_parse(&ctx, "%M %d, %Y", "february 29, 2024"),
            Ok(ts("2024-02-29 00:00:00"))
        );
        // Day of year.
        assert_eq!(date_parse(&ctx, "%Y/%j", "2024/060"), Ok(ts("2024-02-29 00:00:00")));
    }

    #[test]
    fn mysql_parse_rejects_bad_input() {
        let ctx = FuncContext::utc();
        assert_eq!(
            date_parse(&ctx, "%Y-%m-%d", "2024-13-01"),
            Err(EvalError::ParseDateTime {
                input: "2024-13-01".to_string(),
                pattern: "%Y-%m-%d".to_string(),
            })
        );
        // Trailing garbage is not ignored.
        assert!(date_parse(&ctx, "%Y", "2024x").is_err());
        // Non-leap February 29.
        assert!(date_parse(&ctx, "%Y-%m-%d", "2023-02-29").is_err());
    }

    #[test]
    fn mysql_parse_applies_session_zone() {
        // The MySQL dialect has no offset token, so the session zone always
        // interprets the wall clock. 00:30 Kolkata is 19:00 UTC the day
        // before.
        let ctx = FuncContext {
            session_timezone: Some(parse_timezone("Asia/Kolkata").unwrap()),
            adjust_timestamps_to_session_zone: false,
        };
        assert_eq!(
            date_parse(&ctx, "%Y-%m-%d %H:%i", "2024-05-18 00:30"),
            Ok(ts("2024-05-17 19:00:00"))
        );
    }

    #[test]
    fn exact_width_between_adjacent_numerics() {
        let ctx = FuncContext::utc();
        // With no separators each field must take its declared width.
        assert_eq!(
            date_parse(&ctx, "%Y%m%d", "20240229"),
            Ok(ts("2024-02-29 00:00:00"))
        );
        assert!(date_parse(&ctx, "%Y%m%d", "2024229").is_err());
    }

    #[test]
    fn joda_format_basics() {
        let ctx = FuncContext::utc();
        let t = ts("2024-02-29 13:05:09");
        assert_eq!(
            format_datetime(&ctx, "yyyy-MM-dd HH:mm:ss", t),
            Ok("2024-02-29 13:05:09".to_string())
        );
        assert_eq!(
            format_datetime(&ctx, "EEEE, MMMM d, yyyy G", t),
            Ok("Thursday, February 29, 2024 AD".to_string())
        );
        assert_eq!(format_datetime(&ctx, "yy", t), Ok("24".to_string()));
        assert_eq!(
            format_datetime(&ctx, "xxxx-'W'ww-e", t),
            Ok("2024-W09-4".to_string())
        );
        assert_eq!(
            format_datetime(&ctx, "h:mm a", t),
            Ok("1:05 PM".to_string())
        );
        assert_eq!(
            format_datetime(&ctx, "DDD", t),
            Ok("060".to_string())
        );
        assert_eq!(
            format_datetime(&ctx, "''yyyy''", t),
            Ok("'2024'".to_string())
        );
        assert_eq!(
            format_datetime(&ctx, "ss.SSS", Timestamp::new(9, 123_456_789)),
            Ok("09.123".to_string())
        );
        assert_eq!(
            format_datetime(&ctx, "q", t),
            Err(EvalError::UnsupportedDateTimeFormat("q".to_string()))
        );
    }

    #[test]
    fn joda_format_zone_tokens() {
        let t = ts("2024-05-17 12:00:00");
        let kolkata = TimestampWithTz::new(t, parse_timezone("Asia/Kolkata").unwrap());
        assert_eq!(
            format_datetime_tz("HH:mm Z", kolkata),
            Ok("17:30 +05:30".to_string())
        );
        assert_eq!(
            format_datetime_tz("z", kolkata),
            Ok("Asia/Kolkata".to_string())
        );
    }

    #[test]
    fn joda_parse_offset() {
        let ctx = FuncContext::utc();
        let parsed = parse_datetime(&ctx, "yyyy-MM-dd HH:mm Z", "2024-05-18 00:30 +05:30").unwrap();
        assert_eq!(parsed.timestamp(), ts("2024-05-17 19:00:00"));
        assert_eq!(parsed.offset_seconds(), 19800);
        // Compact and zulu spellings.
        let parsed = parse_datetime(&ctx, "HH:mm Z", "00:30 -0800").unwrap();
        assert_eq!(parsed.timestamp(), ts("1970-01-01 08:30:00"));
        let parsed = parse_datetime(&ctx, "HH:mm Z", "00:30 Z").unwrap();
        assert_eq!(parsed.timestamp(), ts("1970-01-01 00:30:00"));
    }

    #[test]
    fn joda_parse_session_fallback() {
        // Without an offset token the session zone applies and is attached
        // to the result.
        let tz = parse_timezone("Asia/Kolkata").unwrap();
        let ctx = FuncContext {
            session_timezone: Some(tz),
            adjust_timestamps_to_session_zone: false,
        };
        let parsed = parse_datetime(&ctx, "yyyy-MM-dd HH:mm", "2024-05-18 00:30").unwrap();
        assert_eq!(parsed.timestamp(), ts("2024-05-17 19:00:00"));
        assert_eq!(parsed.timezone(), tz);
        // No session zone: UTC.
        let parsed = parse_datetime(&FuncContext::utc(), "yyyy-MM-dd", "2024-05-18").unwrap();
        assert_eq!(parsed.timestamp(), ts("2024-05-18 00:00:00"));
    }

    #[test]
    fn joda_parse_week_dates() {
        let ctx = FuncContext::utc();
        let parsed = parse_datetime(&ctx, "xxxx-'W'ww-e", "2024-W09-4").unwrap();
        assert_eq!(parsed.timestamp(), ts("2024-02-29 00:00:00"));
        // Weekday defaults to Monday.
        let parsed = parse_datetime(&ctx, "xxxx'W'ww", "2025W01").unwrap();
        assert_eq!(parsed.timestamp(), ts("2024-12-30 00:00:00"));
    }

    #[test]
    fn week_without_week_year_counts_in_the_calendar_year() {
        let ctx = FuncContext::utc();
        // ISO week 9 of the default year 1970 starts on February 23.
        assert_eq!(date_parse(&ctx, "%v", "09"), Ok(ts("1970-02-23 00:00:00")));
        assert_eq!(
            date_parse(&ctx, "%Y week %v", "2024 week 09"),
            Ok(ts("2024-02-26 00:00:00"))
        );
        let parsed = parse_datetime(&ctx, "'W'ww", "W09").unwrap();
        assert_eq!(parsed.timestamp(), ts("1970-02-23 00:00:00"));
    }

    #[test]
    fn joda_parse_era() {
        let ctx = FuncContext::utc();
        let parsed = parse_datetime(&ctx, "yyyy G", "0001 BC").unwrap();
        // 1 BC is year zero, proleptic.
        assert_eq!(
            parsed.timestamp(),
            Timestamp::from_naive(
                &NaiveDate::from_ymd_opt(0, 1, 1).unwrap().and_time(NaiveTime::MIN)
            )
        );
    }

    #[test]
    fn zone_name_parsing_unsupported() {
        let ctx = FuncContext::utc();
        assert_eq!(
            parse_datetime(&ctx, "HH:mm z", "00:30 UTC"),
            Err(EvalError::UnsupportedDateTimeFormat("z".to_string()))
        );
    }

    #[test]
    fn round_trips_at_pattern_precision() {
        let ctx = FuncContext::utc();
        let t = ts("2024-02-29 13:05:09");
        for pattern in ["%Y-%m-%d %H:%i:%S", "%Y/%j %T"] {
            let text = date_format(&ctx, pattern, t).unwrap();
            assert_eq!(date_parse(&ctx, pattern, &text), Ok(t), "pattern {pattern}");
        }
        for pattern in ["yyyy-MM-dd HH:mm:ss", "xxxx-'W'ww-e HH:mm:ss"] {
            let text = format_datetime(&ctx, pattern, t).unwrap();
            let parsed = parse_datetime(&ctx, pattern, &text).unwrap();
            assert_eq!(parsed.timestamp(), t, "pattern {pattern}");
        }
    }

    #[test]
    fn max_result_size_bounds_output() {
        let f = DateTimeFormatter::compile_mysql("%Y-%m-%d %H:%i:%S.%f %W").unwrap();
        let size = f.max_result_size(None);
        let out = f.format(ts("2024-09-04 01:02:03"), None).unwrap();
        assert!(out.len() <= size, "{} > {}", out.len(), size);
        let tz = parse_timezone("America/Argentina/Buenos_Aires").unwrap();
        let f = DateTimeFormatter::compile_joda("z").unwrap();
        assert_eq!(
            f.max_result_size(Some(&tz)),
            "America/Argentina/Buenos_Aires".len()
        );
    }
}
