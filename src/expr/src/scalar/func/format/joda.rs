// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The Joda letter-repetition pattern dialect.
//!
//! A run of the same pattern letter forms one token whose length sets the
//! field width (or, for names, picks the abbreviated vs full form). Text
//! between single quotes is literal; two single quotes escape one.

use super::{FormatItem, NumericField};
use crate::scalar::EvalError;

fn numeric(field: NumericField, width: usize) -> FormatItem {
    FormatItem::Numeric { field, width }
}

fn flush(literal: &mut String, items: &mut Vec<FormatItem>) {
    if !literal.is_empty() {
        items.push(FormatItem::Literal(std::mem::take(literal)));
    }
}

pub(super) fn compile(pattern: &str) -> Result<Vec<FormatItem>, EvalError> {
    use NumericField::*;
    let chars: Vec<char> = pattern.chars().collect();
    let mut items = Vec::new();
    let mut literal = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                literal.push('\'');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            loop {
                match chars.get(j) {
                    None => {
                        return Err(EvalError::UnsupportedDateTimeFormat("'".to_string()));
                    }
                    Some('\'') if chars.get(j + 1) == Some(&'\'') => {
                        literal.push('\'');
                        j += 2;
                    }
                    Some('\'') => {
                        j += 1;
                        break;
                    }
                    Some(ch) => {
                        literal.push(*ch);
                        j += 1;
                    }
                }
            }
            i = j;
            continue;
        }
        if !c.is_ascii_alphabetic() {
            literal.push(c);
            i += 1;
            continue;
        }
        let mut reps = 1;
        while chars.get(i + reps) == Some(&c) {
            reps += 1;
        }
        i += reps;
        let item = match c {
            'y' | 'Y' if reps == 2 => numeric(TwoDigitYear, 2),
            'y' | 'Y' => numeric(Year, reps),
            'x' if reps == 2 => numeric(TwoDigitYear, 2),
            'x' => numeric(WeekYear, reps),
            'M' => match reps {
                1 | 2 => numeric(Month, reps),
                3 => FormatItem::MonthName { abbreviated: true },
                _ => FormatItem::MonthName { abbreviated: false },
            },
            'd' => numeric(Day, reps),
            'D' => numeric(DayOfYear, reps),
            'w' => numeric(WeekOfYear, reps),
            'e' => numeric(IsoDayOfWeek, reps),
            'E' => FormatItem::WeekdayName {
                abbreviated: reps <= 3,
            },
            'H' => numeric(Hour24, reps),
            'h' => numeric(Hour12, reps),
            'm' => numeric(Minute, reps),
            's' => numeric(Second, reps),
            // Nanoseconds are the finest stored precision.
            'S' => FormatItem::Fraction(reps.min(9)),
            'a' => FormatItem::Halfday,
            'G' => FormatItem::Era,
            'Z' => FormatItem::TimezoneOffset,
            'z' => FormatItem::TimezoneName,
            other => {
                return Err(EvalError::UnsupportedDateTimeFormat(other.to_string()));
            }
        };
        flush(&mut literal, &mut items);
        items.push(item);
    }
    flush(&mut literal, &mut items);
    Ok(items)
}
