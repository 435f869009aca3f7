// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The MySQL `%`-token pattern dialect.

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
    let mut items = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        let Some(spec) = chars.next() else {
            // A trailing lone percent is itself.
            literal.push('%');
            break;
        };
        let item = match spec {
            'a' => FormatItem::WeekdayName { abbreviated: true },
            'b' => FormatItem::MonthName { abbreviated: true },
            'c' => numeric(Month, 1),
            'd' => numeric(Day, 2),
            'e' => numeric(Day, 1),
            // Microseconds.
            'f' => FormatItem::Fraction(6),
            'H' => numeric(Hour24, 2),
            'h' | 'I' => numeric(Hour12, 2),
            'i' => numeric(Minute, 2),
            'j' => numeric(DayOfYear, 3),
            'k' => numeric(Hour24, 1),
            'l' => numeric(Hour12, 1),
            'M' => FormatItem::MonthName { abbreviated: false },
            'm' => numeric(Month, 2),
            'p' => FormatItem::Halfday,
            'r' => {
                flush(&mut literal, &mut items);
                items.extend([
                    numeric(Hour12, 2),
                    FormatItem::Literal(":".to_string()),
                    numeric(Minute, 2),
                    FormatItem::Literal(":".to_string()),
                    numeric(Second, 2),
                    FormatItem::Literal(" ".to_string()),
                    FormatItem::Halfday,
                ]);
                continue;
            }
            'S' | 's' => numeric(Second, 2),
            'T' => {
                flush(&mut literal, &mut items);
                items.extend([
                    numeric(Hour24, 2),
                    FormatItem::Literal(":".to_string()),
                    numeric(Minute, 2),
                    FormatItem::Literal(":".to_string()),
                    numeric(Second, 2),
                ]);
                continue;
            }
            'v' => numeric(WeekOfYear, 2),
            'W' => FormatItem::WeekdayName { abbreviated: false },
            'w' => numeric(DayOfWeekSunday0, 1),
            'x' => numeric(WeekYear, 4),
            'Y' => numeric(Year, 4),
            'y' => numeric(TwoDigitYear, 2),
            '%' => {
                literal.push('%');
                continue;
            }
            'D' | 'U' | 'u' | 'V' | 'X' => {
                return Err(EvalError::UnsupportedDateTimeFormat(format!("%{spec}")));
            }
            // MySQL passes unlisted specifiers through as the bare
            // character.
            other => {
                literal.push(other);
                continue;
            }
        };
        flush(&mut literal, &mut items);
        items.push(item);
    }
    flush(&mut literal, &mut items);
    Ok(items)
}
