// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod func;

/// A per-row evaluation failure.
///
/// These surface to users as query errors, so the `Display` text is the
/// user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalError {
    /// The unit string names no known datetime unit.
    UnknownUnits(String),
    /// The unit is known but not usable with dates.
    InvalidDateField(String),
    /// The unit is known but not usable with timestamps in this operation.
    InvalidTimestampField(String),
    IntegerOutOfRange,
    TimestampOutOfRange,
    /// A day-time interval with a sub-day remainder was applied to a date.
    NonWholeDayInterval,
    InvalidTimezone(String),
    /// The format pattern contains a token this dialect does not support.
    UnsupportedDateTimeFormat(String),
    /// The input string did not match the parse pattern.
    ParseDateTime { input: String, pattern: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::UnknownUnits(units) => write!(f, "unknown units '{}'", units),
            EvalError::InvalidDateField(units) => {
                write!(f, "units '{}' not supported for type date", units)
            }
            EvalError::InvalidTimestampField(units) => {
                write!(f, "units '{}' not supported for type timestamp", units)
            }
            EvalError::IntegerOutOfRange => f.write_str("integer out of range"),
            EvalError::TimestampOutOfRange => f.write_str("timestamp out of range"),
            EvalError::NonWholeDayInterval => {
                f.write_str("interval must be a whole number of days")
            }
            EvalError::InvalidTimezone(tz) => write!(f, "invalid time zone '{}'", tz),
            EvalError::UnsupportedDateTimeFormat(token) => {
                write!(f, "datetime format specifier '{}' is not supported", token)
            }
            EvalError::ParseDateTime { input, pattern } => {
                write!(f, "invalid datetime '{}' for format '{}'", input, pattern)
            }
        }
    }
}

impl std::error::Error for EvalError {}
