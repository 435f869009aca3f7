// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use rill_repr::timezone::Timezone;

pub mod datetime;
pub mod format;

/// Session state consulted by the datetime functions.
///
/// Plain timestamps carry no zone of their own; whether they are read as
/// session-local wall clocks or as UTC instants is a per-session policy,
/// captured here once and threaded through evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuncContext {
    /// The session's configured timezone, if any.
    pub session_timezone: Option<Timezone>,
    /// When set, calendar-sensitive operations on plain timestamps operate
    /// on the session zone's wall clock instead of UTC.
    pub adjust_timestamps_to_session_zone: bool,
}

impl FuncContext {
    pub fn utc() -> FuncContext {
        FuncContext::default()
    }

    pub fn with_session_timezone(tz: Timezone) -> FuncContext {
        FuncContext {
            session_timezone: Some(tz),
            adjust_timestamps_to_session_zone: true,
        }
    }

    /// The zone calendar-sensitive operations should interpret plain
    /// timestamps in. `None` means UTC wall clock, i.e. no adjustment.
    pub fn operating_timezone(&self) -> Option<Timezone> {
        if self.adjust_timestamps_to_session_zone {
            self.session_timezone
        } else {
            None
        }
    }
}
