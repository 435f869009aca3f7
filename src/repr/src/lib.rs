// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The core datetime value types of rill.
//!
//! Values flowing through the scalar function layer are plain, immutable
//! value types: an absolute instant ([`adt::timestamp::Timestamp`]), a
//! calendar day ([`adt::date::Date`]), an instant paired with the time zone
//! it was expressed in ([`adt::timestamp::TimestampWithTz`]), and an exact
//! day-time duration ([`adt::interval::IntervalDayTime`]). The broken-down
//! civil representation ([`adt::datetime::DateTimeFields`]) and the closed
//! unit taxonomy ([`adt::datetime::DateTimeUnit`]) underpin the calendar
//! arithmetic in `rill-expr`.

pub mod adt;
pub mod timezone;
