// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Abstract data types.
//!
//! Native Rust types are used for many primitive values, but the datetime
//! types require custom implementations, which are contained in this module.

pub mod date;
pub mod datetime;
pub mod interval;
pub mod timestamp;
