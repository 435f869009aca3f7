// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Scalar datetime functions over the core value types.
//!
//! Everything here evaluates one row at a time and reports failures
//! through [`EvalError`](scalar::EvalError) rather than panicking, so a
//! caller can surface per-row errors however it likes.

pub mod scalar;

pub use crate::scalar::func::FuncContext;
pub use crate::scalar::EvalError;
