/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The builtin function library for the rules language.
//!
//! Every function here is pure. Functions that can fail return `Option` and
//! record the cause in a [`diagnostic::DiagnosticCollector`] so that a final
//! "no rules matched" outcome can explain itself; rule authors branch on the
//! `None` with `isSet` instead of handling errors.

pub(crate) mod diagnostic;
pub(crate) mod host;
pub(crate) mod parse_url;
pub(crate) mod partition;
pub(crate) mod split;
pub(crate) mod substring;
pub(crate) mod uri_encode;
