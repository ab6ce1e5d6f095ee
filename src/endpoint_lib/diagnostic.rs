/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::error::Error;
use std::fmt;

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Capturing sink for the most recent builtin failure.
///
/// Builtins return `None` on failure rather than erroring; the collector
/// remembers why, so that an eventual "no rules matched" result can point at
/// the last thing that went wrong.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    last_error: Option<BoxError>,
}

impl DiagnosticCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Capture the error (if any) from `result`, returning the success value.
    pub(crate) fn capture<T, E: Into<BoxError>>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.report_error(err);
                None
            }
        }
    }

    pub(crate) fn report_error(&mut self, error: impl Into<BoxError>) {
        self.last_error = Some(error.into());
    }

    pub(crate) fn take_last_error(&mut self) -> Option<BoxError> {
        self.last_error.take()
    }
}

/// A plain-text diagnostic message.
#[derive(Debug)]
pub(crate) struct DiagnosticMessage(String);

impl DiagnosticMessage {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for DiagnosticMessage {}
