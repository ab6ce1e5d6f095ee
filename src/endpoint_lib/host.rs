/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::{DiagnosticCollector, DiagnosticMessage};

/// Validates a host label per RFC 1123.
///
/// A label is 1–63 characters, starts with an ASCII letter or digit, and
/// contains only ASCII letters, digits, and hyphens. With `allow_dots`, the
/// input is treated as dot-separated labels validated independently.
pub(crate) fn is_valid_host_label(label: &str, allow_dots: bool, e: &mut DiagnosticCollector) -> bool {
    if allow_dots {
        // an empty string splits into one empty segment, which fails below
        return label.split('.').all(|segment| is_valid_host_label(segment, false, e));
    }
    if label.is_empty() || label.len() > 63 {
        e.report_error(DiagnosticMessage::new(format!(
            "host label must be 1-63 characters, got {}",
            label.len()
        )));
        return false;
    }
    if !label.chars().next().expect("non-empty").is_ascii_alphanumeric() {
        e.report_error(DiagnosticMessage::new(format!(
            "host label `{label}` must start with a letter or digit"
        )));
        return false;
    }
    let valid = label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        e.report_error(DiagnosticMessage::new(format!(
            "host label `{label}` contains invalid characters"
        )));
    }
    valid
}
