/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::{DiagnosticCollector, DiagnosticMessage};

/// Extracts `input[start..stop)`, or `None` when the request is unsatisfiable.
///
/// Indices are character positions; only ASCII input is accepted so positions
/// and bytes agree. When `reverse` is set, positions count from the end of
/// the string instead of the beginning. Out-of-range indices and
/// `start >= stop` produce `None`, not an error, so rule authors can branch
/// on the result with `isSet`.
pub(crate) fn substring<'a>(
    input: &'a str,
    start: usize,
    stop: usize,
    reverse: bool,
    e: &mut DiagnosticCollector,
) -> Option<&'a str> {
    if !input.is_ascii() {
        e.report_error(DiagnosticMessage::new("substring requires ASCII input"));
        return None;
    }
    if start >= stop || input.len() < stop {
        e.report_error(DiagnosticMessage::new(format!(
            "invalid substring indices {start}..{stop} for input of length {}",
            input.len()
        )));
        return None;
    }
    if reverse {
        Some(&input[input.len() - stop..input.len() - start])
    } else {
        Some(&input[start..stop])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check(input: &str, start: usize, stop: usize, reverse: bool) -> Option<&str> {
        substring(input, start, stop, reverse, &mut DiagnosticCollector::new())
    }

    #[test]
    fn forward_substring() {
        assert_eq!(check("hello", 1, 3, false), Some("el"));
        assert_eq!(check("hello", 0, 5, false), Some("hello"));
    }

    #[test]
    fn reversed_substring() {
        assert_eq!(check("hello", 1, 3, true), Some("ll"));
        assert_eq!(check("hello", 0, 2, true), Some("lo"));
    }

    #[test]
    fn inverted_range_is_none() {
        assert_eq!(check("hello", 3, 1, false), None);
        assert_eq!(check("hello", 2, 2, false), None);
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(check("hi", 0, 3, false), None);
        assert_eq!(check("", 0, 1, false), None);
    }

    #[test]
    fn non_ascii_is_none() {
        assert_eq!(check("héllo", 0, 2, false), None);
    }

    #[test]
    fn diagnostic_records_the_cause() {
        let mut collector = DiagnosticCollector::new();
        assert_eq!(substring("hello", 3, 1, false, &mut collector), None);
        let err = collector.take_last_error().unwrap();
        assert!(err.to_string().contains("invalid substring indices"), "{err}");
    }
}
