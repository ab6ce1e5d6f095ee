/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Splits a string into substrings around a (non-empty) delimiter.
///
/// `limit` controls the behavior:
/// * `0`: split on every occurrence
/// * `1`: no split, the input comes back as a single element
/// * `>1`: split into at most `limit` parts; the final part keeps any
///   remaining delimiters
pub(crate) fn split<'a>(value: &'a str, delimiter: &str, limit: usize) -> Vec<&'a str> {
    if limit == 0 {
        return value.split(delimiter).collect();
    }
    value.splitn(limit, delimiter).collect()
}
