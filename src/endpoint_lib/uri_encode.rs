/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::borrow::Cow;

/// Characters that must be percent-encoded.
///
/// RFC 3986 reserves more than the `CONTROLS` baseline; everything outside
/// the unreserved set (ALPHA / DIGIT / `-` / `.` / `_` / `~`) is encoded so
/// the output is safe in any URL component.
const BASE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'/')
    .add(b':')
    .add(b',')
    .add(b'?')
    .add(b'#')
    .add(b'[')
    .add(b']')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'@')
    .add(b'!')
    .add(b'$')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b';')
    .add(b'=')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'"')
    .add(b'^')
    .add(b'`')
    .add(b'\\');

pub(crate) fn uri_encode(s: &str) -> Cow<'_, str> {
    utf8_percent_encode(s, BASE_SET).into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unreserved_characters_pass_through() {
        assert_eq!(uri_encode("abcABC123-._~"), "abcABC123-._~");
    }

    #[test]
    fn reserved_characters_are_encoded() {
        assert_eq!(uri_encode("a b"), "a%20b");
        assert_eq!(uri_encode("a/b"), "a%2Fb");
        assert_eq!(uri_encode("a:b"), "a%3Ab");
        assert_eq!(uri_encode("100%"), "100%25");
        assert_eq!(uri_encode("a&b=c"), "a%26b%3Dc");
    }

    #[test]
    fn utf8_is_encoded_bytewise() {
        assert_eq!(uri_encode("\u{2603}"), "%E2%98%83");
    }
}
