/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::endpoint_lib::diagnostic::{DiagnosticCollector, DiagnosticMessage};
use url::Host;

/// The components of a successfully parsed endpoint URL.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Url {
    scheme: String,
    authority: String,
    path: String,
    normalized_path: String,
    is_ip: bool,
}

impl Url {
    /// URL scheme (`http` or `https`).
    pub(crate) fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host plus any non-default port, e.g. `example.com:8443`.
    pub(crate) fn authority(&self) -> &str {
        &self.authority
    }

    /// The path exactly as given.
    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    /// The path, guaranteed to end with `/`.
    pub(crate) fn normalized_path(&self) -> &str {
        &self.normalized_path
    }

    /// Whether the host is an IPv4 or IPv6 literal. Hostname-prefix
    /// mutations (e.g. virtual-hosted bucket addressing) are unsafe when
    /// this is true.
    pub(crate) fn is_ip(&self) -> bool {
        self.is_ip
    }
}

/// Parses an endpoint URL, returning `None` for anything the rules language
/// refuses to operate on: unparseable input, non-HTTP(S) schemes, and URLs
/// carrying a query or fragment.
pub(crate) fn parse_url(raw: &str, e: &mut DiagnosticCollector) -> Option<Url> {
    let url = e.capture(url::Url::parse(raw))?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        e.report_error(DiagnosticMessage::new(format!(
            "unsupported scheme `{scheme}` in `{raw}`"
        )));
        return None;
    }
    if url.query().is_some() || url.fragment().is_some() {
        e.report_error(DiagnosticMessage::new(format!(
            "URL must not have a query or fragment: `{raw}`"
        )));
        return None;
    }
    let host = match url.host() {
        Some(host) => host,
        None => {
            e.report_error(DiagnosticMessage::new(format!("URL has no host: `{raw}`")));
            return None;
        }
    };
    let is_ip = matches!(host, Host::Ipv4(_) | Host::Ipv6(_));
    let host_str = url.host_str().expect("host checked above");
    let authority = match url.port() {
        Some(port) => format!("{host_str}:{port}"),
        None => host_str.to_string(),
    };
    let path = url.path().to_string();
    let normalized_path = if path.ends_with('/') {
        path.clone()
    } else {
        format!("{path}/")
    };
    Some(Url {
        scheme: scheme.to_string(),
        authority,
        path,
        normalized_path,
        is_ip,
    })
}
