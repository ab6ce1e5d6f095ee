/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Resolved endpoints and endpoint resolution errors.

use aws_smithy_types::Document;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// A successfully resolved endpoint.
///
/// Carries the endpoint URL plus any properties (e.g. auth scheme hints) and
/// headers the matching rule attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    url: String,
    properties: HashMap<String, Document>,
    headers: HashMap<String, Vec<String>>,
}

impl Endpoint {
    /// Builder for an [`Endpoint`].
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// The endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Endpoint properties, as open content.
    pub fn properties(&self) -> &HashMap<String, Document> {
        &self.properties
    }

    /// Headers to set when connecting to this endpoint.
    pub fn headers(&self) -> &HashMap<String, Vec<String>> {
        &self.headers
    }
}

/// Builder for [`Endpoint`].
#[derive(Debug, Default)]
pub struct Builder {
    url: Option<String>,
    properties: HashMap<String, Document>,
    headers: HashMap<String, Vec<String>>,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint URL (required).
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach a property to the endpoint.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Document>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Add a header value. Repeated names accumulate.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Construct the [`Endpoint`].
    ///
    /// # Panics
    /// Panics if [`url`](Builder::url) was never set.
    pub fn build(self) -> Endpoint {
        Endpoint {
            url: self.url.expect("url is required when building an endpoint"),
            properties: self.properties,
            headers: self.headers,
        }
    }
}

/// The ways endpoint resolution can fail.
///
/// An authored error rule surfaces as [`RuleError`](ResolveEndpointError::RuleError);
/// the reserved "nothing matched" outcome is kept separate as
/// [`NoRulesMatched`](ResolveEndpointError::NoRulesMatched) since it usually
/// points at a gap in the ruleset rather than an intentional rejection.
#[derive(Debug)]
#[non_exhaustive]
pub enum ResolveEndpointError {
    /// An error rule matched; carries its rendered message.
    RuleError {
        /// The rendered error message.
        message: String,
    },
    /// No rule in the tree matched the given parameters.
    NoRulesMatched {
        /// Why the last candidate was rejected, when a builtin recorded one.
        context: Option<String>,
    },
    /// The parameter bindings were rejected before evaluation started.
    InvalidParams {
        /// Description of the rejected binding.
        message: String,
    },
    /// Evaluation hit a defect: unresolved reference, unknown function, or a
    /// type/arity mismatch that escaped load-time validation.
    Evaluation {
        /// Description of the defect.
        message: String,
    },
}

impl ResolveEndpointError {
    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }
}

impl fmt::Display for ResolveEndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleError { message } => write!(f, "endpoint resolution failed: {message}"),
            Self::NoRulesMatched { context: Some(context) } => {
                write!(f, "no rules matched the given parameters ({context})")
            }
            Self::NoRulesMatched { context: None } => {
                write!(f, "no rules matched the given parameters")
            }
            Self::InvalidParams { message } => write!(f, "invalid parameters: {message}"),
            Self::Evaluation { message } => write!(f, "error evaluating ruleset: {message}"),
        }
    }
}

impl Error for ResolveEndpointError {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_accumulates_headers() {
        let endpoint = Endpoint::builder()
            .url("https://example.com")
            .header("x-amz-a", "1")
            .header("x-amz-a", "2")
            .header("x-amz-b", "3")
            .build();
        assert_eq!(
            endpoint.headers().get("x-amz-a"),
            Some(&vec!["1".to_string(), "2".to_string()])
        );
        assert_eq!(endpoint.headers().get("x-amz-b"), Some(&vec!["3".to_string()]));
    }

    #[test]
    #[should_panic(expected = "url is required")]
    fn url_is_required() {
        let _ = Endpoint::builder().build();
    }
}
