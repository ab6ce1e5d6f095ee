/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Conformance test cases for endpoint rulesets.
//!
//! Rulesets document their expected behavior as test vectors: a set of
//! parameter bindings paired with either the endpoint they must resolve to
//! or the error message resolution must produce. This module loads those
//! vectors and checks a ruleset against them.

use crate::endpoint_lib::partition::PartitionResolver;
use crate::eval::Params;
use crate::expr::Value;
use crate::ruleset::RuleSet;
use crate::ResolveEndpointError;
use aws_smithy_types::{Document, Number};
use serde_json::Value as Json;
use std::collections::HashMap;
use thiserror::Error;

/// A test-case document failed to load.
#[derive(Debug, Error)]
#[error("invalid test case: {0}")]
pub struct InvalidTestCaseError(String);

/// A test case did not behave as documented.
#[derive(Debug, Error)]
pub enum TestFailure {
    /// Resolution failed where an endpoint was expected.
    #[error("expected endpoint `{expected}` but resolution failed: {actual}")]
    UnexpectedError {
        /// The endpoint URL the case documented.
        expected: String,
        /// The error resolution actually produced.
        actual: String,
    },
    /// Resolution produced an endpoint where an error was expected.
    #[error("expected error `{expected}` but resolution produced endpoint `{actual}`")]
    UnexpectedEndpoint {
        /// The error message the case documented.
        expected: String,
        /// The URL resolution actually produced.
        actual: String,
    },
    /// Resolution produced a different endpoint than documented.
    #[error("wrong endpoint: expected `{expected}`, got `{actual}`{detail}")]
    WrongEndpoint {
        /// The endpoint URL the case documented.
        expected: String,
        /// The URL resolution actually produced.
        actual: String,
        /// Which part of the endpoint differed.
        detail: String,
    },
    /// Resolution failed with a different message than documented.
    #[error("wrong error: expected `{expected}`, got `{actual}`")]
    WrongError {
        /// The error message the case documented.
        expected: String,
        /// The message resolution actually produced.
        actual: String,
    },
}

/// What a test case expects: an endpoint or an error.
#[derive(Debug, Clone, PartialEq)]
enum Expectation {
    Endpoint {
        url: String,
        properties: HashMap<String, Document>,
        headers: HashMap<String, Vec<String>>,
    },
    Error {
        message: String,
    },
}

/// One documented (params → expected outcome) vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    documentation: Option<String>,
    params: Params,
    expect: Expectation,
}

impl TestCase {
    /// Load a test case from its JSON form:
    /// `{"documentation"?, "params": {...}, "expect": {"endpoint": ...} | {"error": ...}}`.
    pub fn from_json(json: &Json) -> Result<Self, InvalidTestCaseError> {
        let map = json
            .as_object()
            .ok_or_else(|| InvalidTestCaseError("test case must be an object".into()))?;
        let documentation = map
            .get("documentation")
            .and_then(Json::as_str)
            .map(str::to_string);
        let mut params = Params::builder();
        if let Some(bindings) = map.get("params") {
            let bindings = bindings
                .as_object()
                .ok_or_else(|| InvalidTestCaseError("`params` must be an object".into()))?;
            for (name, value) in bindings {
                let value = match value {
                    Json::String(s) => Value::String(s.clone()),
                    Json::Bool(b) => Value::Bool(*b),
                    other => {
                        return Err(InvalidTestCaseError(format!(
                            "parameter `{name}` must be a string or boolean, got {other}"
                        )))
                    }
                };
                params = params.set(name.clone(), value);
            }
        }
        let expect = map
            .get("expect")
            .and_then(Json::as_object)
            .ok_or_else(|| InvalidTestCaseError("test case is missing `expect`".into()))?;
        let expect = if let Some(error) = expect.get("error") {
            let message = error
                .as_str()
                .ok_or_else(|| InvalidTestCaseError("`expect.error` must be a string".into()))?;
            Expectation::Error {
                message: message.to_string(),
            }
        } else if let Some(endpoint) = expect.get("endpoint") {
            let endpoint = endpoint.as_object().ok_or_else(|| {
                InvalidTestCaseError("`expect.endpoint` must be an object".into())
            })?;
            let url = endpoint
                .get("url")
                .and_then(Json::as_str)
                .ok_or_else(|| {
                    InvalidTestCaseError("`expect.endpoint` is missing a string `url`".into())
                })?;
            let mut properties = HashMap::new();
            if let Some(props) = endpoint.get("properties").and_then(Json::as_object) {
                for (name, value) in props {
                    properties.insert(name.clone(), document_from_json(value));
                }
            }
            let mut headers = HashMap::new();
            if let Some(hdrs) = endpoint.get("headers").and_then(Json::as_object) {
                for (name, values) in hdrs {
                    let values = values
                        .as_array()
                        .ok_or_else(|| {
                            InvalidTestCaseError(format!(
                                "expected header `{name}` must be an array of strings"
                            ))
                        })?
                        .iter()
                        .map(|v| {
                            v.as_str().map(str::to_string).ok_or_else(|| {
                                InvalidTestCaseError(format!(
                                    "expected header `{name}` must be an array of strings"
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    headers.insert(name.clone(), values);
                }
            }
            Expectation::Endpoint {
                url: url.to_string(),
                properties,
                headers,
            }
        } else {
            return Err(InvalidTestCaseError(
                "`expect` must contain `endpoint` or `error`".into(),
            ));
        };
        Ok(TestCase {
            documentation,
            params: params.build(),
            expect,
        })
    }

    /// The case's documentation string, if any.
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Evaluate `ruleset` with this case's params and compare the outcome
    /// against the expectation. Omitted `properties`/`headers` in an
    /// endpoint expectation mean the resolved endpoint must carry none.
    pub fn check(
        &self,
        ruleset: &RuleSet,
        partitions: &PartitionResolver,
    ) -> Result<(), TestFailure> {
        let result = ruleset.resolve_endpoint_with_partitions(&self.params, partitions);
        match (&self.expect, result) {
            (
                Expectation::Endpoint {
                    url,
                    properties,
                    headers,
                },
                Ok(actual),
            ) => {
                if actual.url() != url.as_str() {
                    return Err(TestFailure::WrongEndpoint {
                        expected: url.clone(),
                        actual: actual.url().to_string(),
                        detail: String::new(),
                    });
                }
                if actual.properties() != properties {
                    return Err(TestFailure::WrongEndpoint {
                        expected: url.clone(),
                        actual: actual.url().to_string(),
                        detail: format!(
                            " (properties differ: expected {properties:?}, got {:?})",
                            actual.properties()
                        ),
                    });
                }
                if actual.headers() != headers {
                    return Err(TestFailure::WrongEndpoint {
                        expected: url.clone(),
                        actual: actual.url().to_string(),
                        detail: format!(
                            " (headers differ: expected {headers:?}, got {:?})",
                            actual.headers()
                        ),
                    });
                }
                Ok(())
            }
            (Expectation::Endpoint { url, .. }, Err(err)) => Err(TestFailure::UnexpectedError {
                expected: url.clone(),
                actual: err.to_string(),
            }),
            (Expectation::Error { message }, Err(err)) => {
                let actual = match err {
                    ResolveEndpointError::RuleError { message } => message,
                    other => other.to_string(),
                };
                if &actual == message {
                    Ok(())
                } else {
                    Err(TestFailure::WrongError {
                        expected: message.clone(),
                        actual,
                    })
                }
            }
            (Expectation::Error { message }, Ok(actual)) => Err(TestFailure::UnexpectedEndpoint {
                expected: message.clone(),
                actual: actual.url().to_string(),
            }),
        }
    }
}

/// A whole `{"testCases": [...]}` document.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSuite {
    cases: Vec<TestCase>,
}

impl TestSuite {
    /// Load a suite from its JSON document form.
    pub fn from_json_str(raw: &str) -> Result<Self, InvalidTestCaseError> {
        let json: Json = serde_json::from_str(raw)
            .map_err(|err| InvalidTestCaseError(format!("not valid JSON: {err}")))?;
        let cases = json
            .get("testCases")
            .and_then(Json::as_array)
            .ok_or_else(|| InvalidTestCaseError("missing `testCases` array".into()))?
            .iter()
            .map(TestCase::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TestSuite { cases })
    }

    /// The cases in this suite.
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Check every case, returning the failures (with case index) if any.
    pub fn check_all(
        &self,
        ruleset: &RuleSet,
        partitions: &PartitionResolver,
    ) -> Result<(), Vec<(usize, TestFailure)>> {
        let failures: Vec<_> = self
            .cases
            .iter()
            .enumerate()
            .filter_map(|(ix, case)| case.check(ruleset, partitions).err().map(|f| (ix, f)))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

fn document_from_json(json: &Json) -> Document {
    match json {
        Json::Null => Document::Null,
        Json::Bool(b) => Document::Bool(*b),
        Json::Number(n) => {
            if let Some(int) = n.as_u64() {
                Document::Number(Number::PosInt(int))
            } else if let Some(int) = n.as_i64() {
                Document::Number(Number::NegInt(int))
            } else {
                Document::Number(Number::Float(n.as_f64().unwrap_or_default()))
            }
        }
        Json::String(s) => Document::String(s.clone()),
        Json::Array(items) => Document::Array(items.iter().map(document_from_json).collect()),
        Json::Object(map) => Document::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_from_json(v)))
                .collect(),
        ),
    }
}
