/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The endpoint ruleset model: parameter declarations and the rule tree.
//!
//! Loading is fail-fast: a malformed document, an unresolvable reference, or
//! an unknown function is an [`InvalidRuleSetError`] at load time, never a
//! deferred evaluation failure.

use crate::expr::{Expression, Literal, Template, Value};
use crate::validate;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// A ruleset failed to load or validate.
#[derive(Debug)]
pub struct InvalidRuleSetError {
    message: String,
}

impl InvalidRuleSetError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for InvalidRuleSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid ruleset: {}", self.message)
    }
}

impl Error for InvalidRuleSetError {}

/// The declared type of a [`Parameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    /// A string parameter.
    String,
    /// A boolean parameter.
    Boolean,
}

impl ParameterType {
    fn from_json(json: &Json, name: &str) -> Result<Self, InvalidRuleSetError> {
        match json.as_str() {
            Some(t) if t.eq_ignore_ascii_case("string") => Ok(ParameterType::String),
            Some(t) if t.eq_ignore_ascii_case("boolean") => Ok(ParameterType::Boolean),
            Some(other) => Err(InvalidRuleSetError::new(format!(
                "parameter `{name}`: unrecognized type `{other}`"
            ))),
            None => Err(InvalidRuleSetError::new(format!(
                "parameter `{name}`: `type` must be a string"
            ))),
        }
    }

    pub(crate) fn matches(&self, value: &Value) -> bool {
        match self {
            ParameterType::String => matches!(value, Value::String(_)),
            ParameterType::Boolean => matches!(value, Value::Bool(_)),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterType::String => write!(f, "String"),
            ParameterType::Boolean => write!(f, "Boolean"),
        }
    }
}

/// A declared input to the ruleset. Immutable once loaded; values are bound
/// per invocation via [`Params`](crate::Params).
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    parameter_type: ParameterType,
    required: bool,
    built_in: Option<String>,
    default: Option<Value>,
    documentation: Option<String>,
}

impl Parameter {
    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    /// Whether a value must be bound (or defaulted) at evaluation time.
    pub fn required(&self) -> bool {
        self.required
    }

    /// The well-known external source this parameter is tied to, if any
    /// (e.g. `AWS::Region`). Binding from that source is the host's job.
    pub fn built_in(&self) -> Option<&str> {
        self.built_in.as_deref()
    }

    /// The default applied when no value is bound.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Modeled documentation.
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    fn from_json(name: &str, json: &Json) -> Result<Self, InvalidRuleSetError> {
        let map = json.as_object().ok_or_else(|| {
            InvalidRuleSetError::new(format!("parameter `{name}` must be an object"))
        })?;
        let parameter_type = ParameterType::from_json(
            map.get("type").unwrap_or(&Json::Null),
            name,
        )?;
        let required = match map.get("required") {
            None => false,
            Some(Json::Bool(b)) => *b,
            Some(_) => {
                return Err(InvalidRuleSetError::new(format!(
                    "parameter `{name}`: `required` must be a boolean"
                )))
            }
        };
        let default = match map.get("default") {
            None | Some(Json::Null) => None,
            Some(Json::String(s)) => Some(Value::String(s.clone())),
            Some(Json::Bool(b)) => Some(Value::Bool(*b)),
            Some(_) => {
                return Err(InvalidRuleSetError::new(format!(
                    "parameter `{name}`: `default` must be a string or boolean"
                )))
            }
        };
        if let Some(default) = &default {
            if !parameter_type.matches(default) {
                return Err(InvalidRuleSetError::new(format!(
                    "parameter `{name}`: default does not match declared type {parameter_type}"
                )));
            }
        }
        let built_in = match map.get("builtIn") {
            None => None,
            Some(Json::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(InvalidRuleSetError::new(format!(
                    "parameter `{name}`: `builtIn` must be a string"
                )))
            }
        };
        let documentation = map
            .get("documentation")
            .and_then(Json::as_str)
            .map(str::to_string);
        Ok(Parameter {
            name: name.to_string(),
            parameter_type,
            required,
            built_in,
            default,
            documentation,
        })
    }
}

/// A guard on a rule: a function call whose result must be truthy, optionally
/// bound to a name visible to the rest of the rule and its descendants.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Condition {
    pub(crate) expr: Expression,
    pub(crate) assign: Option<String>,
}

impl Condition {
    fn from_json(json: &Json, ctx: &str) -> Result<Self, InvalidRuleSetError> {
        let map = json
            .as_object()
            .ok_or_else(|| InvalidRuleSetError::new(format!("{ctx}: condition must be an object")))?;
        if map.get("fn").is_none() {
            return Err(InvalidRuleSetError::new(format!(
                "{ctx}: condition must be a function call (missing `fn`)"
            )));
        }
        let expr = Expression::call_from_json(map, ctx)?;
        let assign = match map.get("assign") {
            None => None,
            Some(Json::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(InvalidRuleSetError::new(format!(
                    "{ctx}: `assign` must be a string"
                )))
            }
        };
        Ok(Condition { expr, assign })
    }

    fn list_from_json(json: Option<&Json>, ctx: &str) -> Result<Vec<Self>, InvalidRuleSetError> {
        match json {
            None => Ok(Vec::new()),
            Some(Json::Array(conditions)) => conditions
                .iter()
                .enumerate()
                .map(|(ix, c)| Condition::from_json(c, &format!("{ctx}.conditions[{ix}]")))
                .collect(),
            Some(_) => Err(InvalidRuleSetError::new(format!(
                "{ctx}: `conditions` must be an array"
            ))),
        }
    }
}

/// The body of an endpoint rule: how to construct the resolved endpoint.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EndpointTemplate {
    pub(crate) url: Expression,
    pub(crate) properties: HashMap<String, Literal>,
    pub(crate) headers: HashMap<String, Vec<Template>>,
}

impl EndpointTemplate {
    fn from_json(json: &Json, ctx: &str) -> Result<Self, InvalidRuleSetError> {
        let map = json
            .as_object()
            .ok_or_else(|| InvalidRuleSetError::new(format!("{ctx}: `endpoint` must be an object")))?;
        let url = map
            .get("url")
            .ok_or_else(|| InvalidRuleSetError::new(format!("{ctx}: endpoint is missing `url`")))?;
        let url = Expression::from_json(url, &format!("{ctx}.url"))?;
        let mut properties = HashMap::new();
        if let Some(props) = map.get("properties") {
            let props = props.as_object().ok_or_else(|| {
                InvalidRuleSetError::new(format!("{ctx}: `properties` must be an object"))
            })?;
            for (name, value) in props {
                properties.insert(
                    name.clone(),
                    Literal::from_json(value, &format!("{ctx}.properties.{name}"))?,
                );
            }
        }
        let mut headers = HashMap::new();
        if let Some(hdrs) = map.get("headers") {
            let hdrs = hdrs.as_object().ok_or_else(|| {
                InvalidRuleSetError::new(format!("{ctx}: `headers` must be an object"))
            })?;
            for (name, values) in hdrs {
                let values = values.as_array().ok_or_else(|| {
                    InvalidRuleSetError::new(format!(
                        "{ctx}: header `{name}` must be an array of strings"
                    ))
                })?;
                let templates = values
                    .iter()
                    .map(|v| {
                        let raw = v.as_str().ok_or_else(|| {
                            InvalidRuleSetError::new(format!(
                                "{ctx}: header `{name}` must be an array of strings"
                            ))
                        })?;
                        Template::parse(raw, &format!("{ctx}.headers.{name}"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                headers.insert(name.clone(), templates);
            }
        }
        Ok(EndpointTemplate {
            url,
            properties,
            headers,
        })
    }
}

/// One node of the rule tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Rule {
    /// Terminal success: construct and return an endpoint.
    Endpoint {
        conditions: Vec<Condition>,
        endpoint: EndpointTemplate,
    },
    /// Terminal failure with a rendered message.
    Error {
        conditions: Vec<Condition>,
        message: Template,
    },
    /// Descend into child rules; if none of them match, this rule is treated
    /// as not-matched and evaluation moves on to its siblings.
    Tree {
        conditions: Vec<Condition>,
        rules: Vec<Rule>,
    },
}

impl Rule {
    pub(crate) fn conditions(&self) -> &[Condition] {
        match self {
            Rule::Endpoint { conditions, .. }
            | Rule::Error { conditions, .. }
            | Rule::Tree { conditions, .. } => conditions,
        }
    }

    fn from_json(json: &Json, ctx: &str) -> Result<Self, InvalidRuleSetError> {
        let map = json
            .as_object()
            .ok_or_else(|| InvalidRuleSetError::new(format!("{ctx}: rule must be an object")))?;
        let rule_type = map
            .get("type")
            .and_then(Json::as_str)
            .ok_or_else(|| InvalidRuleSetError::new(format!("{ctx}: rule is missing `type`")))?;
        let conditions = Condition::list_from_json(map.get("conditions"), ctx)?;
        match rule_type {
            "endpoint" => {
                let endpoint = map.get("endpoint").ok_or_else(|| {
                    InvalidRuleSetError::new(format!("{ctx}: endpoint rule is missing `endpoint`"))
                })?;
                Ok(Rule::Endpoint {
                    conditions,
                    endpoint: EndpointTemplate::from_json(endpoint, &format!("{ctx}.endpoint"))?,
                })
            }
            "error" => {
                let message = map
                    .get("error")
                    .and_then(Json::as_str)
                    .ok_or_else(|| {
                        InvalidRuleSetError::new(format!(
                            "{ctx}: error rule is missing a string `error`"
                        ))
                    })?;
                Ok(Rule::Error {
                    conditions,
                    message: Template::parse(message, &format!("{ctx}.error"))?,
                })
            }
            "tree" => {
                let rules = map
                    .get("rules")
                    .and_then(Json::as_array)
                    .ok_or_else(|| {
                        InvalidRuleSetError::new(format!("{ctx}: tree rule is missing `rules`"))
                    })?;
                let rules = rules
                    .iter()
                    .enumerate()
                    .map(|(ix, rule)| Rule::from_json(rule, &format!("{ctx}.rules[{ix}]")))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Rule::Tree { conditions, rules })
            }
            other => Err(InvalidRuleSetError::new(format!(
                "{ctx}: unrecognized rule type `{other}`"
            ))),
        }
    }
}

/// A loaded, validated endpoint ruleset.
///
/// Construct with [`RuleSet::from_json_str`] and evaluate with
/// [`resolve_endpoint`](RuleSet::resolve_endpoint).
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub(crate) version: String,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) rules: Vec<Rule>,
}

impl RuleSet {
    /// Load and validate a ruleset from its JSON document form.
    pub fn from_json_str(raw: &str) -> Result<Self, InvalidRuleSetError> {
        let json: Json = serde_json::from_str(raw)
            .map_err(|err| InvalidRuleSetError::new(format!("document is not valid JSON: {err}")))?;
        Self::from_json(&json)
    }

    /// Load and validate a ruleset from an already-parsed JSON document.
    pub fn from_json(json: &Json) -> Result<Self, InvalidRuleSetError> {
        let map = json
            .as_object()
            .ok_or_else(|| InvalidRuleSetError::new("ruleset must be an object"))?;
        let version = map
            .get("version")
            .and_then(Json::as_str)
            .unwrap_or("1.0")
            .to_string();
        let parameters = map
            .get("parameters")
            .and_then(Json::as_object)
            .ok_or_else(|| InvalidRuleSetError::new("ruleset is missing a `parameters` object"))?
            .iter()
            .map(|(name, json)| Parameter::from_json(name, json))
            .collect::<Result<Vec<_>, _>>()?;
        let rules = map
            .get("rules")
            .and_then(Json::as_array)
            .ok_or_else(|| InvalidRuleSetError::new("ruleset is missing a `rules` array"))?
            .iter()
            .enumerate()
            .map(|(ix, rule)| Rule::from_json(rule, &format!("rules[{ix}]")))
            .collect::<Result<Vec<_>, _>>()?;
        let ruleset = RuleSet {
            version,
            parameters,
            rules,
        };
        validate::validate_ruleset(&ruleset)?;
        Ok(ruleset)
    }

    /// The ruleset's declared version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The declared parameters.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }
}
