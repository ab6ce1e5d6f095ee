/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Rule-tree evaluation.
//!
//! Evaluation is a deterministic, side-effect-free walk: for each rule at a
//! level, conditions run in order against the current scope (short-circuiting
//! on the first failure); when all pass, an endpoint rule terminates with an
//! endpoint, an error rule terminates with its rendered message, and a tree
//! rule recurses. A tree rule whose children all fail to match is itself
//! not-matched — evaluation falls through to its next sibling, never hard
//! stops. Only root-level exhaustion produces the reserved
//! [`NoRulesMatched`](ResolveEndpointError::NoRulesMatched) outcome.

use crate::endpoint::{Endpoint, ResolveEndpointError};
use crate::endpoint_lib::diagnostic::DiagnosticCollector;
use crate::endpoint_lib::partition::PartitionResolver;
use crate::endpoint_lib::{host, parse_url, split, substring, uri_encode};
use crate::expr::{Expression, Literal, Path, PathSegment, Template, TemplatePart, Value};
use crate::ruleset::{Condition, Rule, RuleSet};
use std::collections::HashMap;
use tracing::trace;

/// Per-invocation parameter bindings.
///
/// ```
/// use aws_smithy_endpoint_rules::Params;
/// let params = Params::builder()
///     .set("Region", "us-east-1")
///     .set("UseFIPS", false)
///     .build();
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: HashMap<String, Value>,
}

impl Params {
    /// Builder for [`Params`].
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::default()
    }

    /// The value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Builder for [`Params`].
#[derive(Debug, Clone, Default)]
pub struct ParamsBuilder {
    values: HashMap<String, Value>,
}

impl ParamsBuilder {
    /// Bind `name` to `value`.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Bind `name` to `value` when present; `None` leaves the name unbound
    /// (which is not the same as binding [`Value::None`]).
    pub fn set_opt(mut self, name: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.values.insert(name.into(), value.into());
        }
        self
    }

    /// Build the [`Params`].
    pub fn build(self) -> Params {
        Params {
            values: self.values,
        }
    }
}

/// Name bindings visible during evaluation, as a chain of frames.
///
/// Lookups resolve innermost-first. Each rule pushes a frame on entry and
/// pops it on exit, so condition-bound names are visible to the rest of that
/// rule and its descendants but never to sibling rules.
#[derive(Debug)]
struct Scope {
    frames: Vec<HashMap<String, Value>>,
}

impl Scope {
    fn new(root: HashMap<String, Value>) -> Self {
        Self { frames: vec![root] }
    }

    fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.frames.pop().expect("push/pop are paired");
    }

    fn bind(&mut self, name: String, value: Value) {
        self.frames
            .last_mut()
            .expect("scope always has a root frame")
            .insert(name, value);
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

/// The result of evaluating one level of the rule tree.
enum Outcome {
    Endpoint(Endpoint),
    Error(String),
    NotMatched,
}

impl RuleSet {
    /// Resolve an endpoint using the partition metadata bundled with this
    /// crate.
    ///
    /// This parses the bundled metadata on every call; hosts resolving
    /// repeatedly should construct a [`PartitionResolver`] once and use
    /// [`resolve_endpoint_with_partitions`](RuleSet::resolve_endpoint_with_partitions).
    pub fn resolve_endpoint(&self, params: &Params) -> Result<Endpoint, ResolveEndpointError> {
        self.resolve_endpoint_with_partitions(params, &PartitionResolver::default_partitions())
    }

    /// Resolve an endpoint against explicitly-provided partition metadata.
    pub fn resolve_endpoint_with_partitions(
        &self,
        params: &Params,
        partitions: &PartitionResolver,
    ) -> Result<Endpoint, ResolveEndpointError> {
        let bindings = self.bind_params(params)?;
        let mut evaluator = Evaluator {
            partitions,
            scope: Scope::new(bindings),
            diagnostics: DiagnosticCollector::new(),
        };
        trace!("resolving endpoint from ruleset");
        match evaluator.eval_rule_list(&self.rules)? {
            Outcome::Endpoint(endpoint) => {
                trace!(url = %endpoint.url(), "resolved endpoint");
                Ok(endpoint)
            }
            Outcome::Error(message) => Err(ResolveEndpointError::RuleError { message }),
            Outcome::NotMatched => Err(ResolveEndpointError::NoRulesMatched {
                context: evaluator
                    .diagnostics
                    .take_last_error()
                    .map(|err| err.to_string()),
            }),
        }
    }

    /// Check the bindings against the declared parameters and produce the
    /// root frame: every declared parameter is bound, to its value, its
    /// default, or `None`.
    fn bind_params(
        &self,
        params: &Params,
    ) -> Result<HashMap<String, Value>, ResolveEndpointError> {
        for name in params.names() {
            if self.parameter(name).is_none() {
                return Err(ResolveEndpointError::invalid_params(format!(
                    "no parameter named `{name}` is declared"
                )));
            }
        }
        let mut bindings = HashMap::new();
        for parameter in self.parameters() {
            let value = params
                .get(parameter.name())
                .cloned()
                .or_else(|| parameter.default().cloned())
                .unwrap_or(Value::None);
            if !value.is_none() && !parameter.parameter_type().matches(&value) {
                return Err(ResolveEndpointError::invalid_params(format!(
                    "parameter `{}` must be a {}, got {}",
                    parameter.name(),
                    parameter.parameter_type(),
                    value.type_name()
                )));
            }
            if parameter.required() && value.is_none() {
                return Err(ResolveEndpointError::invalid_params(format!(
                    "a required parameter was not set: `{}`",
                    parameter.name()
                )));
            }
            bindings.insert(parameter.name().to_string(), value);
        }
        Ok(bindings)
    }
}

struct Evaluator<'a> {
    partitions: &'a PartitionResolver,
    scope: Scope,
    diagnostics: DiagnosticCollector,
}

impl Evaluator<'_> {
    fn eval_rule_list(&mut self, rules: &[Rule]) -> Result<Outcome, ResolveEndpointError> {
        for rule in rules {
            self.scope.push();
            let matched = self.eval_conditions(rule.conditions())?;
            if !matched {
                self.scope.pop();
                continue;
            }
            let outcome = match rule {
                Rule::Endpoint { endpoint, .. } => Outcome::Endpoint(self.build_endpoint(endpoint)?),
                Rule::Error { message, .. } => Outcome::Error(self.render(message)?),
                Rule::Tree { rules, .. } => self.eval_rule_list(rules)?,
            };
            self.scope.pop();
            match outcome {
                // an exhausted tree rule is not a hard stop; keep trying siblings
                Outcome::NotMatched => continue,
                terminal => return Ok(terminal),
            }
        }
        Ok(Outcome::NotMatched)
    }

    /// Evaluate a rule's conditions in order. The first falsy result wins:
    /// later conditions are never evaluated.
    fn eval_conditions(&mut self, conditions: &[Condition]) -> Result<bool, ResolveEndpointError> {
        for condition in conditions {
            let value = self.eval_expr(&condition.expr)?;
            if !value.is_truthy() {
                return Ok(false);
            }
            if let Some(name) = &condition.assign {
                self.scope.bind(name.clone(), value);
            }
        }
        Ok(true)
    }

    fn eval_expr(&mut self, expr: &Expression) -> Result<Value, ResolveEndpointError> {
        match expr {
            Expression::Literal(literal) => self.eval_literal(literal),
            Expression::Reference(name) => match self.scope.get(name) {
                Some(value) => Ok(value.clone()),
                None => Err(ResolveEndpointError::evaluation(format!(
                    "reference to undefined name `{name}`"
                ))),
            },
            Expression::GetAttr { target, path } => {
                let target = self.eval_expr(target)?;
                get_attr(&target, path)
            }
            Expression::Call { function, argv } => {
                // arguments evaluate strictly left to right
                let args = argv
                    .iter()
                    .map(|arg| self.eval_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.eval_call(function, args)
            }
            Expression::Template(template) => Ok(Value::String(self.render(template)?)),
        }
    }

    fn eval_literal(&mut self, literal: &Literal) -> Result<Value, ResolveEndpointError> {
        match literal {
            Literal::Bool(b) => Ok(Value::Bool(*b)),
            Literal::Integer(i) => Ok(Value::Integer(*i)),
            Literal::String(template) => Ok(Value::String(self.render(template)?)),
            Literal::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.eval_literal(item))
                    .collect::<Result<_, _>>()?,
            )),
            Literal::Object(map) => {
                let mut object = HashMap::new();
                for (key, value) in map {
                    object.insert(key.clone(), self.eval_literal(value)?);
                }
                Ok(Value::Object(object))
            }
        }
    }

    /// Render a template: literal fragments pass through untouched, dynamic
    /// segments must evaluate to strings.
    fn render(&mut self, template: &Template) -> Result<String, ResolveEndpointError> {
        let mut out = String::new();
        for part in &template.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Dynamic(expr) => match self.eval_expr(expr)? {
                    Value::String(s) => out.push_str(&s),
                    other => {
                        return Err(ResolveEndpointError::evaluation(format!(
                            "template segments must evaluate to strings, got {}",
                            other.type_name()
                        )))
                    }
                },
            }
        }
        Ok(out)
    }

    fn build_endpoint(
        &mut self,
        endpoint: &crate::ruleset::EndpointTemplate,
    ) -> Result<Endpoint, ResolveEndpointError> {
        let url = match self.eval_expr(&endpoint.url)? {
            Value::String(url) => url,
            other => {
                return Err(ResolveEndpointError::evaluation(format!(
                    "endpoint url must evaluate to a string, got {}",
                    other.type_name()
                )))
            }
        };
        let mut builder = Endpoint::builder().url(url);
        for (name, literal) in &endpoint.properties {
            let value = self.eval_literal(literal)?;
            builder = builder.property(name.clone(), value.into_document());
        }
        for (name, templates) in &endpoint.headers {
            for template in templates {
                let value = self.render(template)?;
                builder = builder.header(name.clone(), value);
            }
        }
        Ok(builder.build())
    }

    fn eval_call(
        &mut self,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, ResolveEndpointError> {
        check_arity(function, args.len())?;
        match function {
            "isSet" => Ok(Value::Bool(!args[0].is_none())),
            "not" => Ok(Value::Bool(!expect_bool(function, &args, 0)?)),
            "stringEquals" => Ok(Value::Bool(
                expect_string(function, &args, 0)? == expect_string(function, &args, 1)?,
            )),
            "booleanEquals" => Ok(Value::Bool(
                expect_bool(function, &args, 0)? == expect_bool(function, &args, 1)?,
            )),
            "substring" => {
                let input = expect_string(function, &args, 0)?;
                let start = expect_index(function, &args, 1)?;
                let stop = expect_index(function, &args, 2)?;
                let reverse = expect_bool(function, &args, 3)?;
                Ok(
                    match substring::substring(input, start, stop, reverse, &mut self.diagnostics)
                    {
                        Some(s) => Value::String(s.to_string()),
                        None => Value::None,
                    },
                )
            }
            "uriEncode" => Ok(Value::String(
                uri_encode::uri_encode(expect_string(function, &args, 0)?).into_owned(),
            )),
            "parseURL" => {
                let raw = expect_string(function, &args, 0)?;
                Ok(match parse_url::parse_url(raw, &mut self.diagnostics) {
                    Some(url) => {
                        let mut object = HashMap::new();
                        object.insert("scheme".to_string(), Value::String(url.scheme().into()));
                        object.insert(
                            "authority".to_string(),
                            Value::String(url.authority().into()),
                        );
                        object.insert("path".to_string(), Value::String(url.path().into()));
                        object.insert(
                            "normalizedPath".to_string(),
                            Value::String(url.normalized_path().into()),
                        );
                        object.insert("isIp".to_string(), Value::Bool(url.is_ip()));
                        Value::Object(object)
                    }
                    None => Value::None,
                })
            }
            "isValidHostLabel" => {
                let label = expect_string(function, &args, 0)?;
                let allow_dots = expect_bool(function, &args, 1)?;
                Ok(Value::Bool(host::is_valid_host_label(
                    label,
                    allow_dots,
                    &mut self.diagnostics,
                )))
            }
            "split" => {
                let input = expect_string(function, &args, 0)?;
                let delimiter = expect_string(function, &args, 1)?;
                let limit = expect_index(function, &args, 2)?;
                Ok(Value::Array(
                    split::split(input, delimiter, limit)
                        .into_iter()
                        .map(|part| Value::String(part.to_string()))
                        .collect(),
                ))
            }
            "aws.partition" | "partition" => {
                let region = expect_string(function, &args, 0)?;
                let partition = self.partitions.resolve_partition(region);
                let mut object = HashMap::new();
                object.insert("name".to_string(), Value::String(partition.name().into()));
                object.insert(
                    "dnsSuffix".to_string(),
                    Value::String(partition.dns_suffix().into()),
                );
                object.insert(
                    "dualStackDnsSuffix".to_string(),
                    Value::String(partition.dual_stack_dns_suffix().into()),
                );
                object.insert(
                    "supportsFIPS".to_string(),
                    Value::Bool(partition.supports_fips()),
                );
                object.insert(
                    "supportsDualStack".to_string(),
                    Value::Bool(partition.supports_dual_stack()),
                );
                object.insert(
                    "implicitGlobalRegion".to_string(),
                    Value::String(partition.implicit_global_region().into()),
                );
                Ok(Value::Object(object))
            }
            other => Err(ResolveEndpointError::evaluation(format!(
                "call to unknown function `{other}`"
            ))),
        }
    }
}

/// Attribute access. Present keys/indexes yield their value; a missing key
/// or out-of-range index yields `None` (branchable via `isSet`); pathing
/// into a non-object/non-array is an evaluation defect.
fn get_attr(target: &Value, path: &Path) -> Result<Value, ResolveEndpointError> {
    let mut current = target;
    for segment in &path.segments {
        match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => match map.get(key) {
                Some(value) => current = value,
                None => return Ok(Value::None),
            },
            (PathSegment::Index(index), Value::Array(items)) => match items.get(*index) {
                Some(value) => current = value,
                None => return Ok(Value::None),
            },
            (PathSegment::Key(key), other) => {
                return Err(ResolveEndpointError::evaluation(format!(
                    "cannot access `{key}` on a {}",
                    other.type_name()
                )))
            }
            (PathSegment::Index(index), other) => {
                return Err(ResolveEndpointError::evaluation(format!(
                    "cannot index [{index}] into a {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(current.clone())
}

/// Number of arguments each builtin takes. `None` for unknown functions;
/// `getAttr` never reaches dispatch (it is folded into the AST at load).
pub(crate) fn builtin_arity(function: &str) -> Option<usize> {
    match function {
        "isSet" | "not" | "uriEncode" | "parseURL" | "aws.partition" | "partition" => Some(1),
        "stringEquals" | "booleanEquals" | "isValidHostLabel" => Some(2),
        "split" => Some(3),
        "substring" => Some(4),
        "getAttr" => Some(2),
        _ => None,
    }
}

fn check_arity(function: &str, given: usize) -> Result<(), ResolveEndpointError> {
    match builtin_arity(function) {
        Some(expected) if expected != given => Err(ResolveEndpointError::evaluation(format!(
            "`{function}` takes {expected} arguments, got {given}"
        ))),
        _ => Ok(()),
    }
}

fn expect_string<'a>(
    function: &str,
    args: &'a [Value],
    ix: usize,
) -> Result<&'a str, ResolveEndpointError> {
    args[ix].as_str().ok_or_else(|| {
        ResolveEndpointError::evaluation(format!(
            "`{function}` expects a string for argument {ix}, got {}",
            args[ix].type_name()
        ))
    })
}

fn expect_bool(function: &str, args: &[Value], ix: usize) -> Result<bool, ResolveEndpointError> {
    args[ix].as_bool().ok_or_else(|| {
        ResolveEndpointError::evaluation(format!(
            "`{function}` expects a boolean for argument {ix}, got {}",
            args[ix].type_name()
        ))
    })
}

fn expect_index(function: &str, args: &[Value], ix: usize) -> Result<usize, ResolveEndpointError> {
    let int = args[ix].as_integer().ok_or_else(|| {
        ResolveEndpointError::evaluation(format!(
            "`{function}` expects an integer for argument {ix}, got {}",
            args[ix].type_name()
        ))
    })?;
    usize::try_from(int).map_err(|_| {
        ResolveEndpointError::evaluation(format!(
            "`{function}` expects a non-negative integer for argument {ix}, got {int}"
        ))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn ruleset(raw: &str) -> RuleSet {
        RuleSet::from_json_str(raw).expect("valid ruleset")
    }

    fn resolve(rules: &RuleSet, params: Params) -> Result<Endpoint, ResolveEndpointError> {
        rules.resolve_endpoint(&params)
    }

    #[test]
    fn defaults_are_applied() {
        let rules = ruleset(
            r#"{
                "parameters": {
                    "UseFIPS": {"type": "Boolean", "required": true, "default": false},
                    "Region": {"type": "String", "required": true}
                },
                "rules": [
                    {
                        "type": "endpoint",
                        "conditions": [{"fn": "booleanEquals", "argv": [{"ref": "UseFIPS"}, true]}],
                        "endpoint": {"url": "https://svc-fips.{Region}.example.com"}
                    },
                    {
                        "type": "endpoint",
                        "conditions": [],
                        "endpoint": {"url": "https://svc.{Region}.example.com"}
                    }
                ]
            }"#,
        );
        let endpoint = resolve(&rules, Params::builder().set("Region", "us-east-1").build()).unwrap();
        assert_eq!(endpoint.url(), "https://svc.us-east-1.example.com");
        let endpoint = resolve(
            &rules,
            Params::builder()
                .set("Region", "us-east-1")
                .set("UseFIPS", true)
                .build(),
        )
        .unwrap();
        assert_eq!(endpoint.url(), "https://svc-fips.us-east-1.example.com");
    }

    #[test]
    fn missing_required_parameter_is_a_bind_error() {
        let rules = ruleset(
            r#"{
                "parameters": {"Region": {"type": "String", "required": true}},
                "rules": [{"type": "endpoint", "conditions": [], "endpoint": {"url": "https://{Region}.example.com"}}]
            }"#,
        );
        let err = resolve(&rules, Params::builder().build()).unwrap_err();
        assert!(
            matches!(&err, ResolveEndpointError::InvalidParams { .. }),
            "expected InvalidParams, got {err:?}"
        );
    }

    #[test]
    fn unknown_parameter_binding_is_rejected() {
        let rules = ruleset(
            r#"{
                "parameters": {"Region": {"type": "String"}},
                "rules": [{"type": "endpoint", "conditions": [], "endpoint": {"url": "https://example.com"}}]
            }"#,
        );
        let err = resolve(&rules, Params::builder().set("Regoin", "us-east-1").build()).unwrap_err();
        assert!(
            matches!(&err, ResolveEndpointError::InvalidParams { .. }),
            "expected InvalidParams, got {err:?}"
        );
    }

    #[test]
    fn wrongly_typed_binding_is_rejected() {
        let rules = ruleset(
            r#"{
                "parameters": {"Region": {"type": "String"}},
                "rules": [{"type": "endpoint", "conditions": [], "endpoint": {"url": "https://example.com"}}]
            }"#,
        );
        let err = resolve(&rules, Params::builder().set("Region", true).build()).unwrap_err();
        assert!(
            matches!(&err, ResolveEndpointError::InvalidParams { .. }),
            "expected InvalidParams, got {err:?}"
        );
    }

    #[test]
    fn error_rules_render_their_message() {
        let rules = ruleset(
            r#"{
                "parameters": {"Region": {"type": "String", "required": true}},
                "rules": [{"type": "error", "conditions": [], "error": "unsupported region {Region}"}]
            }"#,
        );
        let err = resolve(&rules, Params::builder().set("Region", "us-moon-7").build()).unwrap_err();
        match err {
            ResolveEndpointError::RuleError { message } => {
                assert_eq!(message, "unsupported region us-moon-7")
            }
            other => panic!("expected RuleError, got {other:?}"),
        }
    }

    #[test]
    fn sibling_rules_do_not_see_each_others_bindings() {
        // Rule 1 binds `url` but then fails on its second condition; rule 2
        // referencing `url` must hit an undefined name, proving the binding
        // did not leak. Load-time validation rejects such a ruleset outright,
        // so the rule tree is built by hand here.
        use crate::ruleset::{Condition, EndpointTemplate};

        fn tmpl(raw: &str) -> Expression {
            Expression::Template(Template::parse(raw, "test").unwrap())
        }
        fn call(function: &str, argv: Vec<Expression>) -> Expression {
            Expression::Call {
                function: function.to_string(),
                argv,
            }
        }
        fn endpoint(url: &str) -> EndpointTemplate {
            EndpointTemplate {
                url: tmpl(url),
                properties: HashMap::new(),
                headers: HashMap::new(),
            }
        }

        let rules = RuleSet {
            version: "1.0".to_string(),
            parameters: Vec::new(),
            rules: vec![
                Rule::Endpoint {
                    conditions: vec![
                        Condition {
                            expr: call("parseURL", vec![tmpl("https://custom.example.com")]),
                            assign: Some("url".to_string()),
                        },
                        Condition {
                            expr: call("stringEquals", vec![tmpl("a"), tmpl("b")]),
                            assign: None,
                        },
                    ],
                    endpoint: endpoint("https://never.example.com"),
                },
                Rule::Endpoint {
                    conditions: vec![Condition {
                        expr: call("isSet", vec![Expression::Reference("url".to_string())]),
                        assign: None,
                    }],
                    endpoint: endpoint("https://leaked.example.com"),
                },
            ],
        };
        let err = resolve(&rules, Params::builder().build()).unwrap_err();
        match err {
            ResolveEndpointError::Evaluation { message } => {
                assert!(message.contains("undefined name `url`"), "{message}")
            }
            other => panic!("expected Evaluation error, got {other:?}"),
        }
    }

    #[test]
    fn conditions_short_circuit() {
        // The second condition would be a hard evaluation error (not takes a
        // boolean); it must never run because the first condition fails.
        let rules = ruleset(
            r#"{
                "parameters": {
                    "Region": {"type": "String", "required": true},
                    "Unset": {"type": "String"}
                },
                "rules": [
                    {
                        "type": "endpoint",
                        "conditions": [
                            {"fn": "isSet", "argv": [{"ref": "Unset"}]},
                            {"fn": "not", "argv": [{"ref": "Region"}]}
                        ],
                        "endpoint": {"url": "https://never.example.com"}
                    },
                    {
                        "type": "endpoint",
                        "conditions": [],
                        "endpoint": {"url": "https://{Region}.example.com"}
                    }
                ]
            }"#,
        );
        let endpoint = resolve(&rules, Params::builder().set("Region", "eu-west-1").build()).unwrap();
        assert_eq!(endpoint.url(), "https://eu-west-1.example.com");
    }

    #[test]
    fn exhausted_tree_rule_falls_through_to_its_sibling() {
        let rules = ruleset(
            r#"{
                "parameters": {
                    "Region": {"type": "String", "required": true},
                    "Unset": {"type": "String"}
                },
                "rules": [
                    {
                        "type": "tree",
                        "conditions": [{"fn": "isSet", "argv": [{"ref": "Region"}]}],
                        "rules": [
                            {
                                "type": "endpoint",
                                "conditions": [{"fn": "isSet", "argv": [{"ref": "Unset"}]}],
                                "endpoint": {"url": "https://inner.example.com"}
                            }
                        ]
                    },
                    {
                        "type": "endpoint",
                        "conditions": [],
                        "endpoint": {"url": "https://after-tree.example.com"}
                    }
                ]
            }"#,
        );
        let endpoint = resolve(&rules, Params::builder().set("Region", "us-east-1").build()).unwrap();
        assert_eq!(endpoint.url(), "https://after-tree.example.com");
    }

    #[test]
    fn root_exhaustion_is_no_rules_matched() {
        let rules = ruleset(
            r#"{
                "parameters": {"Unset": {"type": "String"}},
                "rules": [
                    {
                        "type": "endpoint",
                        "conditions": [{"fn": "isSet", "argv": [{"ref": "Unset"}]}],
                        "endpoint": {"url": "https://example.com"}
                    }
                ]
            }"#,
        );
        let err = resolve(&rules, Params::builder().build()).unwrap_err();
        assert!(
            matches!(&err, ResolveEndpointError::NoRulesMatched { .. }),
            "expected NoRulesMatched, got {err:?}"
        );
    }

    #[test]
    fn parse_url_binding_and_get_attr() {
        let rules = ruleset(
            r#"{
                "parameters": {"Endpoint": {"type": "String", "required": true}},
                "rules": [
                    {
                        "type": "endpoint",
                        "conditions": [
                            {"fn": "parseURL", "argv": [{"ref": "Endpoint"}], "assign": "url"},
                            {"fn": "isValidHostLabel", "argv": [{"fn": "getAttr", "argv": [{"ref": "url"}, "authority"]}, true]}
                        ],
                        "endpoint": {"url": "{url#scheme}://{url#authority}{url#normalizedPath}"}
                    },
                    {"type": "error", "conditions": [], "error": "invalid endpoint {Endpoint}"}
                ]
            }"#,
        );
        let endpoint = resolve(
            &rules,
            Params::builder().set("Endpoint", "https://custom.example.com/base").build(),
        )
        .unwrap();
        assert_eq!(endpoint.url(), "https://custom.example.com/base/");

        // unparseable input falls through to the error rule instead of crashing
        let err = resolve(
            &rules,
            Params::builder().set("Endpoint", "not a url at all").build(),
        )
        .unwrap_err();
        match err {
            ResolveEndpointError::RuleError { message } => {
                assert_eq!(message, "invalid endpoint not a url at all")
            }
            other => panic!("expected RuleError, got {other:?}"),
        }
    }

    #[test]
    fn partition_builtin_drives_dns_suffix() {
        let rules = ruleset(
            r#"{
                "parameters": {"Region": {"type": "String", "required": true}},
                "rules": [
                    {
                        "type": "endpoint",
                        "conditions": [
                            {"fn": "aws.partition", "argv": [{"ref": "Region"}], "assign": "PartitionResult"}
                        ],
                        "endpoint": {"url": "https://svc.{Region}.{PartitionResult#dnsSuffix}"}
                    }
                ]
            }"#,
        );
        let endpoint = resolve(&rules, Params::builder().set("Region", "cn-north-1").build()).unwrap();
        assert_eq!(endpoint.url(), "https://svc.cn-north-1.amazonaws.com.cn");
    }

    #[test]
    fn endpoint_properties_and_headers_render() {
        let rules = ruleset(
            r#"{
                "parameters": {"Region": {"type": "String", "required": true}},
                "rules": [
                    {
                        "type": "endpoint",
                        "conditions": [],
                        "endpoint": {
                            "url": "https://{Region}.example.com",
                            "properties": {
                                "authSchemes": [{"name": "sigv4", "signingRegion": "{Region}"}]
                            },
                            "headers": {"x-amz-region-set": ["{Region}", "*"]}
                        }
                    }
                ]
            }"#,
        );
        let endpoint = resolve(&rules, Params::builder().set("Region", "us-west-2").build()).unwrap();
        assert_eq!(
            endpoint.headers().get("x-amz-region-set"),
            Some(&vec!["us-west-2".to_string(), "*".to_string()])
        );
        use aws_smithy_types::Document;
        let schemes = endpoint.properties().get("authSchemes").unwrap();
        match schemes {
            Document::Array(schemes) => match &schemes[0] {
                Document::Object(scheme) => {
                    assert_eq!(scheme.get("name"), Some(&Document::String("sigv4".into())));
                    assert_eq!(
                        scheme.get("signingRegion"),
                        Some(&Document::String("us-west-2".into()))
                    );
                }
                other => panic!("expected object, got {other:?}"),
            },
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let rules = ruleset(
            r#"{
                "parameters": {"Region": {"type": "String", "required": true}},
                "rules": [
                    {
                        "type": "endpoint",
                        "conditions": [
                            {"fn": "aws.partition", "argv": [{"ref": "Region"}], "assign": "p"}
                        ],
                        "endpoint": {"url": "https://{Region}.{p#dnsSuffix}"}
                    }
                ]
            }"#,
        );
        let params = Params::builder().set("Region", "eu-central-1").build();
        let first = resolve(&rules, params.clone()).unwrap();
        let second = resolve(&rules, params).unwrap();
        assert_eq!(first, second);
    }
}
