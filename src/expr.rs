/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Expression and template ASTs plus the runtime value union.
//!
//! These are closed sum types: evaluation (`eval.rs`) and validation
//! (`validate.rs`) are each a single exhaustive match per node kind.

use crate::ruleset::InvalidRuleSetError;
use aws_smithy_types::{Document, Number};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fmt;

/// A value produced by evaluating an expression.
///
/// Types are fixed at creation; the evaluator never coerces. `Object` values
/// model the records produced by builtins like `parseURL` and
/// `aws.partition`, accessed via `getAttr` paths.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string.
    String(String),
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// An array of values.
    Array(Vec<Value>),
    /// A record keyed by attribute name.
    Object(HashMap<String, Value>),
    /// The absent value, e.g. an unset optional parameter or a builtin that
    /// could not produce a result.
    None,
}

impl Value {
    pub(crate) fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Truthiness for condition evaluation: everything but `false` and `None`.
    pub(crate) fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::None)
    }

    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub(crate) fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Name of this value's type, for error messages.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::None => "none",
        }
    }

    /// Convert into open content for endpoint properties.
    pub(crate) fn into_document(self) -> Document {
        match self {
            Value::String(s) => Document::String(s),
            Value::Bool(b) => Document::Bool(b),
            Value::Integer(i) if i >= 0 => Document::Number(Number::PosInt(i as u64)),
            Value::Integer(i) => Document::Number(Number::NegInt(i)),
            Value::Array(values) => {
                Document::Array(values.into_iter().map(Value::into_document).collect())
            }
            Value::Object(map) => Document::Object(
                map.into_iter().map(|(k, v)| (k, v.into_document())).collect(),
            ),
            Value::None => Document::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Array(values) => {
                write!(f, "[")?;
                for (ix, value) in values.iter().enumerate() {
                    if ix > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Object(_) => write!(f, "<object>"),
            Value::None => write!(f, "<none>"),
        }
    }
}

/// An expression in argument or URL position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expression {
    /// A literal (which may itself embed templates in string position).
    Literal(Literal),
    /// A reference to a parameter or condition-bound name.
    Reference(String),
    /// Attribute access on the result of another expression (`getAttr`).
    GetAttr { target: Box<Expression>, path: Path },
    /// A builtin function call.
    Call { function: String, argv: Vec<Expression> },
    /// A template string with dynamic segments.
    Template(Template),
}

impl Expression {
    /// Decode an expression from its JSON form.
    ///
    /// Strings are templates, objects are `{"ref": ...}` or
    /// `{"fn": ..., "argv": [...]}`, and `getAttr` calls are folded into
    /// [`Expression::GetAttr`] so the path parses at load time.
    pub(crate) fn from_json(json: &Json, ctx: &str) -> Result<Self, InvalidRuleSetError> {
        match json {
            Json::String(s) => Ok(Expression::Template(Template::parse(s, ctx)?)),
            Json::Bool(b) => Ok(Expression::Literal(Literal::Bool(*b))),
            Json::Number(n) => {
                let int = n.as_i64().ok_or_else(|| {
                    InvalidRuleSetError::new(format!("{ctx}: numeric literals must be integers"))
                })?;
                Ok(Expression::Literal(Literal::Integer(int)))
            }
            Json::Object(map) => {
                if let Some(reference) = map.get("ref") {
                    let name = reference.as_str().ok_or_else(|| {
                        InvalidRuleSetError::new(format!("{ctx}: `ref` must be a string"))
                    })?;
                    Ok(Expression::Reference(name.to_string()))
                } else if map.get("fn").is_some() {
                    Self::call_from_json(map, ctx)
                } else {
                    Err(InvalidRuleSetError::new(format!(
                        "{ctx}: expected an object with `ref` or `fn`"
                    )))
                }
            }
            other => Err(InvalidRuleSetError::new(format!(
                "{ctx}: unsupported expression: {other}"
            ))),
        }
    }

    pub(crate) fn call_from_json(
        map: &serde_json::Map<String, Json>,
        ctx: &str,
    ) -> Result<Self, InvalidRuleSetError> {
        let function = map
            .get("fn")
            .and_then(Json::as_str)
            .ok_or_else(|| InvalidRuleSetError::new(format!("{ctx}: `fn` must be a string")))?;
        let argv = map
            .get("argv")
            .and_then(Json::as_array)
            .ok_or_else(|| InvalidRuleSetError::new(format!("{ctx}: `argv` must be an array")))?;
        let args = argv
            .iter()
            .enumerate()
            .map(|(ix, arg)| Expression::from_json(arg, &format!("{ctx}.argv[{ix}]")))
            .collect::<Result<Vec<_>, _>>()?;
        if function == "getAttr" {
            if args.len() != 2 {
                return Err(InvalidRuleSetError::new(format!(
                    "{ctx}: getAttr takes exactly 2 arguments"
                )));
            }
            let mut args = args;
            let path_expr = args.pop().expect("length checked");
            let target = args.pop().expect("length checked");
            let path = match path_expr {
                Expression::Template(template) => match template.as_static() {
                    Some(text) => Path::parse(text, ctx)?,
                    None => {
                        return Err(InvalidRuleSetError::new(format!(
                            "{ctx}: getAttr path must be a literal string"
                        )))
                    }
                },
                _ => {
                    return Err(InvalidRuleSetError::new(format!(
                        "{ctx}: getAttr path must be a literal string"
                    )))
                }
            };
            Ok(Expression::GetAttr {
                target: Box::new(target),
                path,
            })
        } else {
            Ok(Expression::Call {
                function: function.to_string(),
                argv: args,
            })
        }
    }
}

/// A literal as it appears in endpoint `properties` and argument position.
/// Strings are templates: `{"authSchemes": [{"signingRegion": "{Region}"}]}`
/// renders against the environment at resolution time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Bool(bool),
    Integer(i64),
    String(Template),
    Array(Vec<Literal>),
    Object(HashMap<String, Literal>),
}

impl Literal {
    pub(crate) fn from_json(json: &Json, ctx: &str) -> Result<Self, InvalidRuleSetError> {
        match json {
            Json::Bool(b) => Ok(Literal::Bool(*b)),
            Json::Number(n) => {
                let int = n.as_i64().ok_or_else(|| {
                    InvalidRuleSetError::new(format!("{ctx}: numeric literals must be integers"))
                })?;
                Ok(Literal::Integer(int))
            }
            Json::String(s) => Ok(Literal::String(Template::parse(s, ctx)?)),
            Json::Array(items) => Ok(Literal::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(ix, item)| Literal::from_json(item, &format!("{ctx}[{ix}]")))
                    .collect::<Result<_, _>>()?,
            )),
            Json::Object(map) => Ok(Literal::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), Literal::from_json(v, &format!("{ctx}.{k}"))?)))
                    .collect::<Result<_, InvalidRuleSetError>>()?,
            )),
            Json::Null => Err(InvalidRuleSetError::new(format!(
                "{ctx}: null literals are not allowed"
            ))),
        }
    }
}

/// A string template: literal fragments interleaved with dynamic segments.
///
/// `{Region}` references a name, `{url#authority}` accesses an attribute of
/// a bound record, and `{{`/`}}` escape literal braces.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Template {
    pub(crate) parts: Vec<TemplatePart>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TemplatePart {
    Literal(String),
    Dynamic(Expression),
}

impl Template {
    pub(crate) fn parse(raw: &str, ctx: &str) -> Result<Self, InvalidRuleSetError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut segment = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => segment.push(c),
                            None => {
                                return Err(InvalidRuleSetError::new(format!(
                                    "{ctx}: unclosed `{{` in template `{raw}`"
                                )))
                            }
                        }
                    }
                    if segment.is_empty() {
                        return Err(InvalidRuleSetError::new(format!(
                            "{ctx}: empty `{{}}` in template `{raw}`"
                        )));
                    }
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(TemplatePart::Dynamic(Self::parse_segment(&segment, ctx)?));
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }
        Ok(Template { parts })
    }

    /// `{name}` or `{name#attr.path}` shorthand inside a template.
    fn parse_segment(segment: &str, ctx: &str) -> Result<Expression, InvalidRuleSetError> {
        match segment.split_once('#') {
            Some((name, path)) => Ok(Expression::GetAttr {
                target: Box::new(Expression::Reference(name.to_string())),
                path: Path::parse(path, ctx)?,
            }),
            None => Ok(Expression::Reference(segment.to_string())),
        }
    }

    /// The template's text when it contains no dynamic segments.
    pub(crate) fn as_static(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [] => Some(""),
            [TemplatePart::Literal(text)] => Some(text),
            _ => None,
        }
    }
}

/// An attribute path for `getAttr`: dot-separated keys with optional
/// `[index]` suffixes, e.g. `parts[0]` or `outputs.dnsSuffix`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Path {
    pub(crate) segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathSegment {
    Key(String),
    Index(usize),
}

impl Path {
    pub(crate) fn parse(raw: &str, ctx: &str) -> Result<Self, InvalidRuleSetError> {
        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (key, indexes) = match part.split_once('[') {
                Some((key, rest)) => (key, Some(rest)),
                None => (part, None),
            };
            if key.is_empty() && indexes.is_none() {
                return Err(InvalidRuleSetError::new(format!(
                    "{ctx}: empty segment in attribute path `{raw}`"
                )));
            }
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }
            if let Some(indexes) = indexes {
                let index = indexes.strip_suffix(']').ok_or_else(|| {
                    InvalidRuleSetError::new(format!("{ctx}: unclosed `[` in path `{raw}`"))
                })?;
                let index = index.parse::<usize>().map_err(|_| {
                    InvalidRuleSetError::new(format!("{ctx}: invalid index in path `{raw}`"))
                })?;
                segments.push(PathSegment::Index(index));
            }
        }
        Ok(Path { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ix, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if ix > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn template(raw: &str) -> Template {
        Template::parse(raw, "test").expect("valid template")
    }

    #[test]
    fn literal_only_template() {
        assert_eq!(template("https://example.com").as_static(), Some("https://example.com"));
    }

    #[test]
    fn brace_escapes() {
        assert_eq!(template("{{literal}}").as_static(), Some("{literal}"));
    }

    #[test]
    fn multipart_template() {
        let t = template("https://{Region}.{Service}.example.com");
        assert_eq!(
            t.parts,
            vec![
                TemplatePart::Literal("https://".to_string()),
                TemplatePart::Dynamic(Expression::Reference("Region".to_string())),
                TemplatePart::Literal(".".to_string()),
                TemplatePart::Dynamic(Expression::Reference("Service".to_string())),
                TemplatePart::Literal(".example.com".to_string()),
            ]
        );
    }

    #[test]
    fn shorthand_get_attr() {
        let t = template("{url#authority}");
        assert_eq!(
            t.parts,
            vec![TemplatePart::Dynamic(Expression::GetAttr {
                target: Box::new(Expression::Reference("url".to_string())),
                path: Path::parse("authority", "test").unwrap(),
            })]
        );
    }

    #[test]
    fn unclosed_brace_is_rejected() {
        let err = Template::parse("https://{Region", "test").unwrap_err();
        assert!(err.to_string().contains("unclosed"), "{err}");
    }

    #[test]
    fn path_with_index() {
        assert_eq!(
            Path::parse("parts[0]", "test").unwrap().segments,
            vec![
                PathSegment::Key("parts".to_string()),
                PathSegment::Index(0)
            ]
        );
    }

    #[test]
    fn get_attr_folds_at_decode_time() {
        let json: Json = serde_json::json!({
            "fn": "getAttr",
            "argv": [{"ref": "PartitionResult"}, "name"]
        });
        let expr = Expression::from_json(&json, "test").unwrap();
        assert_eq!(
            expr,
            Expression::GetAttr {
                target: Box::new(Expression::Reference("PartitionResult".to_string())),
                path: Path::parse("name", "test").unwrap(),
            }
        );
    }

    #[test]
    fn display_joins_path_segments() {
        let path = Path::parse("outputs.regions[3]", "test").unwrap();
        assert_eq!(path.to_string(), "outputs.regions[3]");
    }
}
