/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Load-time static checking of a decoded ruleset.
//!
//! Mirrors the runtime scope discipline: a reference must resolve to a
//! declared parameter or to an `assign` bound earlier in the same rule or in
//! an ancestor tree rule. Unknown functions and wrong arities are also
//! rejected here so they can never surface mid-resolution.

use crate::eval::builtin_arity;
use crate::expr::{Expression, Literal, Template, TemplatePart};
use crate::ruleset::{InvalidRuleSetError, Rule, RuleSet};
use std::collections::HashSet;

pub(crate) fn validate_ruleset(ruleset: &RuleSet) -> Result<(), InvalidRuleSetError> {
    let params = ruleset
        .parameters
        .iter()
        .map(|p| p.name().to_string())
        .collect::<HashSet<_>>();
    let mut scope = vec![params];
    validate_rules(&ruleset.rules, &mut scope)
}

fn validate_rules(
    rules: &[Rule],
    scope: &mut Vec<HashSet<String>>,
) -> Result<(), InvalidRuleSetError> {
    for rule in rules {
        scope.push(HashSet::new());
        for condition in rule.conditions() {
            validate_expr(&condition.expr, scope)?;
            if let Some(assign) = &condition.assign {
                scope
                    .last_mut()
                    .expect("frame pushed above")
                    .insert(assign.clone());
            }
        }
        match rule {
            Rule::Endpoint { endpoint, .. } => {
                validate_expr(&endpoint.url, scope)?;
                for literal in endpoint.properties.values() {
                    validate_literal(literal, scope)?;
                }
                for templates in endpoint.headers.values() {
                    for template in templates {
                        validate_template(template, scope)?;
                    }
                }
            }
            Rule::Error { message, .. } => validate_template(message, scope)?,
            Rule::Tree { rules, .. } => validate_rules(rules, scope)?,
        }
        scope.pop();
    }
    Ok(())
}

fn validate_expr(
    expr: &Expression,
    scope: &[HashSet<String>],
) -> Result<(), InvalidRuleSetError> {
    match expr {
        Expression::Literal(literal) => validate_literal(literal, scope),
        Expression::Reference(name) => {
            if scope.iter().any(|frame| frame.contains(name)) {
                Ok(())
            } else {
                Err(InvalidRuleSetError::new(format!(
                    "reference to `{name}` cannot be resolved from this rule"
                )))
            }
        }
        Expression::GetAttr { target, .. } => validate_expr(target, scope),
        Expression::Call { function, argv } => {
            let arity = builtin_arity(function).ok_or_else(|| {
                InvalidRuleSetError::new(format!("call to unknown function `{function}`"))
            })?;
            if argv.len() != arity {
                return Err(InvalidRuleSetError::new(format!(
                    "`{function}` takes {arity} arguments, got {}",
                    argv.len()
                )));
            }
            argv.iter().try_for_each(|arg| validate_expr(arg, scope))
        }
        Expression::Template(template) => validate_template(template, scope),
    }
}

fn validate_template(
    template: &Template,
    scope: &[HashSet<String>],
) -> Result<(), InvalidRuleSetError> {
    for part in &template.parts {
        if let TemplatePart::Dynamic(expr) = part {
            validate_expr(expr, scope)?;
        }
    }
    Ok(())
}

fn validate_literal(
    literal: &Literal,
    scope: &[HashSet<String>],
) -> Result<(), InvalidRuleSetError> {
    match literal {
        Literal::Bool(_) | Literal::Integer(_) => Ok(()),
        Literal::String(template) => validate_template(template, scope),
        Literal::Array(items) => items
            .iter()
            .try_for_each(|item| validate_literal(item, scope)),
        Literal::Object(map) => map
            .values()
            .try_for_each(|value| validate_literal(value, scope)),
    }
}
