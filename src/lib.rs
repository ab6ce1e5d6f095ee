/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Runtime interpreter for Smithy endpoint rule sets.
//!
//! An endpoint ruleset is a small declarative program: a list of typed
//! parameters plus an ordered tree of rules. Each rule is guarded by
//! conditions (function calls over the current bindings, optionally binding
//! their result to a new name) and either produces an endpoint, produces an
//! authored error, or descends into child rules. This crate loads rulesets
//! from their JSON form, validates them, and evaluates them against
//! per-request parameter bindings:
//!
//! ```
//! use aws_smithy_endpoint_rules::{Params, RuleSet};
//!
//! let ruleset = RuleSet::from_json_str(r#"{
//!     "version": "1.0",
//!     "parameters": {
//!         "Region": { "type": "String", "required": true }
//!     },
//!     "rules": [{
//!         "type": "endpoint",
//!         "conditions": [],
//!         "endpoint": { "url": "https://svc.{Region}.example.com" }
//!     }]
//! }"#).unwrap();
//!
//! let params = Params::builder().set("Region", "us-west-2").build();
//! let endpoint = ruleset.resolve_endpoint(&params).unwrap();
//! assert_eq!(endpoint.url(), "https://svc.us-west-2.example.com");
//! ```
//!
//! Evaluation is pure and deterministic: no I/O, no shared mutable state.
//! Partition metadata (used by the `aws.partition` builtin) is an explicit
//! immutable value — see [`PartitionResolver`] — so hosts control its
//! lifecycle; [`PartitionResolver::default_partitions`] loads the copy
//! bundled with this crate.

#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod endpoint;
pub mod suite;

mod endpoint_lib;
mod eval;
mod expr;
mod ruleset;
mod validate;

pub use crate::endpoint::{Endpoint, ResolveEndpointError};
pub use crate::endpoint_lib::partition::{InvalidPartitionsError, Partition, PartitionResolver};
pub use crate::eval::{Params, ParamsBuilder};
pub use crate::expr::Value;
pub use crate::ruleset::{InvalidRuleSetError, Parameter, ParameterType, RuleSet};
