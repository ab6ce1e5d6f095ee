/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Partition metadata and the total `aws.partition` lookup.
//!
//! A partition groups regions under a common DNS and feature profile.
//! Resolution is deterministic and total: exact region match first, then
//! each partition's `regionRegex` in data order, then the default (`aws`)
//! partition. Downstream rules rely on the result always being present.

use regex_lite::Regex;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Partition metadata failed to load.
#[derive(Debug)]
pub struct InvalidPartitionsError {
    message: String,
}

impl InvalidPartitionsError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for InvalidPartitionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid partition metadata: {}", self.message)
    }
}

impl Error for InvalidPartitionsError {}

/// The attributes of a resolved partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    name: String,
    dns_suffix: String,
    dual_stack_dns_suffix: String,
    supports_fips: bool,
    supports_dual_stack: bool,
    implicit_global_region: String,
}

impl Partition {
    /// The partition name, e.g. `aws`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// DNS suffix for endpoints in this partition, e.g. `amazonaws.com`.
    pub fn dns_suffix(&self) -> &str {
        &self.dns_suffix
    }

    /// DNS suffix for dual-stack endpoints.
    pub fn dual_stack_dns_suffix(&self) -> &str {
        &self.dual_stack_dns_suffix
    }

    /// Whether the partition has FIPS endpoints.
    pub fn supports_fips(&self) -> bool {
        self.supports_fips
    }

    /// Whether the partition has dual-stack endpoints.
    pub fn supports_dual_stack(&self) -> bool {
        self.supports_dual_stack
    }

    /// The region used for partition-global (non-regionalized) services.
    pub fn implicit_global_region(&self) -> &str {
        &self.implicit_global_region
    }
}

#[derive(Debug)]
struct PartitionMetadata {
    id: String,
    region_regex: Regex,
    regions: HashMap<String, RegionOverrides>,
    outputs: Partition,
}

/// Per-region overrides of the partition-level outputs.
#[derive(Debug, Default)]
struct RegionOverrides {
    dns_suffix: Option<String>,
    dual_stack_dns_suffix: Option<String>,
    supports_fips: Option<bool>,
    supports_dual_stack: Option<bool>,
}

impl PartitionMetadata {
    fn outputs_for(&self, region: &str) -> Partition {
        let mut outputs = self.outputs.clone();
        if let Some(overrides) = self.regions.get(region) {
            if let Some(dns_suffix) = &overrides.dns_suffix {
                outputs.dns_suffix = dns_suffix.clone();
            }
            if let Some(dual_stack) = &overrides.dual_stack_dns_suffix {
                outputs.dual_stack_dns_suffix = dual_stack.clone();
            }
            if let Some(fips) = overrides.supports_fips {
                outputs.supports_fips = fips;
            }
            if let Some(dual_stack) = overrides.supports_dual_stack {
                outputs.supports_dual_stack = dual_stack;
            }
        }
        outputs
    }
}

/// Immutable partition lookup table backing the `aws.partition` builtin.
///
/// Constructed once and shared read-only; there is no hidden global. Use
/// [`default_partitions`](PartitionResolver::default_partitions) for the
/// copy bundled with this crate, or load service-specific metadata with
/// [`from_json_str`](PartitionResolver::from_json_str).
#[derive(Debug)]
pub struct PartitionResolver {
    partitions: Vec<PartitionMetadata>,
    default_index: usize,
}

const DEFAULT_PARTITION_ID: &str = "aws";

impl PartitionResolver {
    /// Load the partition metadata bundled with this crate.
    pub fn default_partitions() -> Self {
        Self::from_json_str(include_str!("../partitions.json"))
            .expect("bundled partitions.json is valid")
    }

    /// Load partition metadata from its JSON document form.
    pub fn from_json_str(raw: &str) -> Result<Self, InvalidPartitionsError> {
        let json: Json = serde_json::from_str(raw)
            .map_err(|err| InvalidPartitionsError::new(format!("not valid JSON: {err}")))?;
        Self::from_json(&json)
    }

    /// Load partition metadata from an already-parsed JSON document.
    pub fn from_json(json: &Json) -> Result<Self, InvalidPartitionsError> {
        let partitions = json
            .get("partitions")
            .and_then(Json::as_array)
            .ok_or_else(|| InvalidPartitionsError::new("missing `partitions` array"))?;
        if partitions.is_empty() {
            return Err(InvalidPartitionsError::new("`partitions` must not be empty"));
        }
        let partitions = partitions
            .iter()
            .map(Self::partition_from_json)
            .collect::<Result<Vec<_>, _>>()?;
        let default_index = partitions
            .iter()
            .position(|p| p.id == DEFAULT_PARTITION_ID)
            .unwrap_or(0);
        Ok(Self {
            partitions,
            default_index,
        })
    }

    fn partition_from_json(json: &Json) -> Result<PartitionMetadata, InvalidPartitionsError> {
        let id = json
            .get("id")
            .and_then(Json::as_str)
            .ok_or_else(|| InvalidPartitionsError::new("partition is missing `id`"))?
            .to_string();
        let pattern = json
            .get("regionRegex")
            .and_then(Json::as_str)
            .ok_or_else(|| {
                InvalidPartitionsError::new(format!("partition `{id}` is missing `regionRegex`"))
            })?;
        let region_regex = Regex::new(pattern).map_err(|err| {
            InvalidPartitionsError::new(format!("partition `{id}`: bad regionRegex: {err}"))
        })?;
        let outputs = json
            .get("outputs")
            .and_then(Json::as_object)
            .ok_or_else(|| {
                InvalidPartitionsError::new(format!("partition `{id}` is missing `outputs`"))
            })?;
        let get_str = |key: &str| -> Result<String, InvalidPartitionsError> {
            outputs
                .get(key)
                .and_then(Json::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    InvalidPartitionsError::new(format!(
                        "partition `{id}`: outputs is missing `{key}`"
                    ))
                })
        };
        let get_bool = |key: &str| -> Result<bool, InvalidPartitionsError> {
            outputs.get(key).and_then(Json::as_bool).ok_or_else(|| {
                InvalidPartitionsError::new(format!("partition `{id}`: outputs is missing `{key}`"))
            })
        };
        let outputs = Partition {
            name: outputs
                .get("name")
                .and_then(Json::as_str)
                .unwrap_or(&id)
                .to_string(),
            dns_suffix: get_str("dnsSuffix")?,
            dual_stack_dns_suffix: get_str("dualStackDnsSuffix")?,
            supports_fips: get_bool("supportsFIPS")?,
            supports_dual_stack: get_bool("supportsDualStack")?,
            implicit_global_region: get_str("implicitGlobalRegion")?,
        };
        let mut regions = HashMap::new();
        if let Some(region_map) = json.get("regions").and_then(Json::as_object) {
            for (region, overrides) in region_map {
                let mut parsed = RegionOverrides::default();
                if let Some(map) = overrides.as_object() {
                    parsed.dns_suffix = map
                        .get("dnsSuffix")
                        .and_then(Json::as_str)
                        .map(str::to_string);
                    parsed.dual_stack_dns_suffix = map
                        .get("dualStackDnsSuffix")
                        .and_then(Json::as_str)
                        .map(str::to_string);
                    parsed.supports_fips = map.get("supportsFIPS").and_then(Json::as_bool);
                    parsed.supports_dual_stack =
                        map.get("supportsDualStack").and_then(Json::as_bool);
                }
                regions.insert(region.clone(), parsed);
            }
        }
        Ok(PartitionMetadata {
            id,
            region_regex,
            regions,
            outputs,
        })
    }

    /// Resolve the partition for a region. Total: unknown regions fall back
    /// to regex inference, then to the default partition.
    pub fn resolve_partition(&self, region: &str) -> Partition {
        for partition in &self.partitions {
            if partition.regions.contains_key(region) {
                return partition.outputs_for(region);
            }
        }
        for partition in &self.partitions {
            if partition.region_regex.is_match(region) {
                return partition.outputs.clone();
            }
        }
        self.partitions[self.default_index].outputs.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn resolver() -> PartitionResolver {
        PartitionResolver::default_partitions()
    }

    #[test]
    fn bundled_metadata_loads() {
        let resolver = resolver();
        assert!(!resolver.partitions.is_empty());
        assert_eq!(resolver.partitions[resolver.default_index].id, "aws");
    }

    #[test]
    fn explicit_region_match() {
        let partition = resolver().resolve_partition("us-east-1");
        assert_eq!(partition.name(), "aws");
        assert_eq!(partition.dns_suffix(), "amazonaws.com");
        assert!(partition.supports_fips());
    }

    #[test]
    fn regex_match_for_unlisted_region() {
        // not in any explicit region list, but shaped like an aws region
        let partition = resolver().resolve_partition("us-test-1");
        assert_eq!(partition.name(), "aws");

        let partition = resolver().resolve_partition("cn-test-1");
        assert_eq!(partition.name(), "aws-cn");
        assert_eq!(partition.dns_suffix(), "amazonaws.com.cn");
    }

    #[test]
    fn total_fallback_to_default_partition() {
        let partition = resolver().resolve_partition("definitely-not-a-region");
        assert_eq!(partition.name(), "aws");
        let partition = resolver().resolve_partition("");
        assert_eq!(partition.name(), "aws");
    }

    #[test]
    fn gov_cloud_regions() {
        let partition = resolver().resolve_partition("us-gov-west-1");
        assert_eq!(partition.name(), "aws-us-gov");
        assert_eq!(partition.implicit_global_region(), "us-gov-west-1");
    }

    #[test]
    fn per_region_overrides_apply() {
        let resolver = PartitionResolver::from_json_str(
            r#"{"partitions": [{
                "id": "aws",
                "regionRegex": "^us\\-\\w+\\-\\d+$",
                "regions": {
                    "us-east-1": {},
                    "us-odd-1": {"dnsSuffix": "odd.example.com", "supportsDualStack": false}
                },
                "outputs": {
                    "name": "aws",
                    "dnsSuffix": "amazonaws.com",
                    "dualStackDnsSuffix": "api.aws",
                    "supportsFIPS": true,
                    "supportsDualStack": true,
                    "implicitGlobalRegion": "us-east-1"
                }
            }]}"#,
        )
        .unwrap();
        let odd = resolver.resolve_partition("us-odd-1");
        assert_eq!(odd.dns_suffix(), "odd.example.com");
        assert!(!odd.supports_dual_stack());
        assert!(odd.supports_fips());
        let normal = resolver.resolve_partition("us-east-1");
        assert_eq!(normal.dns_suffix(), "amazonaws.com");
    }

    #[test]
    fn empty_partition_list_is_rejected() {
        let err = PartitionResolver::from_json_str(r#"{"partitions": []}"#).unwrap_err();
        assert!(err.to_string().contains("must not be empty"), "{err}");
    }

    #[test]
    fn bad_regex_is_rejected() {
        let err = PartitionResolver::from_json_str(
            r#"{"partitions": [{
                "id": "aws",
                "regionRegex": "^(us",
                "regions": {},
                "outputs": {
                    "name": "aws",
                    "dnsSuffix": "amazonaws.com",
                    "dualStackDnsSuffix": "api.aws",
                    "supportsFIPS": true,
                    "supportsDualStack": true,
                    "implicitGlobalRegion": "us-east-1"
                }
            }]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("bad regionRegex"), "{err}");
    }
}
