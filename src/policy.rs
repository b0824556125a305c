//! Policy data model consumed by the validators
//!
//! A [`PolicySet`] is built per request by the surrounding service and
//! discarded once validation finishes. Policies are identified by their
//! [`PolicyEntityKey`] (name + version); the first policy inserted under a
//! key wins.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Property key under which a Drools policy names its rule artifact
pub const RULE_ARTIFACT_PROPERTY: &str = "rule_artifact";

/// Composite identity of a policy within a set
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolicyEntityKey {
    pub name: String,
    pub version: String,
}

impl PolicyEntityKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PolicyEntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// A single policy as received from the API layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub version: String,

    /// Declared policy type, e.g. `onap.policies.native.Drools`
    #[serde(rename = "type")]
    pub policy_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<String>,

    /// Free-form property bag
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Policy {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        policy_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            policy_type: policy_type.into(),
            type_version: None,
            properties: serde_json::Map::new(),
        }
    }

    /// Builder-style helper for attaching a property
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn key(&self) -> PolicyEntityKey {
        PolicyEntityKey::new(self.name.clone(), self.version.clone())
    }

    /// Decode the rule artifact this policy depends on
    pub fn rule_artifact(&self) -> Result<ArtifactCoordinate, CoordinateError> {
        let value = self
            .properties
            .get(RULE_ARTIFACT_PROPERTY)
            .ok_or(CoordinateError::Missing)?;

        let coordinate: ArtifactCoordinate =
            serde_json::from_value(value.clone()).map_err(CoordinateError::Malformed)?;

        for (field, content) in [
            ("groupId", &coordinate.group_id),
            ("artifactId", &coordinate.artifact_id),
            ("version", &coordinate.version),
        ] {
            if content.trim().is_empty() {
                return Err(CoordinateError::Blank(field));
            }
        }

        Ok(coordinate)
    }
}

/// Native policy kinds whose enforcement lives in an external artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativePolicyType {
    Drools,
    Xacml,
    Apex,
}

impl NativePolicyType {
    pub const ALL: [NativePolicyType; 3] = [Self::Drools, Self::Xacml, Self::Apex];

    /// Fixed type string carried by policies of this kind
    pub fn type_name(self) -> &'static str {
        match self {
            NativePolicyType::Drools => "onap.policies.native.Drools",
            NativePolicyType::Xacml => "onap.policies.native.Xacml",
            NativePolicyType::Apex => "onap.policies.native.Apex",
        }
    }
}

impl fmt::Display for NativePolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativePolicyType::Drools => write!(f, "drools"),
            NativePolicyType::Xacml => write!(f, "xacml"),
            NativePolicyType::Apex => write!(f, "apex"),
        }
    }
}

/// Maven-style coordinate of a rule artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Reasons a rule artifact coordinate could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum CoordinateError {
    #[error("property '{}' is missing", RULE_ARTIFACT_PROPERTY)]
    Missing,

    #[error("property '{}' is malformed: {}", RULE_ARTIFACT_PROPERTY, .0)]
    Malformed(#[source] serde_json::Error),

    #[error("property '{}' has a blank '{}'", RULE_ARTIFACT_PROPERTY, .0)]
    Blank(&'static str),
}

/// Policies keyed by identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySet {
    policies: BTreeMap<PolicyEntityKey, Policy>,
}

/// Wire shape of a policy set document
#[derive(Debug, Deserialize, Serialize)]
struct PolicySetDocument {
    #[serde(default)]
    policies: Vec<Policy>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `{"policies": [...]}` JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let document: PolicySetDocument = serde_json::from_str(json)?;
        Ok(document.policies.into_iter().collect())
    }

    /// Insert a policy unless its key is already taken
    ///
    /// Returns `false` when an earlier policy kept the slot.
    pub fn insert_if_absent(&mut self, policy: Policy) -> bool {
        match self.policies.entry(policy.key()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(policy);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, key: &PolicyEntityKey) -> Option<&Policy> {
        self.policies.get(key)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PolicyEntityKey, &Policy)> {
        self.policies.iter()
    }

    /// Subset of policies whose declared type equals `type_name`
    pub fn filter_by_type(&self, type_name: &str) -> PolicySet {
        let mut filtered = PolicySet::new();
        for policy in self.policies.values() {
            if policy.policy_type == type_name {
                filtered.insert_if_absent(policy.clone());
            }
        }
        filtered
    }

    pub fn filter_native(&self, native_type: NativePolicyType) -> PolicySet {
        self.filter_by_type(native_type.type_name())
    }
}

impl FromIterator<Policy> for PolicySet {
    fn from_iter<I: IntoIterator<Item = Policy>>(iter: I) -> Self {
        let mut set = PolicySet::new();
        for policy in iter {
            set.insert_if_absent(policy);
        }
        set
    }
}

impl<'a> IntoIterator for &'a PolicySet {
    type Item = (&'a PolicyEntityKey, &'a Policy);
    type IntoIter = btree_map::Iter<'a, PolicyEntityKey, Policy>;

    fn into_iter(self) -> Self::IntoIter {
        self.policies.iter()
    }
}
