use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One environment returned by the lookup service.
///
/// Only `id` is interpreted; every other field is carried through untouched
/// so the picker surface receives the record exactly as the service sent it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentCandidate {
    pub id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EnvironmentCandidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Result of one authenticated environment lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NavigationResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub environments: Vec<EnvironmentCandidate>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NavigationResult {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            environments: ids.into_iter().map(EnvironmentCandidate::new).collect(),
            extra: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// The sole candidate, when there is exactly one.
    pub fn single(&self) -> Option<&EnvironmentCandidate> {
        match self.environments.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// A `null` list counts as no candidates.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<EnvironmentCandidate>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<EnvironmentCandidate>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
