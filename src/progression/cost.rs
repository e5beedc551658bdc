use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Resource kind -> amount. Zero amounts are never stored, so two costs are
/// equal exactly when they ask for the same non-zero resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceCost {
    amounts: BTreeMap<String, u64>,
}

impl ResourceCost {
    pub fn new() -> Self {
        Self {
            amounts: BTreeMap::new(),
        }
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let mut cost = Self::new();
        cost.add_many(pairs);
        cost
    }

    pub fn add(&mut self, resource: impl Into<String>, amount: u64) {
        if amount == 0 {
            return;
        }
        let entry = self.amounts.entry(resource.into()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn add_many<I, K>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        for (resource, amount) in pairs {
            self.add(resource, amount);
        }
    }

    /// Adds another cost into self, element-wise.
    pub fn add_from(&mut self, other: &ResourceCost) {
        for (resource, amount) in &other.amounts {
            self.add(resource.as_str(), *amount);
        }
    }

    pub fn scaled(&self, factor: u64) -> ResourceCost {
        let mut out = ResourceCost::new();
        for (resource, amount) in &self.amounts {
            out.add(resource.as_str(), amount.saturating_mul(factor));
        }
        out
    }

    /// Each amount divided by `parts`, rounded up.
    pub fn divided_ceil(&self, parts: u64) -> ResourceCost {
        let parts = parts.max(1);
        let mut out = ResourceCost::new();
        for (resource, amount) in &self.amounts {
            out.add(resource.as_str(), amount.div_ceil(parts));
        }
        out
    }

    /// Element-wise subtraction floored at zero.
    pub fn saturating_sub(&self, other: &ResourceCost) -> ResourceCost {
        let mut out = ResourceCost::new();
        for (resource, amount) in &self.amounts {
            out.add(resource.as_str(), amount.saturating_sub(other.get(resource)));
        }
        out
    }

    pub fn get(&self, resource: &str) -> u64 {
        self.amounts.get(resource).copied().unwrap_or(0)
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.amounts.contains_key(resource)
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.amounts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> + '_ {
        self.amounts.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for ResourceCost {
    fn from_iter<T: IntoIterator<Item = (K, u64)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}
