// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A lookup of provider process ids by process key.

use std::collections::HashMap;

use uuid::Uuid;

use crate::process_kind::ProcessKey;

/// Maps the keys of built processes to their ids, so that later build
/// stages can set default providers without searching the graph.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    ids: HashMap<ProcessKey, Uuid>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the process `id` under `key`.  The first registration of a
    /// key wins.
    pub fn register(&mut self, key: ProcessKey, id: Uuid) {
        self.ids.entry(key).or_insert(id);
    }

    pub fn get(&self, key: &ProcessKey) -> Option<Uuid> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionLevel;

    #[test]
    fn test_registry() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.is_empty());

        let key = ProcessKey::generation_mix("PJM", RegionLevel::BalancingAuthority);
        let first = Uuid::from_u128(1);
        registry.register(key.clone(), first);
        registry.register(key.clone(), Uuid::from_u128(2));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&key), Some(first));
        assert_eq!(
            registry.get(&ProcessKey::generation_mix("PJM", RegionLevel::Nerc)),
            None
        );
    }
}
