//! Operator registry: where the `allow_net` flag comes from.

use std::collections::HashMap;

use tourbook_shared::OperatorConfig;

use super::types::{BookingKind, PooledBase};

/// Case-insensitive lookup of operator rules.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    allow_net: HashMap<String, bool>,
}

impl OperatorRegistry {
    /// Builds the registry from configuration.
    #[must_use]
    pub fn from_config(operators: &[OperatorConfig]) -> Self {
        let allow_net = operators
            .iter()
            .map(|op| (normalize(&op.name), op.allow_net))
            .collect();
        Self { allow_net }
    }

    /// Number of configured operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allow_net.len()
    }

    /// Returns true when no operator is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allow_net.is_empty()
    }

    /// Returns whether the operator sells at net. Unknown operators do not.
    #[must_use]
    pub fn allow_net(&self, operator: &str) -> bool {
        self.allow_net
            .get(&normalize(operator))
            .copied()
            .unwrap_or(false)
    }

    /// Derives the booking variant from the operator and an optional pool base.
    #[must_use]
    pub fn kind_for(&self, operator: &str, pooled_base: Option<PooledBase>) -> BookingKind {
        match pooled_base {
            Some(base) => BookingKind::Pooled { base },
            None => BookingKind::Generic {
                allow_net: self.allow_net(operator),
            },
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
