use bevy::prelude::*;
use std::collections::HashMap;

/// The resource placements are priced in.
pub const MATERIALS: &str = "materials";

pub const STARTING_MATERIALS: i64 = 500;

/// Named resource balances. Balances never go negative; a spend either
/// succeeds in full or leaves the balance untouched.
#[derive(Resource)]
pub struct ResourceBank {
    balances: HashMap<String, i64>,
}

impl Default for ResourceBank {
    fn default() -> Self {
        Self::with_starting_balance(STARTING_MATERIALS)
    }
}

impl ResourceBank {
    pub fn with_starting_balance(materials: i64) -> Self {
        let mut balances = HashMap::new();
        balances.insert(MATERIALS.to_string(), materials);
        Self { balances }
    }

    pub fn balance(&self, resource: &str) -> i64 {
        self.balances.get(resource).copied().unwrap_or(0)
    }

    pub fn can_afford(&self, resource: &str, amount: i64) -> bool {
        self.balance(resource) >= amount
    }

    /// Deducts `amount` if affordable, returning whether the spend happened.
    pub fn spend(&mut self, resource: &str, amount: i64) -> bool {
        if !self.can_afford(resource, amount) {
            return false;
        }
        *self.balances.entry(resource.to_string()).or_insert(0) -= amount;
        true
    }

    pub fn grant(&mut self, resource: &str, amount: i64) {
        *self.balances.entry(resource.to_string()).or_insert(0) += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_is_all_or_nothing() {
        let mut bank = ResourceBank::with_starting_balance(10);
        assert!(!bank.spend(MATERIALS, 11));
        assert_eq!(bank.balance(MATERIALS), 10);
        assert!(bank.spend(MATERIALS, 10));
        assert_eq!(bank.balance(MATERIALS), 0);
    }

    #[test]
    fn test_unknown_resource_is_zero() {
        let bank = ResourceBank::default();
        assert_eq!(bank.balance("amber"), 0);
        assert!(!bank.can_afford("amber", 1));
    }

    #[test]
    fn test_grant_creates_resource() {
        let mut bank = ResourceBank::with_starting_balance(0);
        bank.grant("amber", 3);
        assert!(bank.can_afford("amber", 3));
    }
}
