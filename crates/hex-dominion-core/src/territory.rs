//! Territories: maximal connected groups of same-owner fields.
//!
//! A territory is the unit of economy. Only controllable territories (more
//! than one field) earn income, pay salaries, or host units.

use crate::settings::EconomyRates;
use crate::types::{FieldId, PlayerId, TerritoryId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A maximal connected region of fields owned by one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    /// Unique identifier.
    pub id: TerritoryId,
    /// Owning player.
    pub owner: PlayerId,
    /// Member fields. Never empty while the territory is registered on a board.
    pub fields: BTreeSet<FieldId>,
    /// Treasury. Negative only transiently, before bankruptcy is enforced.
    pub money: i32,
}

impl Territory {
    /// Create a territory with an empty treasury.
    pub fn new(id: TerritoryId, owner: PlayerId, fields: BTreeSet<FieldId>) -> Self {
        Self {
            id,
            owner,
            fields,
            money: 0,
        }
    }

    /// Number of member fields.
    pub fn size(&self) -> usize {
        self.fields.len()
    }

    /// Does the field belong to this territory?
    pub fn contains(&self, field: FieldId) -> bool {
        self.fields.contains(&field)
    }

    /// Territories with more than one field can earn money and host units.
    pub fn is_controllable(&self) -> bool {
        self.fields.len() > 1
    }

    /// Regular per-turn income.
    pub fn income(&self, rates: &EconomyRates) -> i32 {
        self.fields.len() as i32 * rates.income_per_field
    }

    /// Income granted on the owner's first turn of the game.
    pub fn start_income(&self, rates: &EconomyRates) -> i32 {
        self.fields.len() as i32 * rates.start_income_per_field
    }

    /// Credit the first-turn income.
    pub fn on_turn_start(&mut self, rates: &EconomyRates) {
        if self.is_controllable() {
            self.money += self.start_income(rates);
        }
    }

    /// Book one regular turn: income minus `salaries`.
    pub fn on_turn(&mut self, rates: &EconomyRates, salaries: i32) {
        if self.is_controllable() {
            self.money += self.income(rates) - salaries;
        }
    }

    /// Has the treasury gone negative?
    pub fn is_bankrupt(&self) -> bool {
        self.money < 0
    }

    /// Can the treasury pay `amount`?
    pub fn can_afford(&self, amount: u32) -> bool {
        i64::from(self.money) >= i64::from(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn territory(fields: &[FieldId]) -> Territory {
        Territory::new(1, 0, fields.iter().copied().collect())
    }

    #[test]
    fn test_controllable() {
        assert!(!territory(&[0]).is_controllable());
        assert!(territory(&[0, 1]).is_controllable());
    }

    #[test]
    fn test_income() {
        let rates = EconomyRates::default();
        let t = territory(&[0, 1, 2, 3]);
        assert_eq!(t.income(&rates), 4);
        assert_eq!(t.start_income(&rates), 20);
    }

    #[test]
    fn test_on_turn_start() {
        let rates = EconomyRates::default();
        let mut t = territory(&[0, 1, 2]);
        t.on_turn_start(&rates);
        assert_eq!(t.money, 15);
    }

    #[test]
    fn test_on_turn_pays_salaries() {
        let rates = EconomyRates::default();
        let mut t = territory(&[0, 1, 2]);
        t.money = 10;
        t.on_turn(&rates, 2);
        assert_eq!(t.money, 11);

        t.on_turn(&rates, 20);
        assert_eq!(t.money, -6);
        assert!(t.is_bankrupt());
    }

    #[test]
    fn test_uncontrollable_neither_earns_nor_pays() {
        let rates = EconomyRates::default();
        let mut t = territory(&[7]);
        t.on_turn_start(&rates);
        t.on_turn(&rates, 100);
        assert_eq!(t.money, 0);
    }

    #[test]
    fn test_can_afford() {
        let mut t = territory(&[0, 1]);
        t.money = 10;
        assert!(t.can_afford(10));
        assert!(!t.can_afford(11));
        t.money = -1;
        assert!(!t.can_afford(0));
    }
}
