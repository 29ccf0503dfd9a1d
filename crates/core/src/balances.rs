//! Net balances from outstanding splits.
//!
//! Each unpaid split means the debtor owes the expense's payer the share.
//! Netting all of them gives one figure per member: positive when the member
//! is owed money, negative when they owe.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Money, UserId};

/// A split as the settlement needs to see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obligation {
    pub payer: UserId,
    pub debtor: UserId,
    pub share: Money,
    pub is_paid: bool,
}

/// Net position of one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub user_id: UserId,
    /// Positive: owed to this member. Negative: this member owes.
    #[serde(with = "rust_decimal::serde::str")]
    pub net: Decimal,
}

/// Net every unpaid obligation into per-member balances, ordered by user id.
///
/// Members whose obligations cancel out are reported with a zero balance.
#[must_use]
pub fn settle(obligations: &[Obligation]) -> Vec<Balance> {
    let mut net: BTreeMap<UserId, Decimal> = BTreeMap::new();

    for obligation in obligations.iter().filter(|o| !o.is_paid) {
        *net.entry(obligation.payer).or_default() += obligation.share.amount();
        *net.entry(obligation.debtor).or_default() -= obligation.share.amount();
    }

    net.into_iter()
        .map(|(user_id, net)| Balance { user_id, net })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn owes(debtor: i32, payer: i32, cents: i64, is_paid: bool) -> Obligation {
        Obligation {
            payer: UserId::new(payer),
            debtor: UserId::new(debtor),
            share: Money::from_cents(cents).unwrap(),
            is_paid,
        }
    }

    fn net(user: i32, cents: i64) -> Balance {
        Balance {
            user_id: UserId::new(user),
            net: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn test_settle_nets_across_expenses() {
        let balances = settle(&[
            owes(2, 1, 3000, false),
            owes(3, 1, 3000, false),
            owes(1, 2, 1000, false),
        ]);
        assert_eq!(balances, vec![net(1, 5000), net(2, -2000), net(3, -3000)]);
    }

    #[test]
    fn test_paid_splits_are_ignored() {
        let balances = settle(&[owes(2, 1, 3000, true)]);
        assert!(balances.is_empty());
    }

    #[test]
    fn test_balances_sum_to_zero() {
        let balances = settle(&[
            owes(2, 1, 3333, false),
            owes(3, 1, 3333, false),
            owes(1, 3, 1250, false),
            owes(2, 3, 1250, true),
        ]);
        let sum: Decimal = balances.iter().map(|b| b.net).sum();
        assert!(sum.is_zero());
    }

    #[test]
    fn test_balance_serializes_net_as_string() {
        let json = serde_json::to_value(net(3, -1550)).unwrap();
        assert_eq!(json, serde_json::json!({"user_id": 3, "net": "-15.50"}));
    }
}
