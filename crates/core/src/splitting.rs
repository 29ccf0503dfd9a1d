//! Expense splitting.
//!
//! When an expense is recorded, every trip member other than the payer gets a
//! split row for their share. The roster includes pending invitees: anyone
//! with a membership row on the trip is counted.
//!
//! Shares are computed in `Decimal` and truncated to whole cents. Whatever
//! truncation leaves over stays with the payer, so the split rows never add
//! up to more than the expense.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::money::MONEY_SCALE;
use crate::types::{Money, MoneyError, UserId};

/// Which members count toward the divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShareBasis {
    /// Divide by every member; the payer's own share is implicit.
    #[default]
    AllMembers,
    /// Divide by the members other than the payer; the payer owes nothing.
    OthersOnly,
}

impl std::str::FromStr for ShareBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_members" => Ok(Self::AllMembers),
            "others_only" => Ok(Self::OthersOnly),
            _ => Err(format!(
                "invalid share basis: {s} (expected all_members or others_only)"
            )),
        }
    }
}

/// One member's portion of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSplit {
    pub user_id: UserId,
    pub share: Money,
}

/// The split rows to write for one expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    /// Rows to insert, in roster order, payer excluded.
    pub splits: Vec<PlannedSplit>,
    /// What the payer carries: their own share plus any truncated cents.
    pub payer_portion: Money,
}

impl SplitPlan {
    fn nothing_to_split(amount: Money) -> Self {
        Self {
            splits: Vec::new(),
            payer_portion: amount,
        }
    }
}

/// Divide `amount` paid by `payer` across `members`.
///
/// `members` is the trip roster in any status, possibly containing the payer.
/// Duplicate ids are ignored. An empty roster produces no splits.
///
/// # Errors
///
/// Returns a [`MoneyError`] only if a computed share cannot be represented,
/// which cannot happen for valid inputs.
pub fn plan_splits(
    amount: Money,
    payer: UserId,
    members: &[UserId],
    basis: ShareBasis,
) -> Result<SplitPlan, MoneyError> {
    let mut debtors: Vec<UserId> = Vec::with_capacity(members.len());
    for &member in members {
        if member != payer && !debtors.contains(&member) {
            debtors.push(member);
        }
    }
    let payer_is_member = members.contains(&payer);

    let divisor = match basis {
        ShareBasis::AllMembers => debtors.len() + usize::from(payer_is_member),
        ShareBasis::OthersOnly => debtors.len(),
    };
    if divisor == 0 || debtors.is_empty() {
        return Ok(SplitPlan::nothing_to_split(amount));
    }

    let share_value = (amount.amount() / Decimal::from(divisor))
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
    let share = Money::try_from(share_value)?;

    let owed_by_others = share_value * Decimal::from(debtors.len());
    let payer_portion = Money::try_from(amount.amount() - owed_by_others)?;

    Ok(SplitPlan {
        splits: debtors
            .into_iter()
            .map(|user_id| PlannedSplit { user_id, share })
            .collect(),
        payer_portion,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Money {
        Money::from_cents(cents).unwrap()
    }

    fn ids(raw: &[i32]) -> Vec<UserId> {
        raw.iter().copied().map(UserId::new).collect()
    }

    fn planned(cents: i64, payer: i32, roster: &[i32], basis: ShareBasis) -> SplitPlan {
        plan_splits(money(cents), UserId::new(payer), &ids(roster), basis).unwrap()
    }

    fn owed(user: i32, cents: i64) -> PlannedSplit {
        PlannedSplit {
            user_id: UserId::new(user),
            share: money(cents),
        }
    }

    fn total(plan: &SplitPlan) -> Decimal {
        plan.splits
            .iter()
            .map(|s| s.share.amount())
            .sum::<Decimal>()
            + plan.payer_portion.amount()
    }

    #[test]
    fn test_three_members_all_members_basis() {
        let plan = planned(9000, 1, &[1, 2, 3], ShareBasis::AllMembers);
        assert_eq!(plan.splits, vec![owed(2, 3000), owed(3, 3000)]);
        assert_eq!(plan.payer_portion, money(3000));
    }

    #[test]
    fn test_three_members_others_only_basis() {
        let plan = planned(9000, 1, &[1, 2, 3], ShareBasis::OthersOnly);
        assert_eq!(plan.splits.len(), 2);
        assert!(plan.splits.iter().all(|s| s.share == money(4500)));
        assert_eq!(plan.payer_portion, Money::ZERO);
    }

    #[test]
    fn test_payer_outside_roster_splits_among_everyone() {
        let plan = planned(9000, 9, &[1, 2, 3], ShareBasis::AllMembers);
        assert_eq!(plan.splits.len(), 3);
        assert!(plan.splits.iter().all(|s| s.share == money(3000)));
        assert_eq!(plan.payer_portion, Money::ZERO);
    }

    #[test]
    fn test_empty_roster_splits_nothing() {
        let plan = planned(1234, 1, &[], ShareBasis::AllMembers);
        assert!(plan.splits.is_empty());
        assert_eq!(plan.payer_portion, money(1234));
    }

    #[test]
    fn test_payer_alone_splits_nothing() {
        for basis in [ShareBasis::AllMembers, ShareBasis::OthersOnly] {
            let plan = planned(500, 1, &[1], basis);
            assert!(plan.splits.is_empty());
        }
    }

    #[test]
    fn test_truncated_cents_stay_with_payer() {
        // 100.00 over three people: 33.33 each, payer keeps 33.34.
        let plan = planned(10_000, 1, &[1, 2, 3], ShareBasis::AllMembers);
        assert!(plan.splits.iter().all(|s| s.share == money(3333)));
        assert_eq!(plan.payer_portion, money(3334));
        assert_eq!(total(&plan), money(10_000).amount());
    }

    #[test]
    fn test_tiny_amount_yields_zero_shares() {
        let plan = planned(1, 1, &[1, 2, 3], ShareBasis::AllMembers);
        assert!(plan.splits.iter().all(|s| s.share.is_zero()));
        assert_eq!(plan.payer_portion, money(1));
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let plan = planned(600, 1, &[1, 2, 2, 3], ShareBasis::AllMembers);
        assert_eq!(plan.splits.len(), 2);
        assert!(plan.splits.iter().all(|s| s.share == money(200)));
    }

    #[test]
    fn test_sum_is_exact_for_many_rosters() {
        for members in 1..=12 {
            let roster: Vec<UserId> = (1..=members).map(UserId::new).collect();
            for cents in [1_i64, 99, 1000, 9999, 123_457] {
                for basis in [ShareBasis::AllMembers, ShareBasis::OthersOnly] {
                    let plan = plan_splits(money(cents), UserId::new(1), &roster, basis).unwrap();
                    assert_eq!(total(&plan), money(cents).amount());
                }
            }
        }
    }

    #[test]
    fn test_share_basis_parses_config_values() {
        assert_eq!("all_members".parse(), Ok(ShareBasis::AllMembers));
        assert_eq!("others_only".parse(), Ok(ShareBasis::OthersOnly));
        assert!("everyone".parse::<ShareBasis>().is_err());
    }
}
