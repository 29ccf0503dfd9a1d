//! Expense domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wayfarer_core::{ExpenseId, Money, TripId, UserId};

use super::trip::required;

/// A cost paid by one member on behalf of the trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub trip_id: TripId,
    pub paid_by: UserId,
    pub description: String,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

/// One debtor's portion of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseSplit {
    pub expense_id: ExpenseId,
    pub user_id: UserId,
    pub display_name: String,
    pub share: Money,
    pub is_paid: bool,
}

/// An expense with its payer's name and all of its splits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseWithSplits {
    #[serde(flatten)]
    pub expense: Expense,
    pub payer_name: String,
    pub splits: Vec<ExpenseSplit>,
}

/// An expense as submitted by a member. The payer is the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: Money,
}

impl NewExpense {
    /// Trim the description and require a positive amount.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for a 400 response.
    pub fn validated(self) -> Result<Self, String> {
        let description = required(&self.description, "description")?;
        let amount = self.amount.require_positive().map_err(|e| e.to_string())?;
        Ok(Self {
            description,
            amount,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_expense_parses_decimal_strings() {
        let expense: NewExpense =
            serde_json::from_value(serde_json::json!({"description": "Dinner", "amount": "90.00"}))
                .unwrap();
        let expense = expense.validated().unwrap();
        assert_eq!(expense.amount, Money::from_cents(9000).unwrap());
    }

    #[test]
    fn test_new_expense_rejects_bad_amounts() {
        assert!(
            serde_json::from_value::<NewExpense>(
                serde_json::json!({"description": "Taxi", "amount": "12.345"})
            )
            .is_err()
        );
        let zero: NewExpense =
            serde_json::from_value(serde_json::json!({"description": "Taxi", "amount": "0"}))
                .unwrap();
        assert_eq!(
            zero.validated().unwrap_err(),
            "amount must be greater than zero"
        );
    }

    #[test]
    fn test_expense_with_splits_flattens() {
        let expense = ExpenseWithSplits {
            expense: Expense {
                id: ExpenseId::new(7),
                trip_id: TripId::new(1),
                paid_by: UserId::new(1),
                description: "Dinner".to_string(),
                amount: Money::from_cents(9000).unwrap(),
                created_at: Utc::now(),
            },
            payer_name: "Ana".to_string(),
            splits: vec![],
        };
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["amount"], "90.00");
        assert_eq!(json["payer_name"], "Ana");
    }
}
