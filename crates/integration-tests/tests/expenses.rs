//! Integration tests for expenses, splits and balances.
//!
//! These tests require a `PostgreSQL` server reachable through
//! `DATABASE_URL`. Run with: cargo test -p wayfarer-integration-tests -- --ignored

use sqlx::PgPool;

use wayfarer_core::UserId;
use wayfarer_core::balances::Balance;
use wayfarer_core::splitting::ShareBasis;
use wayfarer_integration_tests::{create_trip, create_user, decimal, join_trip, money};
use wayfarer_server::db::{ExpenseRepository, RepositoryError};
use wayfarer_server::models::expense::NewExpense;
use wayfarer_server::services::{ExpenseService, MembershipService, ServiceError};

fn dinner(cents: i64) -> NewExpense {
    NewExpense {
        description: "Dinner in Alfama".to_string(),
        amount: money(cents),
    }
}

fn net(user_id: UserId, cents: i64) -> Balance {
    Balance {
        user_id,
        net: decimal(cents),
    }
}

// ============================================================================
// Splitting
// ============================================================================

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_expense_splits_evenly_across_the_roster(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let cleo = create_user(&pool, "cleo@example.com", "Cleo").await;
    let trip = create_trip(&pool, &ana, "Lisbon").await;
    join_trip(&pool, &trip, &ana, &ben).await;
    join_trip(&pool, &trip, &ana, &cleo).await;

    let created = ExpenseService::new(&pool, ShareBasis::AllMembers)
        .create(trip.id, ana.id, dinner(9000))
        .await
        .expect("create");

    assert_eq!(created.expense.amount, money(9000));
    let mut debtors: Vec<_> = created
        .splits
        .iter()
        .map(|s| (s.user_id, s.share, s.is_paid))
        .collect();
    debtors.sort();
    assert_eq!(
        debtors,
        vec![(ben.id, money(3000), false), (cleo.id, money(3000), false)]
    );
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_others_only_basis_leaves_the_payer_out(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let cleo = create_user(&pool, "cleo@example.com", "Cleo").await;
    let trip = create_trip(&pool, &ana, "Lisbon").await;
    join_trip(&pool, &trip, &ana, &ben).await;
    join_trip(&pool, &trip, &ana, &cleo).await;

    let created = ExpenseService::new(&pool, ShareBasis::OthersOnly)
        .create(trip.id, ana.id, dinner(9000))
        .await
        .expect("create");

    assert_eq!(created.splits.len(), 2);
    assert!(created.splits.iter().all(|s| s.share == money(4500)));
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_solo_expense_has_no_splits(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let trip = create_trip(&pool, &ana, "Lisbon").await;

    let created = ExpenseService::new(&pool, ShareBasis::AllMembers)
        .create(trip.id, ana.id, dinner(4200))
        .await
        .expect("create");
    assert!(created.splits.is_empty());

    let listed = ExpenseRepository::new(&pool)
        .list_for_trip(trip.id)
        .await
        .expect("list");
    let names: Vec<_> = listed.iter().map(|e| e.payer_name.as_str()).collect();
    assert_eq!(names, vec!["Ana"]);
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_pending_invitees_share_the_cost(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let cleo = create_user(&pool, "cleo@example.com", "Cleo").await;
    let trip = create_trip(&pool, &ana, "Lisbon").await;
    join_trip(&pool, &trip, &ana, &ben).await;
    MembershipService::new(&pool)
        .invite(trip.id, ana.id, "cleo@example.com")
        .await
        .expect("invite");

    let expenses = ExpenseService::new(&pool, ShareBasis::AllMembers);
    let created = expenses
        .create(trip.id, ana.id, dinner(9000))
        .await
        .expect("create");
    assert!(created.splits.iter().any(|s| s.user_id == cleo.id));

    let err = expenses
        .create(trip.id, cleo.id, dinner(1000))
        .await
        .expect_err("pending payer");
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_strangers_cannot_record_expenses(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let eve = create_user(&pool, "eve@example.com", "Eve").await;
    let trip = create_trip(&pool, &ana, "Lisbon").await;

    let err = ExpenseService::new(&pool, ShareBasis::AllMembers)
        .create(trip.id, eve.id, dinner(1000))
        .await
        .expect_err("not a member");
    assert!(matches!(err, ServiceError::NotFound("trip")));
}

// ============================================================================
// Paid flags and balances
// ============================================================================

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_balances_net_unpaid_splits(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let cleo = create_user(&pool, "cleo@example.com", "Cleo").await;
    let trip = create_trip(&pool, &ana, "Lisbon").await;
    join_trip(&pool, &trip, &ana, &ben).await;
    join_trip(&pool, &trip, &ana, &cleo).await;
    let expenses = ExpenseService::new(&pool, ShareBasis::AllMembers);

    let created = expenses
        .create(trip.id, ana.id, dinner(9000))
        .await
        .expect("create");

    let balances = expenses.balances(trip.id, cleo.id).await.expect("balances");
    assert_eq!(
        balances,
        vec![net(ana.id, 6000), net(ben.id, -3000), net(cleo.id, -3000)]
    );

    expenses
        .set_split_paid(created.expense.id, ben.id, ben.id, true)
        .await
        .expect("ben pays");

    let balances = expenses.balances(trip.id, ana.id).await.expect("balances");
    assert_eq!(balances, vec![net(ana.id, 3000), net(cleo.id, -3000)]);
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_only_payer_or_debtor_flags_a_split(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let cleo = create_user(&pool, "cleo@example.com", "Cleo").await;
    let trip = create_trip(&pool, &ana, "Lisbon").await;
    join_trip(&pool, &trip, &ana, &ben).await;
    join_trip(&pool, &trip, &ana, &cleo).await;
    let expenses = ExpenseService::new(&pool, ShareBasis::AllMembers);
    let created = expenses
        .create(trip.id, ben.id, dinner(9000))
        .await
        .expect("create");

    let err = expenses
        .set_split_paid(created.expense.id, cleo.id, ana.id, true)
        .await
        .expect_err("third party");
    assert!(matches!(err, ServiceError::Forbidden(_)));

    expenses
        .set_split_paid(created.expense.id, ben.id, ana.id, true)
        .await
        .expect("payer marks");

    let err = expenses
        .set_split_paid(created.expense.id, ben.id, ben.id, true)
        .await
        .expect_err("payer has no split");
    assert!(matches!(err, ServiceError::Repository(RepositoryError::NotFound)));
}

#[sqlx::test(migrator = "wayfarer_server::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_owner_can_delete_any_expense(pool: PgPool) {
    let ana = create_user(&pool, "ana@example.com", "Ana").await;
    let ben = create_user(&pool, "ben@example.com", "Ben").await;
    let cleo = create_user(&pool, "cleo@example.com", "Cleo").await;
    let trip = create_trip(&pool, &ana, "Lisbon").await;
    join_trip(&pool, &trip, &ana, &ben).await;
    join_trip(&pool, &trip, &ana, &cleo).await;
    let expenses = ExpenseService::new(&pool, ShareBasis::AllMembers);
    let created = expenses
        .create(trip.id, ben.id, dinner(9000))
        .await
        .expect("create");

    let err = expenses
        .delete(created.expense.id, cleo.id)
        .await
        .expect_err("neither payer nor owner");
    assert!(matches!(err, ServiceError::Forbidden(_)));

    expenses
        .delete(created.expense.id, ana.id)
        .await
        .expect("owner deletes");
    let balances = expenses.balances(trip.id, ben.id).await.expect("balances");
    assert!(balances.is_empty());
}
