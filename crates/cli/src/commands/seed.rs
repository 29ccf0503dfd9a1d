//! Demo data: three travellers, one trip, one shared dinner.
//!
//! All demo accounts share the password `wayfarer-demo`. Running the seed a
//! second time does nothing once the first demo account exists.

use chrono::NaiveDate;

use wayfarer_core::splitting::ShareBasis;
use wayfarer_core::{Email, Money, UserRole};
use wayfarer_server::db::{TripRepository, UserRepository};
use wayfarer_server::models::expense::NewExpense;
use wayfarer_server::models::trip::TripDetails;
use wayfarer_server::services::{AuthService, ExpenseService, MembershipService};

use super::{CommandError, connect};

const DEMO_PASSWORD: &str = "wayfarer-demo";

const DEMO_USERS: [(&str, &str); 3] = [
    ("ana@example.com", "Ana"),
    ("ben@example.com", "Ben"),
    ("cleo@example.com", "Cleo"),
];

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, CommandError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CommandError::Invalid(format!("bad demo date {year}-{month}-{day}")))
}

fn split_basis() -> Result<ShareBasis, CommandError> {
    std::env::var("WAYFARER_SPLIT_BASIS")
        .map_or(Ok(ShareBasis::default()), |value| value.parse())
        .map_err(CommandError::Invalid)
}

/// Seed the demo trip.
pub async fn demo() -> Result<(), CommandError> {
    let basis = split_basis()?;
    let pool = connect().await?;

    let [(first_email, _), ..] = DEMO_USERS;
    let first = Email::parse(first_email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let existing = UserRepository::new(&pool).get_by_email(&first).await?;
    if existing.is_some() {
        tracing::warn!("Demo data already present, nothing to do");
        return Ok(());
    }

    let auth = AuthService::new(&pool);
    let role = UserRole::User;
    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for (email, name) in DEMO_USERS {
        users.push(auth.register(email, name, DEMO_PASSWORD, role).await?);
    }
    let [ana, ben, cleo] = users.as_slice() else {
        return Err(CommandError::Invalid("expected three demo users".to_string()));
    };

    let details = TripDetails {
        name: "Lisbon long weekend".to_string(),
        destination: "Lisbon".to_string(),
        origin: Some("Porto".to_string()),
        start_date: date(2026, 11, 6)?,
        end_date: date(2026, 11, 9)?,
        image_url: None,
    };
    let trip = TripRepository::new(&pool).create(ana.id, &details).await?;

    let membership = MembershipService::new(&pool);
    for guest in [ben, cleo] {
        membership
            .invite(trip.id, ana.id, guest.email.as_str())
            .await?;
        membership.respond(trip.id, guest.id, true).await?;
    }

    let dinner = NewExpense {
        description: "Dinner at the harbour".to_string(),
        amount: Money::from_cents(9000).map_err(|e| CommandError::Invalid(e.to_string()))?,
    };
    let created = ExpenseService::new(&pool, basis)
        .create(trip.id, ana.id, dinner)
        .await?;

    tracing::info!(
        trip_id = %trip.id,
        expense_id = %created.expense.id,
        splits = created.splits.len(),
        "Demo trip seeded. Log in as {} with password {DEMO_PASSWORD}",
        ana.email
    );
    Ok(())
}
