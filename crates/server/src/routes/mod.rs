//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /auth/register                    - Create an account and log in
//! POST /auth/login                       - Log in
//! POST /auth/logout                      - Log out
//! GET  /auth/me                          - Current user
//!
//! # Users
//! GET  /users/search?q=                  - Find users by email or name
//! GET  /users/{id}                       - Profile
//! PUT  /users/me                         - Update own profile
//!
//! # Trips
//! GET  /trips                            - Trips the caller belongs to
//! POST /trips                            - Create a trip
//! GET  /trips/invitations                - Trips the caller is invited to
//! GET  /trips/{id}                       - Trip detail
//! PUT  /trips/{id}                       - Edit (owner)
//! DELETE /trips/{id}                     - Delete with everything in it (owner)
//!
//! # Members
//! GET  /trips/{id}/members               - Roster
//! POST /trips/{id}/members               - Invite by email (owner)
//! POST /trips/{id}/invitation/accept     - Accept an invitation
//! POST /trips/{id}/invitation/decline    - Decline an invitation
//! DELETE /trips/{id}/members/{user_id}   - Leave, or remove a member (owner)
//!
//! # Itinerary, expenses, memories, chat
//! GET|POST   /trips/{id}/activities
//! PUT|DELETE /activities/{id}
//! GET|POST   /trips/{id}/expenses
//! DELETE     /expenses/{id}
//! PUT        /expenses/{id}/splits/{user_id}
//! GET        /trips/{id}/balances
//! GET|POST   /trips/{id}/memories
//! DELETE     /memories/{id}
//! GET|POST   /trips/{id}/chat
//!
//! # Friends and messages
//! GET  /friends                          - Friends
//! GET  /friends/requests                 - Incoming requests
//! POST /friends/requests                 - Send a request
//! POST /friends/accept/{id}              - Accept a request
//! POST /friends/decline/{id}             - Decline a request
//! DELETE /friends/{user_id}              - Unfriend
//! GET  /messages/unread                  - Unread count
//! GET|POST /messages/{user_id}           - Conversation with a friend
//! PUT  /messages/{user_id}/read          - Mark a conversation read
//!
//! # Admin
//! GET  /admin/stats
//! GET  /admin/users
//! PUT  /admin/users/{id}/role
//! DELETE /admin/users/{id}
//! ```

pub mod activities;
pub mod admin;
pub mod auth;
pub mod chat;
pub mod expenses;
pub mod friends;
pub mod members;
pub mod memories;
pub mod messages;
pub mod trips;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(users::router())
        .merge(trips::router())
        .merge(members::router())
        .merge(activities::router())
        .merge(expenses::router())
        .merge(memories::router())
        .merge(chat::router())
        .merge(friends::router())
        .merge(messages::router())
        .nest("/admin", admin::router())
}
