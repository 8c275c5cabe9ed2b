pub mod admins;
pub mod auth;
pub mod calendar;
pub mod codes;
pub mod components;
pub mod layout;
pub mod profile;
pub mod questions;
pub mod quiz;
pub mod users;

// Re-export commonly used functions from layout
pub use layout::{page, titled};

use maud::Markup;

use crate::db::models::AuthUser;

/// Full page for direct navigation, fragment + title for htmx swaps.
pub fn render(is_htmx: bool, title: &str, body: Markup, user: Option<&AuthUser>) -> Markup {
    if is_htmx {
        titled(title, body)
    } else {
        page(title, body, user)
    }
}
