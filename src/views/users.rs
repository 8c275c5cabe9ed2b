use maud::{html, Markup};

use crate::db::models::{Page, UserRow, UserStatistics};
use crate::names;

use super::components;

pub struct UsersData {
    pub page: Page<UserRow>,
    pub stats: UserStatistics,
    pub search: String,
    pub status: String,
    pub year: Option<i64>,
}

pub fn users(data: UsersData) -> Markup {
    let base_query = format!(
        "search={}&status={}&year={}",
        data.search,
        data.status,
        data.year.map(|y| y.to_string()).unwrap_or_default(),
    );

    html! {
        h1 { "Users" }

        div class="stats-strip" {
            span { strong { (data.stats.total) } " total" }
            span { strong { (data.stats.active) } " active" }
            span { strong { (data.stats.pending) } " pending" }
            span { strong { (data.stats.blocked) } " blocked" }
        }

        form {
            (components::search_input(names::ADMIN_USERS_URL, "search", &data.search, "Search users"))
            select name="status"
                   hx-get=(names::ADMIN_USERS_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.status.is_empty()] { "All statuses" }
                @for status in ["active", "pending", "blocked"] {
                    option value=(status) selected[data.status == status] { (status) }
                }
            }
            select name="year"
                   hx-get=(names::ADMIN_USERS_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.year.is_none()] { "All years" }
                @for year in 1..=5 {
                    option value=(year) selected[data.year == Some(year)] { "Year " (year) }
                }
            }
        }

        table {
            thead {
                tr {
                    th { "Email" }
                    th { "Name" }
                    th { "University" }
                    th { "Year" }
                    th { "Status" }
                    th { "Subscription" }
                    th { "Actions" }
                }
            }
            tbody {
                @for user in &data.page.items {
                    tr {
                        td { (user.email) }
                        td { (user.full_name) }
                        td { (user.university) }
                        td {
                            @match user.year {
                                Some(year) => { (year) },
                                None => { "-" },
                            }
                        }
                        td { (components::status_badge(&user.status)) }
                        td { (user.subscription_plan.as_deref().unwrap_or("-")) }
                        td {
                            @if user.status != "active" {
                                button hx-post=(names::user_action_url(user.id, "activate"))
                                       hx-target="main" { "Activate" }
                            }
                            @if user.status != "blocked" {
                                button hx-post=(names::user_action_url(user.id, "block"))
                                       hx-target="main" { "Block" }
                            }
                            (components::confirm_button(
                                &format!("delete-user-{}", user.id),
                                "Delete",
                                "Delete this user and all their data?",
                                &names::user_action_url(user.id, "delete"),
                            ))
                        }
                    }
                }
            }
        }

        @if data.page.items.is_empty() {
            p { "No users match the current filters." }
        }

        (components::pagination(names::ADMIN_USERS_URL, &base_query, data.page.page, data.page.total_pages()))
    }
}
