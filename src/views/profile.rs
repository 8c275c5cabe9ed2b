use maud::{html, Markup};

use crate::db::models::{QuizAttemptRow, UserRow};
use crate::names;
use crate::utils;

pub enum RedeemState {
    NoMessage,
    Redeemed(String),
    NotFound,
    AlreadyUsed,
    Expired,
}

pub enum PasswordState {
    NoMessage,
    Success,
    EmptyFields,
    WeakPassword,
    IncorrectPassword,
}

pub struct ProfileData {
    pub user: UserRow,
    pub attempts: Vec<QuizAttemptRow>,
    pub redeem: RedeemState,
    pub password: PasswordState,
}

pub fn profile(data: ProfileData) -> Markup {
    html! {
        h1 { "Profile" }

        article {
            p { strong { (data.user.full_name) } " (" (data.user.email) ")" }
            @if !data.user.university.is_empty() {
                p { (data.user.university) }
            }
            @if let Some(year) = data.user.year {
                p { "Year " (year) }
            }
            p {
                "Subscription: "
                @match &data.user.subscription_plan {
                    Some(plan) => {
                        strong { (plan) }
                        @if let Some(expiry) = data.user.subscription_expiry {
                            " (until " (expiry.format("%Y-%m-%d")) ")"
                        }
                    }
                    None => { em { "none" } },
                }
            }
        }

        details {
            summary { "Redeem access code" }
            @match &data.redeem {
                RedeemState::NoMessage => {},
                RedeemState::Redeemed(package) => {
                    p class="notice" { "Code redeemed: " (package) " activated." }
                },
                RedeemState::NotFound => { p class="error" { "Unknown access code." } },
                RedeemState::AlreadyUsed => { p class="error" { "That code has already been used." } },
                RedeemState::Expired => { p class="error" { "That code has expired." } },
            }
            form hx-post=(names::REDEEM_CODE_URL) hx-target="main" {
                label {
                    "Access code"
                    input type="text" name="code" placeholder="TQ1-XXXXXX" required;
                }
                button type="submit" { "Redeem" }
            }
        }

        details {
            summary { "Change password" }
            @match &data.password {
                PasswordState::NoMessage => {},
                PasswordState::Success => { p class="notice" { "Password changed." } },
                PasswordState::EmptyFields => { p class="error" { "Both fields are required." } },
                PasswordState::WeakPassword => { p class="error" { "New password must be at least 8 characters." } },
                PasswordState::IncorrectPassword => { p class="error" { "Current password is incorrect." } },
            }
            form hx-post=(names::CHANGE_PASSWORD_URL) hx-target="main" {
                label {
                    "Current password"
                    input type="password" name="current_password" required;
                }
                label {
                    "New password"
                    input type="password" name="new_password" required minlength="8";
                }
                button type="submit" { "Change password" }
            }
        }

        h2 { "Quiz history" }
        @if data.attempts.is_empty() {
            p { "No quizzes taken yet." }
        } @else {
            table {
                thead {
                    tr {
                        th { "Date" }
                        th { "Quiz" }
                        th { "Score" }
                        th { "Questions" }
                        th { "Time" }
                    }
                }
                tbody {
                    @for attempt in &data.attempts {
                        tr {
                            td { (attempt.taken_at.format("%Y-%m-%d %H:%M")) }
                            td { (attempt.title) }
                            td { (attempt.score) "%" }
                            td { (attempt.questions_count) }
                            td { (utils::format_time(attempt.time_spent_seconds as u32)) }
                        }
                    }
                }
            }
        }
    }
}
