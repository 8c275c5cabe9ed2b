use maud::{html, Markup, DOCTYPE};

use crate::db::models::AuthUser;
use crate::{names, utils};

fn css() -> Markup {
    html! {
        link rel="stylesheet" href="/static/index.css";
    }
}

fn js() -> Markup {
    html! {
        script src="https://unpkg.com/htmx.org@2.0.4" {}
    }
}

fn header(user: Option<&AuthUser>) -> Markup {
    html! {
        header {
            nav {
                ul {
                    li {
                        a href="/" {
                            strong { "ToothQuest" }
                        }
                    }
                }
                @if let Some(user) = user {
                    ul {
                        li { (super::components::nav_link(names::QUIZ_SETUP_URL, html! { "Quizzes" })) }
                        li { (super::components::nav_link(names::CALENDAR_URL, html! { "Calendar" })) }
                        li { (super::components::nav_link(names::PROFILE_URL, html! { "Profile" })) }
                        @if user.is_admin() {
                            li { (super::components::nav_link(names::ADMIN_USERS_URL, html! { "Users" })) }
                            li { (super::components::nav_link(names::ADMIN_QUESTIONS_URL, html! { "Questions" })) }
                            li { (super::components::nav_link(names::ADMIN_CODES_URL, html! { "Codes" })) }
                            li { (super::components::nav_link(names::ADMIN_ACCOUNTS_URL, html! { "Admins" })) }
                        }
                        li {
                            form hx-post=(names::LOGOUT_URL) style="display: inline;" {
                                button type="submit" class="secondary" { "Log out" }
                            }
                        }
                    }
                }
                ul {
                    li { (utils::VERSION) }
                }
            }
        }
    }
}

fn main_block(body: Markup) -> Markup {
    html! {
        main { (body) }
    }
}

pub fn page(title: &str, body: Markup, user: Option<&AuthUser>) -> Markup {
    html! {
        (DOCTYPE)
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            meta name="color-scheme" content="light dark";

            (css())
            (js())

            title { (format!("{title} - ToothQuest")) }
        }

        body {
            (header(user))
            (main_block(body))
        }
    }
}

pub fn titled(title: &str, body: Markup) -> Markup {
    html! {
        title { (title) " - ToothQuest" }
        (body)
    }
}
