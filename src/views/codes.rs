use maud::{html, Markup};

use crate::db::models::{AccessCodeRow, CodeStatistics, Page};
use crate::names;
use crate::services::codes::package_price;

use super::components;

pub struct CodesData {
    pub page: Page<AccessCodeRow>,
    pub stats: CodeStatistics,
    pub search: String,
    pub status: String,
    pub package: String,
}

pub fn codes(data: CodesData) -> Markup {
    let base_query = format!(
        "search={}&status={}&package={}",
        data.search, data.status, data.package,
    );

    html! {
        h1 { "Access Codes" }

        div class="stats-strip" {
            span { strong { (data.stats.total) } " total" }
            span { strong { (data.stats.unused) } " unused" }
            span { strong { (data.stats.used) } " used" }
            span { strong { (data.stats.expired) } " expired" }
        }

        (generate_form())

        form {
            (components::search_input(names::ADMIN_CODES_URL, "search", &data.search, "Search codes"))
            select name="status"
                   hx-get=(names::ADMIN_CODES_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.status.is_empty()] { "All statuses" }
                @for status in ["unused", "used", "expired"] {
                    option value=(status) selected[data.status == status] { (status) }
                }
            }
            select name="package"
                   hx-get=(names::ADMIN_CODES_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.package.is_empty()] { "All packages" }
                @for (name, _, _) in names::PACKAGES {
                    option value=(name) selected[data.package == *name] { (name) }
                }
            }
            a href=(format!("{}?package={}", names::DOWNLOAD_CODES_URL, data.package)) {
                "Download codes"
            }
        }

        table {
            thead {
                tr {
                    th { "Code" }
                    th { "Package" }
                    th { "Price" }
                    th { "Status" }
                    th { "Created" }
                    th { "Actions" }
                }
            }
            tbody {
                @for code in &data.page.items {
                    tr {
                        td { code { (code.code) } }
                        td { (code.package) }
                        td {
                            @match package_price(&code.package) {
                                Some(price) => { (price) " DA" },
                                None => { "-" },
                            }
                        }
                        td { (components::status_badge(&code.status)) }
                        td { (code.created_at.format("%Y-%m-%d")) }
                        td {
                            @if code.status == "unused" {
                                (components::confirm_button(
                                    &format!("expire-code-{}", code.id),
                                    "Expire",
                                    "Expire this access code? This action cannot be undone.",
                                    &names::expire_code_url(code.id),
                                ))
                            }
                        }
                    }
                }
            }
        }

        @if data.page.items.is_empty() {
            p { "No codes match the current filters." }
        }

        (components::pagination(names::ADMIN_CODES_URL, &base_query, data.page.page, data.page.total_pages()))
    }
}

fn generate_form() -> Markup {
    html! {
        details {
            summary { "Generate codes" }
            form hx-post=(names::GENERATE_CODES_URL) hx-target="main" {
                label {
                    "Package"
                    select name="package" required {
                        option value="" { "Choose a package..." }
                        @for (name, price, _) in names::PACKAGES {
                            option value=(name) { (name) " - " (price) " DA" }
                        }
                    }
                }
                label {
                    "Number of codes"
                    input type="number" name="count" value="10" min="1"
                          max=(names::MAX_CODES_PER_BATCH);
                }
                button type="submit" { "Generate" }
            }
        }
    }
}

pub enum GenerateNotice {
    Generated(usize),
    UnknownPackage,
    InvalidCount,
}

pub fn generate_notice(notice: &GenerateNotice) -> Markup {
    html! {
        @match notice {
            GenerateNotice::Generated(count) => {
                p class="notice" {
                    (count) " codes generated. The download starts from the codes list."
                }
            },
            GenerateNotice::UnknownPackage => { p class="error" { "Please select a package." } },
            GenerateNotice::InvalidCount => {
                p class="error" {
                    "Between 1 and " (names::MAX_CODES_PER_BATCH) " codes can be generated at once."
                }
            },
        }
    }
}
