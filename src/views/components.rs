use maud::{html, Markup};

/// htmx navigation link with href fallback + hx-get for in-page swap.
pub fn nav_link(href: &str, body: Markup) -> Markup {
    html! {
        a href=(href)
          hx-get=(href)
          hx-target="main"
          hx-push-url="true"
          hx-swap="innerHTML" {
            (body)
        }
    }
}

/// Search box that refetches the surrounding list, debounced the way the
/// original debounced its filter inputs.
pub fn search_input(base_url: &str, name: &str, value: &str, placeholder: &str) -> Markup {
    html! {
        input type="search" name=(name) value=(value) placeholder=(placeholder)
              hx-get=(base_url)
              hx-target="main"
              hx-include="closest form"
              hx-trigger="keyup changed delay:300ms, search";
    }
}

/// Pagination controls for a server-side paginated list. `base_query` is
/// the current filter query string without the page parameter.
pub fn pagination(base_url: &str, base_query: &str, page: i64, total_pages: i64) -> Markup {
    html! {
        @if total_pages > 1 {
            nav class="pagination" {
                ul {
                    @if page > 1 {
                        li {
                            a hx-get=(format!("{base_url}?{base_query}&page={}", page - 1))
                              hx-target="main" { "Previous" }
                        }
                    }
                    li { (format!("Page {page} of {total_pages}")) }
                    @if page < total_pages {
                        li {
                            a hx-get=(format!("{base_url}?{base_query}&page={}", page + 1))
                              hx-target="main" { "Next" }
                        }
                    }
                }
            }
        }
    }
}

/// Confirm-dialog button: a native dialog opened per row, posting to
/// `action_url` only after the user confirms.
pub fn confirm_button(dialog_id: &str, label: &str, message: &str, action_url: &str) -> Markup {
    html! {
        button type="button"
               onclick=(format!("document.getElementById('{dialog_id}').showModal()")) {
            (label)
        }
        dialog id=(dialog_id) {
            article {
                p { (message) }
                footer {
                    button type="button" class="secondary"
                           onclick=(format!("document.getElementById('{dialog_id}').close()")) {
                        "Cancel"
                    }
                    button hx-post=(action_url) hx-target="main" { (label) }
                }
            }
        }
    }
}

/// Status badge shared by the users and codes tables.
pub fn status_badge(status: &str) -> Markup {
    html! {
        span class=(format!("badge badge-{status}")) { (status) }
    }
}
