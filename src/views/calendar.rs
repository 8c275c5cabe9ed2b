use maud::{html, Markup};

use crate::db::models::CalendarEventRow;
use crate::names;

use super::components;

pub struct CalendarData {
    pub events: Vec<CalendarEventRow>,
    pub search: String,
    pub event_type: String,
    pub priority: String,
    pub upcoming_only: bool,
    pub hide_completed: bool,
    pub tag: String,
}

pub fn calendar(data: CalendarData) -> Markup {
    html! {
        h1 { "Study Calendar" }

        (create_form())

        form {
            (components::search_input(names::CALENDAR_URL, "search", &data.search, "Search events"))
            select name="event_type"
                   hx-get=(names::CALENDAR_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.event_type.is_empty()] { "All types" }
                @for event_type in names::EVENT_TYPES {
                    option value=(event_type) selected[data.event_type == *event_type] { (event_type) }
                }
            }
            select name="priority"
                   hx-get=(names::CALENDAR_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.priority.is_empty()] { "All priorities" }
                @for priority in names::EVENT_PRIORITIES {
                    option value=(priority) selected[data.priority == *priority] { (priority) }
                }
            }
            input type="text" name="tag" value=(data.tag) placeholder="Tag"
                  hx-get=(names::CALENDAR_URL) hx-target="main" hx-include="closest form"
                  hx-trigger="keyup changed delay:300ms";
            label {
                input type="checkbox" name="upcoming" value="true" checked[data.upcoming_only]
                      hx-get=(names::CALENDAR_URL) hx-target="main" hx-include="closest form";
                "Upcoming only"
            }
            label {
                input type="checkbox" name="hide_completed" value="true" checked[data.hide_completed]
                      hx-get=(names::CALENDAR_URL) hx-target="main" hx-include="closest form";
                "Hide completed"
            }
        }

        @if data.events.is_empty() {
            p { "No events match the current filters." }
        }

        @for event in &data.events {
            article class=(format!("event event-{} priority-{}", event.event_type, event.priority)) {
                header {
                    strong { (event.title) }
                    span class="badge" { (event.event_type) }
                    span class="badge" { (event.priority) }
                    @if event.is_completed {
                        span class="badge badge-correct" { "done" }
                    }
                }
                p { (event.event_date.format("%Y-%m-%d %H:%M")) }
                @if !event.location.is_empty() {
                    p { (event.location) }
                }
                @if !event.description.is_empty() {
                    p { (event.description) }
                }
                @let tags = event.tag_list();
                @if !tags.is_empty() {
                    p {
                        @for tag in &tags {
                            span class="badge" { (tag) } " "
                        }
                    }
                }
                footer {
                    button hx-post=(names::calendar_toggle_url(event.id)) hx-target="main" {
                        @if event.is_completed { "Mark open" } @else { "Mark done" }
                    }
                    (components::confirm_button(
                        &format!("delete-event-{}", event.id),
                        "Delete",
                        "Delete this event?",
                        &format!("{}/delete", names::calendar_event_url(event.id)),
                    ))
                }
                details {
                    summary { "Edit" }
                    form hx-post=(names::calendar_event_url(event.id)) hx-target="main" {
                        label {
                            "Title"
                            input type="text" name="title" value=(event.title) required;
                        }
                        label {
                            "Date"
                            input type="datetime-local" name="event_date"
                                  value=(event.event_date.format("%Y-%m-%dT%H:%M")) required;
                        }
                        label {
                            "Type"
                            select name="event_type" {
                                @for event_type in names::EVENT_TYPES {
                                    option value=(event_type)
                                           selected[event.event_type == *event_type] { (event_type) }
                                }
                            }
                        }
                        label {
                            "Priority"
                            select name="priority" {
                                @for priority in names::EVENT_PRIORITIES {
                                    option value=(priority)
                                           selected[event.priority == *priority] { (priority) }
                                }
                            }
                        }
                        label {
                            "Location"
                            input type="text" name="location" value=(event.location);
                        }
                        label {
                            "Description"
                            textarea name="description" { (event.description) }
                        }
                        label {
                            "Tags (comma separated)"
                            input type="text" name="tags" value=(tags.join(", "));
                        }
                        label {
                            input type="checkbox" name="reminder_enabled" value="true"
                                  checked[event.reminder_enabled];
                            "Reminder"
                        }
                        button type="submit" { "Save" }
                    }
                }
            }
        }
    }
}

fn create_form() -> Markup {
    html! {
        details {
            summary { "Add event" }
            form hx-post=(names::CALENDAR_URL) hx-target="main" {
                label {
                    "Title"
                    input type="text" name="title" required;
                }
                label {
                    "Date"
                    input type="datetime-local" name="event_date" required;
                }
                label {
                    "Type"
                    select name="event_type" {
                        @for event_type in names::EVENT_TYPES {
                            option value=(event_type) { (event_type) }
                        }
                    }
                }
                label {
                    "Priority"
                    select name="priority" {
                        @for priority in names::EVENT_PRIORITIES {
                            option value=(priority) selected[*priority == "medium"] { (priority) }
                        }
                    }
                }
                label {
                    "Location"
                    input type="text" name="location";
                }
                label {
                    "Description"
                    textarea name="description" {}
                }
                label {
                    "Tags (comma separated)"
                    input type="text" name="tags";
                }
                label {
                    input type="checkbox" name="reminder_enabled" value="true" checked;
                    "Reminder"
                }
                button type="submit" { "Add event" }
            }
        }
    }
}
