use maud::{html, Markup};

use crate::db::models::AdminAccountRow;
use crate::names;

use super::components;

pub struct AdminsData {
    pub accounts: Vec<AdminAccountRow>,
    pub error: Option<&'static str>,
}

pub fn admins(data: AdminsData) -> Markup {
    html! {
        h1 { "Admin Accounts" }
        @if let Some(error) = data.error {
            p class="error" { (error) }
        }

        (create_form())

        table {
            thead {
                tr {
                    th { "Email" }
                    th { "Name" }
                    th { "Role" }
                    th { "Permissions" }
                    th { "Actions" }
                }
            }
            tbody {
                @for account in &data.accounts {
                    tr {
                        td { (account.email) }
                        td { (account.full_name) }
                        td { (account.role) }
                        td {
                            @let permissions = account.permission_list();
                            @if account.role == "super_admin" {
                                em { "all (" (permissions.len()) ")" }
                            } @else {
                                (permissions.join(", "))
                            }
                        }
                        td {
                            details {
                                summary { "Edit" }
                                form hx-post=(names::admin_account_url(account.id)) hx-target="main" {
                                    @let current = account.permission_list();
                                    label {
                                        "Role"
                                        select name="role" {
                                            @for role in names::ADMIN_ROLES {
                                                option value=(role) selected[account.role == *role] { (role) }
                                            }
                                        }
                                    }
                                    fieldset {
                                        @for (key, label_text) in names::PERMISSIONS {
                                            label {
                                                input type="checkbox" name="permissions" value=(key)
                                                      checked[current.iter().any(|p| p == key)];
                                                (label_text)
                                            }
                                        }
                                    }
                                    button type="submit" { "Save" }
                                }
                            }
                            (components::confirm_button(
                                &format!("delete-admin-{}", account.id),
                                "Remove",
                                "Remove this admin account? The user reverts to a student.",
                                &format!("{}/delete", names::admin_account_url(account.id)),
                            ))
                        }
                    }
                }
            }
        }

        @if data.accounts.is_empty() {
            p { "No admin accounts yet." }
        }
    }
}

fn create_form() -> Markup {
    html! {
        details {
            summary { "Add admin account" }
            form hx-post=(names::ADMIN_ACCOUNTS_URL) hx-target="main" {
                label {
                    "User email"
                    input type="email" name="email" required;
                }
                label {
                    "Role"
                    select name="role" {
                        @for role in names::ADMIN_ROLES {
                            option value=(role) { (role) }
                        }
                    }
                }
                fieldset {
                    legend { "Permissions (ignored for super_admin)" }
                    @for (key, label_text) in names::PERMISSIONS {
                        label {
                            input type="checkbox" name="permissions" value=(key);
                            (label_text)
                        }
                    }
                }
                button type="submit" { "Create admin" }
            }
        }
    }
}
