use maud::{html, Markup};

use crate::names;

pub enum LoginState {
    NoError,
    InvalidCredentials,
    Pending,
    Blocked,
}

pub fn login(state: LoginState) -> Markup {
    html! {
        h1 { "Log in" }
        @match state {
            LoginState::NoError => {},
            LoginState::InvalidCredentials => { p class="error" { "Invalid email or password." } },
            LoginState::Pending => {
                p class="error" {
                    "Your account is awaiting activation. Redeem an access code or contact support."
                }
            },
            LoginState::Blocked => { p class="error" { "This account has been blocked." } },
        }
        form hx-post=(names::LOGIN_URL) hx-target="main" {
            label {
                "Email"
                input type="email" name="email" required;
            }
            label {
                "Password"
                input type="password" name="password" required;
            }
            button type="submit" { "Log in" }
        }
        p {
            "No account yet? "
            a href=(names::REGISTER_URL) hx-get=(names::REGISTER_URL) hx-target="main" { "Register" }
        }
    }
}

pub enum RegisterState {
    NoError,
    EmptyFields,
    WeakPassword,
    EmailTaken,
    CodeRejected(&'static str),
}

pub fn register(state: RegisterState) -> Markup {
    html! {
        h1 { "Create your account" }
        @match state {
            RegisterState::NoError => {},
            RegisterState::EmptyFields => { p class="error" { "Email, name, and password are required." } },
            RegisterState::WeakPassword => { p class="error" { "Password must be at least 8 characters." } },
            RegisterState::EmailTaken => { p class="error" { "That email is already registered." } },
            RegisterState::CodeRejected(reason) => {
                p class="error" {
                    "Account created, but the access code was refused: " (reason)
                    ". You can redeem a new code from your profile once activated."
                }
            },
        }
        form hx-post=(names::REGISTER_URL) hx-target="main" {
            label {
                "Email"
                input type="email" name="email" required;
            }
            label {
                "Full name"
                input type="text" name="full_name" required;
            }
            label {
                "University"
                input type="text" name="university";
            }
            label {
                "Year of study"
                select name="year" {
                    option value="" { "-" }
                    @for year in 1..=5 {
                        option value=(year) { (year) }
                    }
                }
            }
            label {
                "Password"
                input type="password" name="password" required minlength="8";
            }
            label {
                "Access code (optional)"
                input type="text" name="access_code" placeholder="TQ1-XXXXXX";
            }
            button type="submit" { "Register" }
        }
    }
}

pub fn registration_pending() -> Markup {
    html! {
        h1 { "Almost there" }
        p {
            "Your account was created and is awaiting activation. Redeem an "
            "access code at login or contact your administrator."
        }
        p { a href=(names::LOGIN_URL) hx-get=(names::LOGIN_URL) hx-target="main" { "Back to login" } }
    }
}
