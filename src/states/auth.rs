//! Login and registration
//!
//! Runs before the main menu when `require_login` is set and the client is
//! not offline. Leaves with a [`UserSession`] on `app.user`, or exits.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use super::{App, AppState, UserSession};
use crate::core::palette::Palette;
use crate::networking::auth::AuthClient;
use crate::ui::console::Console;

pub const MIN_PASSWORD_LEN: usize = 8;

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").expect("valid regex"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

pub fn is_valid_username(username: &str) -> bool {
    USERNAME.is_match(username)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn run(app: &mut App, console: &mut dyn Console) -> AppState {
    let Some(client) = app.auth.as_ref() else {
        return AppState::MainMenu;
    };
    let palette = &app.palette;

    if !client.health() {
        warn!("[AUTH] Service at {} is not responding", client.base_url());
        console.print(&palette.error(&format!(
            "The auth service at {} is not responding.",
            client.base_url()
        )));
    }

    loop {
        console.print(&palette.title("--- Authentication Required ---"));
        console.print("  1: Login");
        console.print("  2: Register New Account");
        console.print("  3: Verify Email");
        console.print("  q: Quit Application");
        let Some(answer) = console.read_line(&palette.prompt("Enter your choice: ")) else {
            return AppState::Exit;
        };

        match answer.trim().to_ascii_lowercase().as_str() {
            "1" => {
                if let Some(user) = login(client, palette, console) {
                    info!("[AUTH] {} logged in", user.username);
                    app.user = Some(user);
                    return AppState::MainMenu;
                }
            }
            "2" => register(client, palette, console),
            "3" => verify_email(client, palette, console),
            "q" => return AppState::Exit,
            _ => console.print(&palette.error("Invalid choice. Please try again.")),
        }
    }
}

fn login(client: &AuthClient, palette: &Palette, console: &mut dyn Console) -> Option<UserSession> {
    console.print(&palette.title("--- Login ---"));
    let username = console.read_line("Username or Email: ")?;
    let password = console.read_line("Password: ")?;

    let outcome = client.login(username.trim(), &password);
    if !outcome.success {
        console.print(&palette.error(&outcome.message));
        return None;
    }
    console.print(&palette.success(&outcome.message));

    let token = outcome.token?;
    let username = client
        .verify_token(&token)
        .map(|user| user.username)
        .unwrap_or_else(|| username.trim().to_string());
    Some(UserSession { username, token })
}

fn register(client: &AuthClient, palette: &Palette, console: &mut dyn Console) {
    console.print(&palette.title("--- Register New Account ---"));

    let Some(username) = prompt_until(
        console,
        palette,
        "Username (3-20 characters, letters, numbers, underscores only): ",
        "Invalid username format. Please try again.",
        is_valid_username,
    ) else {
        return;
    };
    let Some(email) = prompt_until(
        console,
        palette,
        "Email address: ",
        "Invalid email format. Please try again.",
        is_valid_email,
    ) else {
        return;
    };

    let password = loop {
        let Some(password) = console.read_line("Password: ") else {
            return;
        };
        let Some(confirm) = console.read_line("Confirm password: ") else {
            return;
        };
        if password != confirm {
            console.print(&palette.error("Passwords don't match. Please try again."));
        } else if password.chars().count() < MIN_PASSWORD_LEN {
            console.print(&palette.error(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        } else {
            break password;
        }
    };

    let outcome = client.register(&username, &email, &password);
    if outcome.success {
        console.print(&palette.success(&outcome.message));
    } else {
        console.print(&palette.error(&outcome.message));
    }
}

fn verify_email(client: &AuthClient, palette: &Palette, console: &mut dyn Console) {
    let Some(token) = console.read_line("Enter verification token from email: ") else {
        return;
    };
    let outcome = client.verify_email(token.trim());
    if outcome.success {
        console.print(&palette.success(&outcome.message));
    } else {
        console.print(&palette.error(&outcome.message));
    }
}

fn prompt_until(
    console: &mut dyn Console,
    palette: &Palette,
    prompt: &str,
    error: &str,
    valid: fn(&str) -> bool,
) -> Option<String> {
    loop {
        let answer = console.read_line(prompt)?;
        let answer = answer.trim();
        if valid(answer) {
            return Some(answer.to_string());
        }
        console.print(&palette.error(error));
    }
}
