//! Client for the authentication service
//!
//! Every call is a blocking JSON request with a 10 second timeout. Transport
//! problems never surface as errors: they come back as a failed
//! [`AuthOutcome`] whose message says what went wrong, so the login screen
//! can show it and carry on.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

/// Environment override for the service address
pub const AUTH_URL_ENV: &str = "AUTH_SERVICE_URL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of an auth call as shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            token: None,
        }
    }

    /// Fill in a message when the service sent none
    fn or_message(mut self, success: &str, failure: &str) -> Self {
        if self.message.is_empty() {
            self.message = if self.success { success } else { failure }.to_string();
        }
        self
    }
}

/// Identity carried by a valid token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    valid: bool,
    #[serde(flatten)]
    user: Option<AuthUser>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!("[AUTH] Falling back to default HTTP client: {}", err);
                Client::new()
            });
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `AUTH_SERVICE_URL` if set, otherwise `configured`
    pub fn from_env_or(configured: &str) -> Self {
        let url = std::env::var(AUTH_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| configured.to_string());
        Self::new(url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health(&self) -> bool {
        let url = self.url("/health");
        match self.client.get(&url).send() {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!("[AUTH] Health check failed: {}", err);
                false
            }
        }
    }

    /// Log in with a username or email
    pub fn login(&self, username_or_email: &str, password: &str) -> AuthOutcome {
        let body = LoginRequest {
            username: username_or_email,
            password,
        };
        let outcome = self
            .send(self.client.post(self.url("/auth/login")).json(&body))
            .or_message("Login successful", "Login failed");
        if outcome.success {
            info!("[AUTH] Logged in as {}", username_or_email);
        }
        outcome
    }

    pub fn register(&self, username: &str, email: &str, password: &str) -> AuthOutcome {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        self.send(self.client.post(self.url("/auth/register")).json(&body))
            .or_message("Registration successful", "Registration failed")
    }

    /// User behind `token`, `None` when invalid, expired or unreachable
    pub fn verify_token(&self, token: &str) -> Option<AuthUser> {
        let response = self
            .client
            .post(self.url("/auth/verify"))
            .json(&json!({ "token": token }))
            .send()
            .ok()?;
        let parsed: VerifyResponse = response.json().ok()?;
        if parsed.valid {
            parsed.user
        } else {
            None
        }
    }

    pub fn verify_email(&self, verification_token: &str) -> AuthOutcome {
        self.send(
            self.client
                .post(self.url("/auth/verify-email"))
                .json(&json!({ "token": verification_token })),
        )
        .or_message("Email verified successfully", "Email verification failed")
    }

    /// Always succeeds locally; the token is simply forgotten
    pub fn logout(&self, token: &str) -> AuthOutcome {
        let reply = self.send(
            self.client
                .post(self.url("/auth/logout"))
                .json(&json!({ "token": token })),
        );
        let message = if reply.success && !reply.message.is_empty() {
            reply.message
        } else {
            "Logged out successfully".to_string()
        };
        AuthOutcome {
            success: true,
            message,
            token: None,
        }
    }

    pub fn change_password(&self, token: &str, old_password: &str, new_password: &str) -> AuthOutcome {
        let body = ChangePasswordRequest {
            old_password,
            new_password,
        };
        self.send(
            self.client
                .post(self.url("/auth/change-password"))
                .bearer_auth(token)
                .json(&body),
        )
        .or_message("Password changed successfully", "Password change failed")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> AuthOutcome {
        let response = match request.send() {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return AuthOutcome::failed("Auth service request timed out.")
            }
            Err(err) if err.is_connect() => {
                return AuthOutcome::failed(format!(
                    "Cannot connect to auth service at {}. Make sure the service is running.",
                    self.base_url
                ))
            }
            Err(err) => return AuthOutcome::failed(format!("Auth service error: {err}")),
        };

        let status = response.status();
        match response.json::<AuthOutcome>() {
            Ok(outcome) if status.is_success() => outcome,
            Ok(outcome) => AuthOutcome {
                success: false,
                ..outcome
            },
            Err(_) => AuthOutcome::failed("Invalid response from auth service."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_defaults_missing_fields() {
        let outcome: AuthOutcome =
            serde_json::from_str(r#"{"success": true, "token": "abc"}"#).expect("valid json");
        let outcome = outcome.or_message("Login successful", "Login failed");
        assert!(outcome.success);
        assert_eq!(outcome.message, "Login successful");
        assert_eq!(outcome.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_verify_response_carries_user() {
        let parsed: VerifyResponse = serde_json::from_str(
            r#"{"valid": true, "username": "alice", "is_admin": false, "email": "a@b.c"}"#,
        )
        .expect("valid json");
        assert!(parsed.valid);
        assert_eq!(parsed.user.map(|u| u.username).as_deref(), Some("alice"));
    }

    #[test]
    fn test_unreachable_service_is_failed_outcome() {
        //! Nothing listens on port 9 locally; the call must fail softly
        let client = AuthClient::new("http://127.0.0.1:9/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
        let outcome = client.login("alice", "secret");
        assert!(!outcome.success);
        assert!(!outcome.message.is_empty());
        assert!(!client.health());
        assert_eq!(client.verify_token("abc"), None);
    }

    #[test]
    fn test_logout_always_succeeds() {
        let client = AuthClient::new("http://127.0.0.1:9");
        assert!(client.logout("abc").success);
    }
}
