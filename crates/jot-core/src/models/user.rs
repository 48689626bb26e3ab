//! User and authentication payloads

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp_to_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// `HOST`, `ADMIN` or `USER`; kept as text so new server roles still decode
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "nickname")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl User {
    /// Display name when set, username otherwise
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.created_ts)
    }
}

#[derive(Clone, Serialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SignInRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for SignInResponse {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SignInResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_decodes_nickname_as_display_name() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"username":"alice","role":"HOST","nickname":"Alice","email":null,
                "createdTs":1700000000,"updatedTs":1700000000}"#,
        )
        .unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(user.label(), "Alice");
        assert_eq!(user.avatar_url, None);
    }

    #[test]
    fn label_falls_back_to_username() {
        let user: User = serde_json::from_str(
            r#"{"id":2,"username":"bob","role":"USER","nickname":"  ",
                "createdTs":0,"updatedTs":0}"#,
        )
        .unwrap();
        assert_eq!(user.label(), "bob");
    }

    #[test]
    fn sign_in_debug_redacts_secrets() {
        let request = SignInRequest {
            username: "alice".to_string(),
            password: "secret-password".to_string(),
        };
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("secret-password"));
        assert!(rendered.contains("[REDACTED]"));

        let response: SignInResponse = serde_json::from_str(
            r#"{"token":"secret-token","user":{"id":1,"username":"alice","role":"USER",
                "createdTs":0,"updatedTs":0}}"#,
        )
        .unwrap();
        assert!(!format!("{response:?}").contains("secret-token"));
    }
}
