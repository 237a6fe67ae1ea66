//! Transport adapter for the four remote mail endpoints.
//!
//! Every operation hands back a reply value and never fails: network and
//! decoding problems are folded into `{success: false, error: "Connection error"}`
//! while errors reported by the service pass through untouched.

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::credentials::Credentials;
use crate::domain::email::Message;

pub const CONNECTION_ERROR: &str = "Connection error";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network unreachable, timeout, unreadable body. Detail is for logs only.
    #[error("Connection error")]
    Transport(String),
    /// Failure reported by the mail service itself.
    #[error("{0}")]
    Application(String),
}

/// Common shape of every endpoint response.
pub trait Reply: DeserializeOwned {
    type Data;

    fn failed(message: String) -> Self;
    fn succeeded(&self) -> bool;
    fn error(&self) -> Option<&str>;
    fn into_data(self) -> Self::Data;

    /// `fallback` is used when the service reports failure without a message.
    fn into_result(self, fallback: &str) -> Result<Self::Data, ApiError> {
        if self.succeeded() {
            return Ok(self.into_data());
        }
        Err(match self.error() {
            Some(CONNECTION_ERROR) => ApiError::Transport(CONNECTION_ERROR.to_string()),
            Some(msg) if !msg.trim().is_empty() => ApiError::Application(msg.to_string()),
            _ => ApiError::Application(fallback.to_string()),
        })
    }
}

/// `{success, error?}`, returned by authenticate and send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }
}

impl Reply for StatusReply {
    type Data = ();

    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
        }
    }
    fn succeeded(&self) -> bool {
        self.success
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn into_data(self) {}
}

/// `{success, error?, email?}`; `email` is the mailbox address the service assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Reply for RegisterReply {
    type Data = Option<String>;

    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            email: None,
        }
    }
    fn succeeded(&self) -> bool {
        self.success
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn into_data(self) -> Option<String> {
        self.email
    }
}

/// `{success, error?, emails?}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<Message>>,
}

impl FetchReply {
    pub fn with_emails(emails: Vec<Message>) -> Self {
        Self {
            success: true,
            error: None,
            emails: Some(emails),
        }
    }
}

impl Reply for FetchReply {
    type Data = Vec<Message>;

    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            emails: None,
        }
    }
    // A success flag without a message list is not usable.
    fn succeeded(&self) -> bool {
        self.success && self.emails.is_some()
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn into_data(self) -> Vec<Message> {
        self.emails.unwrap_or_default()
    }
}

pub trait MailTransport: Send + Sync {
    fn register(&self, full_name: &str, email: &str, password: &str) -> RegisterReply;
    fn authenticate(&self, credentials: &Credentials) -> StatusReply;
    fn fetch_messages(&self, credentials: &Credentials, folder: &str, limit: u32) -> FetchReply;
    fn send_message(
        &self,
        credentials: &Credentials,
        to: &str,
        subject: &str,
        body: &str,
    ) -> StatusReply;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_without_success_field_is_a_failure() {
        let r: StatusReply = serde_json::from_str(r#"{"error": "Authentication required"}"#).unwrap();
        assert_eq!(
            r.into_result("fallback"),
            Err(ApiError::Application("Authentication required".into()))
        );
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        let r: StatusReply = serde_json::from_str(r#"{"success": false}"#).unwrap();
        let err = r.into_result("Invalid email or password").unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn connection_error_maps_to_transport_kind() {
        let err = StatusReply::failed(CONNECTION_ERROR.into())
            .into_result("x")
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.to_string(), "Connection error");
    }

    #[test]
    fn fetch_success_without_emails_is_not_usable() {
        let r: FetchReply = serde_json::from_str(r#"{"success": true}"#).unwrap();
        let err = r.into_result("Failed to load messages").unwrap_err();
        assert_eq!(err, ApiError::Application("Failed to load messages".into()));
    }

    #[test]
    fn register_reply_carries_assigned_email() {
        let r: RegisterReply =
            serde_json::from_str(r#"{"success": true, "email": "ivan@nargizamail.ru"}"#).unwrap();
        assert_eq!(r.into_result("x").unwrap().as_deref(), Some("ivan@nargizamail.ru"));
    }
}
