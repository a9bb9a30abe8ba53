use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user known to the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Login identifier
    pub username: String,
}

/// Outcome of a login check or of a session lookup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthStatus {
    /// Credentials matched a known user
    Authenticated { identity: Identity },
    /// Credentials or session token were presented and did not match
    Rejected,
    /// Nothing was presented yet
    Pending,
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated { .. })
    }
}

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login: the bearer token to send with later requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub status: AuthStatus,
    /// Seconds until the session expires
    pub expires_in_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_status_tagging() {
        let status = AuthStatus::Authenticated {
            identity: Identity {
                name: "Somchai P.".to_string(),
                username: "somchai".to_string(),
            },
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "authenticated");
        assert_eq!(json["identity"]["username"], "somchai");

        let pending = serde_json::to_value(&AuthStatus::Pending).unwrap();
        assert_eq!(pending, serde_json::json!({"status": "pending"}));
    }

    #[test]
    fn test_login_request_fields_default_to_empty() {
        let request: LoginRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, LoginRequest::default());
    }
}
