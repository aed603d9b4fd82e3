//! API DTOs (Data Transfer Objects)
//!
//! Request fields are optional so that a missing field is reported by the
//! use case (400 with its own message) instead of a generic parse error.

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::UserProfile;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

/// Body of the endpoints that only take an address
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserData {
    pub user: UserProfile,
}

/// `{ status, token?, message?, data: { user } }`
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: UserData,
}

impl AuthResponse {
    pub fn with_token(profile: UserProfile, token: String) -> Self {
        Self {
            status: kernel::envelope::SUCCESS,
            token: Some(token),
            message: None,
            data: UserData { user: profile },
        }
    }

    pub fn with_message(profile: UserProfile, message: impl Into<String>) -> Self {
        Self {
            status: kernel::envelope::SUCCESS,
            token: None,
            message: Some(message.into()),
            data: UserData { user: profile },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersData {
    /// Profiles after projection
    pub users: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::fixtures;

    #[test]
    fn test_sign_up_request_is_camel_case() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"name":"Jane","email":"j@x.io","password":"p","passwordConfirm":"p"}"#,
        )
        .unwrap();
        assert_eq!(req.password_confirm.as_deref(), Some("p"));

        let empty: SignUpRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.name.is_none());
    }

    #[test]
    fn test_auth_response_never_leaks_secrets() {
        let user = fixtures::user("jane@example.com");
        let body =
            serde_json::to_value(AuthResponse::with_token(user.profile(), "t".into())).unwrap();

        assert_eq!(body["status"], "success");
        assert_eq!(body["token"], "t");
        assert!(body.get("message").is_none());
        let user = body["data"]["user"].as_object().unwrap();
        for key in user.keys() {
            let key = key.to_lowercase();
            assert!(!key.contains("password") || key == "passwordchangedat", "{key}");
            assert!(!key.contains("otp") && !key.contains("token"), "{key}");
        }
    }
}
