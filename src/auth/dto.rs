use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for signup and login.
///
/// Fields default to empty so that a missing field surfaces as a validation
/// error with a readable message rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetLinkResponse {
    pub message: String,
    pub reset_link: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_password_request_uses_camel_case() {
        let req: ResetPasswordRequest =
            serde_json::from_str(r#"{"token":"t","newPassword":"pw"}"#).unwrap();
        assert_eq!(req.token, "t");
        assert_eq!(req.new_password, "pw");
    }

    #[test]
    fn missing_credentials_default_to_empty() {
        let req: CredentialsRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert!(req.password.is_empty());
    }

    #[test]
    fn reset_link_response_shape() {
        let json = serde_json::to_value(ResetLinkResponse {
            message: "m".into(),
            reset_link: "http://h/reset-password?token=t".into(),
        })
        .unwrap();
        assert_eq!(json["resetLink"], "http://h/reset-password?token=t");
        assert_eq!(json["message"], "m");
    }
}
