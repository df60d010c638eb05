use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::{User, UserChanges};

/// Request body for user registration (also used by admin create).
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("fname", &self.fname)
            .field("lname", &self.lname)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Request body for login.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
}

/// Partial profile update. Omitted or `null` fields stay as they are.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub changes: UserChanges,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyEmailResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub message: String,
}

/// Every single-user response: register, login, update, admin create/get.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self { user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            fname: "Ada".into(),
            lname: "Lovelace".into(),
            email: "a@x.com".into(),
            bio: None,
            phone: Some("".into()),
            profile_image: None,
            role: "user".into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn user_response_has_no_password_field() {
        let json = serde_json::to_string(&UserResponse::from(sample_user())).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("deleted_at"));
    }

    #[test]
    fn update_request_distinguishes_absent_from_empty() {
        let id = Uuid::new_v4();
        let body = format!(r#"{{"id":"{}","bio":"","phone":null}}"#, id);
        let req: UpdateUserRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.id, id);
        assert_eq!(req.changes.bio.as_deref(), Some(""));
        assert!(req.changes.phone.is_none());
        assert!(req.changes.fname.is_none());
    }

    #[test]
    fn debug_output_hides_passwords() {
        let register = format!(
            "{:?}",
            RegisterRequest {
                fname: "Ada".into(),
                lname: "Lovelace".into(),
                email: "a@x.com".into(),
                password: "hunter2".into(),
            }
        );
        let login = format!(
            "{:?}",
            LoginRequest {
                email: "a@x.com".into(),
                password: "hunter2".into(),
            }
        );
        let update = format!(
            "{:?}",
            UpdateUserRequest {
                id: Uuid::new_v4(),
                changes: UserChanges {
                    bio: Some("hi".into()),
                    password: Some("hunter2".into()),
                    ..Default::default()
                },
            }
        );
        for out in [register, login, update] {
            assert!(!out.contains("hunter2"), "{out}");
            assert!(out.contains("<redacted>"), "{out}");
        }
    }

    #[test]
    fn verify_email_response_shape() {
        let json = serde_json::to_value(VerifyEmailResponse {
            access_token: String::new(),
            refresh_token: String::new(),
            expires_in: String::new(),
            message: "pending".into(),
        })
        .unwrap();
        for key in ["access_token", "refresh_token", "expires_in", "message"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
