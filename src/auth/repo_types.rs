use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Public view of a `users` row. Has no password column at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub deleted_at: Option<OffsetDateTime>,
}

/// Full row including the hash, only ever read for login.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub role: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            fname: r.fname,
            lname: r.lname,
            email: r.email,
            bio: r.bio,
            phone: r.phone,
            profile_image: r.profile_image,
            role: r.role,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        }
    }
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub fname: String,
    pub lname: String,
    pub email: String,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Clone, Default, Deserialize)]
pub struct UserChanges {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for UserChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserChanges")
            .field("fname", &self.fname)
            .field("lname", &self.lname)
            .field("email", &self.email)
            .field("bio", &self.bio)
            .field("phone", &self.phone)
            .field("profile_image", &self.profile_image)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Equality filters and pagination for the admin listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub id: Option<Uuid>,
    pub email: Option<String>,
    pub fname: Option<String>,
    pub lname: Option<String>,
    /// `MM-DD-YYYY`; rows created strictly after midnight UTC of that day.
    pub created_after: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
