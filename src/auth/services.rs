use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::dto::{
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, RegisterRequest,
    UpdateUserRequest, VerifyEmailRequest, VerifyEmailResponse,
};
use crate::auth::error::{UserError, UserResult};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User, UserFilter};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    // Verified against when the email is unknown, so both login failures cost the same.
    static ref DUMMY_HASH: Option<String> = hash_password("dummy-password-for-timing").ok();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Use cases for end users and admins over a [`UserStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        lazy_static::initialize(&DUMMY_HASH);
        Self { store }
    }

    #[instrument(skip(self, req))]
    pub async fn login(&self, req: LoginRequest) -> UserResult<User> {
        let email = normalize_email(&req.email);

        let Some(record) = self.store.find_active_by_email(&email).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(&req.password, dummy);
            }
            warn!("login unknown email");
            return Err(UserError::Unauthorized);
        };

        if !verify_password(&req.password, &record.password_hash)? {
            warn!(user_id = %record.id, "login invalid password");
            return Err(UserError::Unauthorized);
        }

        info!(user_id = %record.id, "user logged in");
        Ok(record.into())
    }

    /// Uniqueness is left to the store constraint and surfaces as `Database`.
    #[instrument(skip(self, req))]
    pub async fn register(&self, req: RegisterRequest) -> UserResult<User> {
        let RegisterRequest {
            fname,
            lname,
            email,
            password,
        } = req;
        let email = normalize_email(&email);
        let fname = fname.trim().to_string();
        let lname = lname.trim().to_string();

        if !is_valid_email(&email) {
            return Err(UserError::Validation("Invalid email".into()));
        }
        if fname.is_empty() || lname.is_empty() {
            return Err(UserError::Validation("fname and lname are required".into()));
        }
        if password.is_empty() {
            return Err(UserError::Validation("password is required".into()));
        }

        let user = self
            .store
            .create(NewUser { fname, lname, email }, &password)
            .await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    #[instrument(skip(self, _req))]
    pub async fn forgot_password(
        &self,
        _req: ForgotPasswordRequest,
    ) -> UserResult<ForgotPasswordResponse> {
        Err(UserError::Unimplemented("ForgotPassword"))
    }

    #[instrument(skip(self, req), fields(user_id = %req.id))]
    pub async fn update_user(&self, req: UpdateUserRequest) -> UserResult<User> {
        let UpdateUserRequest { id, mut changes } = req;

        if let Some(email) = changes.email.take() {
            let email = normalize_email(&email);
            if !is_valid_email(&email) {
                return Err(UserError::Validation("Invalid email".into()));
            }
            changes.email = Some(email);
        }
        if changes.password.as_deref() == Some("") {
            return Err(UserError::Validation("password cannot be empty".into()));
        }

        let user = self.store.update(id, changes).await?;
        info!("user updated");
        Ok(user)
    }

    #[instrument(skip(self, _req))]
    pub async fn verify_email(&self, _req: VerifyEmailRequest) -> UserResult<VerifyEmailResponse> {
        Err(UserError::Unimplemented("VerifyEmail"))
    }

    /// Admin create. Same validation and hashing as [`AuthService::register`].
    pub async fn create_user(&self, req: RegisterRequest) -> UserResult<User> {
        self.register(req).await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.store.get_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_all_users(&self, mut filter: UserFilter) -> UserResult<(Vec<User>, i64)> {
        filter.email = filter.email.as_deref().map(normalize_email);
        self.store.list(filter).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        self.store.soft_delete(id).await?;
        info!(user_id = %id, "user soft-deleted");
        Ok(())
    }
}
