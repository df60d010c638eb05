use axum::{
    extract::State,
    routing::{patch, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, RegisterRequest,
            UpdateUserRequest, UserResponse, VerifyEmailRequest, VerifyEmailResponse,
        },
        error::UserResult,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/verify-email", post(verify_email))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", patch(update_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = state.auth.register(payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = state.auth.login(payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> UserResult<Json<ForgotPasswordResponse>> {
    state.auth.forgot_password(payload).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = state.auth.update_user(payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> UserResult<Json<VerifyEmailResponse>> {
    state.auth.verify_email(payload).await.map(Json)
}
