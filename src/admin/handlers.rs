use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    admin::dto::{DeleteUserResponse, GetAllUsersQuery, GetAllUsersResponse},
    auth::{
        dto::{RegisterRequest, UserResponse},
        error::UserResult,
        repo_types::UserFilter,
    },
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(get_all_users).post(create_user))
        .route("/admin/users/:id", get(get_user).delete(delete_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = state.auth.create_user(payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> UserResult<Json<UserResponse>> {
    let user = state.auth.get_user(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_all_users(
    State(state): State<AppState>,
    Query(query): Query<GetAllUsersQuery>,
) -> UserResult<Json<GetAllUsersResponse>> {
    let filter = UserFilter::try_from(query)?;
    let (users, total_count) = state.auth.get_all_users(filter).await?;
    Ok(Json(GetAllUsersResponse { users, total_count }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> UserResult<Json<DeleteUserResponse>> {
    state.auth.delete_user(id).await?;
    Ok(Json(DeleteUserResponse {
        message: "Success".into(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState};

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn admin_lifecycle() {
        let app = build_app(AppState::fake());

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/admin/users",
            Some(json!({"fname": "Grace", "lname": "Hopper", "email": "g@x.com", "password": "cobol"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["user"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(&app, "GET", &format!("/api/v1/admin/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "g@x.com");

        let (status, body) = call(&app, "GET", "/api/v1/admin/users?limit=10&email=g@x.com", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["users"].as_array().unwrap().len(), 1);

        let (status, body) = call(&app, "DELETE", &format!("/api/v1/admin/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Success");

        let (_, body) = call(&app, "GET", "/api/v1/admin/users", None).await;
        assert_eq!(body["total_count"], 0);

        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": "g@x.com", "password": "cobol"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_bad_date_is_bad_request() {
        let app = build_app(AppState::fake());

        let (status, body) = call(
            &app,
            "GET",
            &format!("/api/v1/admin/users/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found");

        let (status, _) = call(&app, "GET", "/api/v1/admin/users?created_at=2024-13-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_query_values_do_not_filter() {
        let app = build_app(AppState::fake());
        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/admin/users",
            Some(json!({"fname": "Ada", "lname": "Lovelace", "email": "a@x.com", "password": "secret"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/admin/users?fname=Ada&email=&created_at=&id=&limit=&offset=",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["users"].as_array().unwrap().len(), 1);
        assert_eq!(body["users"][0]["email"], "a@x.com");

        let (status, _) = call(&app, "GET", "/api/v1/admin/users?limit=many", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
