use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{
    error::{UserError, UserResult},
    repo_types::{User, UserFilter},
};

/// Query string for the admin listing. Every field is optional and a blank
/// value (`?email=`) counts as absent.
#[derive(Debug, Default, Deserialize)]
pub struct GetAllUsersQuery {
    pub id: Option<String>,
    pub email: Option<String>,
    pub fname: Option<String>,
    pub lname: Option<String>,
    /// `MM-DD-YYYY`
    pub created_at: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_i64(name: &str, value: Option<String>) -> UserResult<Option<i64>> {
    present(value)
        .map(|v| {
            v.trim()
                .parse::<i64>()
                .map_err(|e| UserError::Validation(format!("invalid {}: {}", name, e)))
        })
        .transpose()
}

impl TryFrom<GetAllUsersQuery> for UserFilter {
    type Error = UserError;

    fn try_from(q: GetAllUsersQuery) -> UserResult<Self> {
        let id = present(q.id)
            .map(|v| Uuid::parse_str(v.trim()))
            .transpose()
            .map_err(|e| UserError::Validation(format!("invalid id: {}", e)))?;
        Ok(UserFilter {
            id,
            email: present(q.email),
            fname: present(q.fname),
            lname: present(q.lname),
            created_after: present(q.created_at),
            limit: parse_i64("limit", q.limit)?,
            offset: parse_i64("offset", q.offset)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetAllUsersResponse {
    pub users: Vec<User>,
    pub total_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_maps_onto_filter() {
        let id = Uuid::new_v4();
        let filter = UserFilter::try_from(GetAllUsersQuery {
            id: Some(id.to_string()),
            created_at: Some("03-15-2024".into()),
            limit: Some("10".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.id, Some(id));
        assert_eq!(filter.created_after.as_deref(), Some("03-15-2024"));
        assert_eq!(filter.limit, Some(10));
        assert!(filter.offset.is_none());
    }

    #[test]
    fn malformed_id_is_validation_error() {
        let err = UserFilter::try_from(GetAllUsersQuery {
            id: Some("42".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }

    #[test]
    fn blank_values_are_absent() {
        let filter = UserFilter::try_from(GetAllUsersQuery {
            id: Some(String::new()),
            email: Some("".into()),
            fname: Some("Ada".into()),
            lname: Some("  ".into()),
            created_at: Some(String::new()),
            limit: Some(String::new()),
            offset: Some(" ".into()),
        })
        .unwrap();
        assert!(filter.id.is_none());
        assert!(filter.email.is_none());
        assert_eq!(filter.fname.as_deref(), Some("Ada"));
        assert!(filter.lname.is_none());
        assert!(filter.created_after.is_none());
        assert!(filter.limit.is_none());
        assert!(filter.offset.is_none());
    }

    #[test]
    fn non_numeric_limit_is_validation_error() {
        let err = UserFilter::try_from(GetAllUsersQuery {
            limit: Some("ten".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }
}
