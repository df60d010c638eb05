use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::QueryAs, PgPool, Postgres};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::auth::error::{UserError, UserResult};
use crate::auth::password::hash_password;
use crate::auth::query::{count_active, BuiltQuery, FilterQueryBuilder, PartialUpdateBuilder, SqlArg};
use crate::auth::repo_types::{NewUser, User, UserChanges, UserFilter, UserRecord};

const TABLE: &str = "users";

const PUBLIC_COLUMNS: &str =
    "id, fname, lname, email, bio, phone, profile_image, role, created_at, updated_at, deleted_at";

const RECORD_COLUMNS: &str = "id, fname, lname, email, password_hash, bio, phone, profile_image, \
     role, created_at, updated_at, deleted_at";

/// Persistence boundary for accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Hash `password`, insert a fresh row with a new id and return it.
    async fn create(&self, user: NewUser, password: &str) -> UserResult<User>;

    /// Any row with this id, soft-deleted or not.
    async fn get_by_id(&self, id: Uuid) -> UserResult<User>;

    /// Active row for a login email, hash included.
    async fn find_active_by_email(&self, email: &str) -> UserResult<Option<UserRecord>>;

    /// One page of active rows plus the active total.
    async fn list(&self, filter: UserFilter) -> UserResult<(Vec<User>, i64)>;

    /// Apply the present fields and return the persisted row.
    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<User>;

    /// Stamp `deleted_at`. Succeeds whether or not the row exists.
    async fn soft_delete(&self, id: Uuid) -> UserResult<()>;
}

fn bind_args<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    args: Vec<SqlArg>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for arg in args {
        query = match arg {
            SqlArg::Text(v) => query.bind(v),
            SqlArg::Int(v) => query.bind(v),
            SqlArg::Uuid(v) => query.bind(v),
        };
    }
    query
}

/// Builds the SET clause for `changes`, hashing a new password if present.
pub(crate) fn update_query(id: Uuid, changes: &UserChanges) -> UserResult<BuiltQuery> {
    let password_hash = changes.password.as_deref().map(hash_password).transpose()?;
    PartialUpdateBuilder::new(TABLE)
        .set("fname", changes.fname.clone())
        .set("lname", changes.lname.clone())
        .set("email", changes.email.clone())
        .set("bio", changes.bio.clone())
        .set("phone", changes.phone.clone())
        .set("profile_image", changes.profile_image.clone())
        .set("role", changes.role.clone())
        .set("password_hash", password_hash)
        .build(id, PUBLIC_COLUMNS)
}

#[derive(Clone)]
pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[instrument(skip(self, user, password))]
    async fn create(&self, user: NewUser, password: &str) -> UserResult<User> {
        let password_hash = hash_password(password)?;
        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO {} (id, fname, lname, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {}",
            TABLE, PUBLIC_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&user.fname)
            .bind(&user.lname)
            .bind(&user.email)
            .bind(&password_hash)
            .fetch_one(&self.db)
            .await?;
        info!(user_id = %created.id, "user row inserted");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<User> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", PUBLIC_COLUMNS, TABLE);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self, email))]
    async fn find_active_by_email(&self, email: &str) -> UserResult<Option<UserRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = $1 AND deleted_at IS NULL",
            RECORD_COLUMNS, TABLE
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter) -> UserResult<(Vec<User>, i64)> {
        let select = format!("SELECT {} FROM {}", PUBLIC_COLUMNS, TABLE);
        let BuiltQuery { sql, args } = FilterQueryBuilder::users(&select, &filter)?;
        debug!(%sql, arg_count = args.len(), "list users");

        let users = bind_args(sqlx::query_as::<_, User>(&sql), args)
            .fetch_all(&self.db)
            .await?;

        let count_sql = count_active(TABLE);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .fetch_one(&self.db)
            .await?;

        Ok((users, total))
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<User> {
        let BuiltQuery { sql, args } = update_query(id, &changes)?;
        debug!(%sql, arg_count = args.len(), "update user");

        bind_args(sqlx::query_as::<_, User>(&sql), args)
            .fetch_optional(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: Uuid) -> UserResult<()> {
        let sql = format!(
            "UPDATE {} SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
            TABLE
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.db).await?;
        debug!(rows = result.rows_affected(), "soft delete");
        Ok(())
    }
}
