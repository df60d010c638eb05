//! Parameterized SQL assembly for the listing and partial-update paths.
//!
//! Values only ever travel as bound parameters. Column names come from
//! `&'static str` literals in this crate, never from callers.

use time::{macros::format_description, Date};
use uuid::Uuid;

use crate::auth::error::{UserError, UserResult};
use crate::auth::repo_types::UserFilter;

/// Soft-delete predicate shared by every read of active rows.
pub const ACTIVE_PREDICATE: &str = "deleted_at IS NULL";

#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Int(i64),
    Uuid(Uuid),
}

impl From<String> for SqlArg {
    fn from(v: String) -> Self {
        SqlArg::Text(v)
    }
}

impl From<&str> for SqlArg {
    fn from(v: &str) -> Self {
        SqlArg::Text(v.to_string())
    }
}

impl From<i64> for SqlArg {
    fn from(v: i64) -> Self {
        SqlArg::Int(v)
    }
}

impl From<Uuid> for SqlArg {
    fn from(v: Uuid) -> Self {
        SqlArg::Uuid(v)
    }
}

/// SQL text plus its arguments in `$1..$n` order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

#[derive(Debug, Default)]
struct Params {
    args: Vec<SqlArg>,
}

impl Params {
    /// Stores the value and hands back its placeholder.
    fn push(&mut self, arg: impl Into<SqlArg>) -> String {
        self.args.push(arg.into());
        format!("${}", self.args.len())
    }
}

/// Builds `<select> WHERE deleted_at IS NULL [AND col = $n ...] [LIMIT $n] [OFFSET $n]`.
#[derive(Debug)]
pub struct FilterQueryBuilder {
    sql: String,
    order_by: Option<&'static str>,
    limit: Option<i64>,
    offset: Option<i64>,
    params: Params,
}

impl FilterQueryBuilder {
    /// `select` is everything up to, but excluding, the WHERE keyword.
    pub fn new(select: &str) -> Self {
        Self {
            sql: format!("{} WHERE {}", select.trim_end(), ACTIVE_PREDICATE),
            order_by: None,
            limit: None,
            offset: None,
            params: Params::default(),
        }
    }

    pub fn eq(mut self, column: &'static str, value: Option<impl Into<SqlArg>>) -> Self {
        if let Some(value) = value {
            let ph = self.params.push(value);
            self.sql.push_str(&format!(" AND {} = {}", column, ph));
        }
        self
    }

    /// Keeps rows whose `column` lies strictly after midnight UTC of `date` (`MM-DD-YYYY`).
    pub fn created_after(mut self, column: &'static str, date: Option<&str>) -> UserResult<Self> {
        if let Some(date) = date {
            let threshold = epoch_seconds(date)?;
            let ph = self.params.push(threshold);
            self.sql
                .push_str(&format!(" AND EXTRACT(EPOCH FROM {}) > {}", column, ph));
        }
        Ok(self)
    }

    pub fn order_by(mut self, clause: &'static str) -> Self {
        self.order_by = Some(clause);
        self
    }

    /// Non-positive values are treated as absent.
    pub fn paginate(mut self, limit: Option<i64>, offset: Option<i64>) -> Self {
        self.limit = limit.filter(|v| *v > 0);
        self.offset = offset.filter(|v| *v > 0);
        self
    }

    pub fn build(mut self) -> BuiltQuery {
        if let Some(order) = self.order_by {
            self.sql.push_str(&format!(" ORDER BY {}", order));
        }
        if let Some(limit) = self.limit {
            let ph = self.params.push(limit);
            self.sql.push_str(&format!(" LIMIT {}", ph));
        }
        if let Some(offset) = self.offset {
            let ph = self.params.push(offset);
            self.sql.push_str(&format!(" OFFSET {}", ph));
        }
        BuiltQuery {
            sql: self.sql,
            args: self.params.args,
        }
    }

    /// The admin listing: id, email, fname, lname, created_at threshold, then pagination.
    pub fn users(select: &str, filter: &UserFilter) -> UserResult<BuiltQuery> {
        Ok(Self::new(select)
            .eq("id", filter.id)
            .eq("email", filter.email.clone())
            .eq("fname", filter.fname.clone())
            .eq("lname", filter.lname.clone())
            .created_after("created_at", filter.created_after.as_deref())?
            .order_by("created_at DESC")
            .paginate(filter.limit, filter.offset)
            .build())
    }
}

/// Total rows that are not soft-deleted. Deliberately ignores listing filters.
pub fn count_active(table: &'static str) -> String {
    format!("SELECT COUNT(*) FROM {} WHERE {}", table, ACTIVE_PREDICATE)
}

pub(crate) fn epoch_seconds(date: &str) -> UserResult<i64> {
    let format = format_description!("[month]-[day]-[year]");
    let day = Date::parse(date, &format)
        .map_err(|e| UserError::Validation(format!("invalid created_at '{}': {}", date, e)))?;
    Ok(day.midnight().assume_utc().unix_timestamp())
}

/// Builds `UPDATE <table> SET col = $1, ... WHERE deleted_at IS NULL AND id = $n RETURNING ...`.
#[derive(Debug)]
pub struct PartialUpdateBuilder {
    table: &'static str,
    assignments: Vec<String>,
    params: Params,
}

impl PartialUpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            params: Params::default(),
        }
    }

    pub fn set(mut self, column: &'static str, value: Option<impl Into<SqlArg>>) -> Self {
        if let Some(value) = value {
            let ph = self.params.push(value);
            self.assignments.push(format!("{} = {}", column, ph));
        }
        self
    }

    pub fn build(mut self, id: Uuid, returning: &str) -> UserResult<BuiltQuery> {
        if self.assignments.is_empty() {
            return Err(UserError::Validation("no fields to update".into()));
        }
        let id_ph = self.params.push(id);
        let sql = format!(
            "UPDATE {} SET {} WHERE {} AND id = {} RETURNING {}",
            self.table,
            self.assignments.join(", "),
            ACTIVE_PREDICATE,
            id_ph,
            returning
        );
        Ok(BuiltQuery {
            sql,
            args: self.params.args,
        })
    }
}
