//! SQL assembly helpers shared by the repositories.
//!
//! Statements are written with `:name` placeholders and compiled into
//! PostgreSQL positional placeholders (`$1`, `$2`, ...) together with the
//! matching ordered argument list.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::Arguments;

use crate::core::error::{AppError, Result};
use crate::shared::types::ListParams;

lazy_static! {
    /// `::` is matched first so type casts like `created_at::text` are never
    /// taken for placeholders.
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"::|:([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

/// A value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    BigInt(i64),
    Decimal(Decimal),
}

impl SqlValue {
    fn add_to(self, args: &mut PgArguments) -> std::result::Result<(), sqlx::error::BoxDynError> {
        match self {
            SqlValue::Text(v) => args.add(v),
            SqlValue::BigInt(v) => args.add(v),
            SqlValue::Decimal(v) => args.add(v),
        }
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

/// Named parameters waiting to be substituted into a statement.
#[derive(Debug, Default, Clone)]
pub struct NamedQuery {
    params: Vec<(&'static str, SqlValue)>,
}

/// A statement rewritten to positional placeholders and its arguments in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl NamedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `:name`. Binding the same name again replaces the value.
    pub fn bind(mut self, name: &'static str, value: impl Into<SqlValue>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Names bound so far, in bind order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params.iter().map(|(n, _)| *n)
    }

    fn value(&self, name: &str) -> Option<&SqlValue> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Rewrite every `:name` in `sql` into `$n`.
    ///
    /// A name that appears more than once reuses its first position. Bound
    /// names that the statement never mentions are ignored. A placeholder with
    /// no bound value is an error.
    pub fn compile(&self, sql: &str) -> Result<CompiledQuery> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut values = Vec::new();
        let mut out = String::with_capacity(sql.len());
        let mut last = 0;

        for caps in PLACEHOLDER_REGEX.captures_iter(sql) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&sql[last..whole.start()]);
            last = whole.end();

            let Some(name) = caps.get(1) else {
                out.push_str(whole.as_str());
                continue;
            };
            let name = name.as_str();

            let position = match positions.get(name) {
                Some(position) => *position,
                None => {
                    let value = self
                        .value(name)
                        .ok_or_else(|| AppError::Query(format!("missing value for :{}", name)))?;
                    values.push(value.clone());
                    positions.insert(name, values.len());
                    values.len()
                }
            };
            out.push('$');
            out.push_str(&position.to_string());
        }
        out.push_str(&sql[last..]);

        Ok(CompiledQuery { sql: out, values })
    }
}

impl CompiledQuery {
    /// Split into the SQL text and the encoded driver arguments.
    pub fn into_parts(self) -> Result<(String, PgArguments)> {
        let mut args = PgArguments::default();
        for value in self.values {
            value
                .add_to(&mut args)
                .map_err(|e| AppError::Database(sqlx::Error::Encode(e)))?;
        }
        Ok((self.sql, args))
    }
}

/// Escape LIKE metacharacters so `value` only ever matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the paginated list statement for `table`.
///
/// The first selected column is `COUNT(*) OVER() AS total_count`, the number of
/// rows matching the filter regardless of `OFFSET`/`LIMIT`.
pub fn list_query(table: &str, columns: &str, params: &ListParams) -> Result<CompiledQuery> {
    let mut named = NamedQuery::new();
    let mut filter = String::from(" WHERE TRUE ");
    let mut offset = String::from(" OFFSET 0 ");
    let mut limit = String::new();

    if let Some(search) = &params.search {
        filter.push_str(" AND name ILIKE '%' || :search || '%' ");
        named = named.bind("search", escape_like(search));
    }
    if let Some(value) = params.offset {
        offset = String::from(" OFFSET :offset ");
        named = named.bind("offset", value);
    }
    if let Some(value) = params.limit {
        limit = String::from(" LIMIT :limit ");
        named = named.bind("limit", value);
    }

    let sql = format!(
        r#"SELECT COUNT(*) OVER() AS total_count, {} FROM "{}"{} ORDER BY created_at DESC{}{}"#,
        columns, table, filter, offset, limit
    );

    named.compile(&sql)
}

/// Build a patch statement touching only the columns bound in `fields`, plus
/// `updated_at`. Columns are written in bind order.
pub fn patch_query(table: &str, id: &str, fields: NamedQuery) -> Result<CompiledQuery> {
    if fields.is_empty() {
        return Err(AppError::EmptyPatch);
    }

    let set = fields
        .names()
        .map(|name| format!("{} = :{}", name, name))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        r#"UPDATE "{}" SET {}, updated_at = NOW() WHERE id = :id"#,
        table, set
    );

    fields.bind("id", id).compile(&sql)
}
