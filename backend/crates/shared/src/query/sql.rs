//! PostgreSQL rendering of [`Filter`] / [`Sort`] / [`PageRequest`] (feature `sqlx`)
//!
//! Field names from the request are resolved through a [`ColumnMap`]
//! whitelist; values are cast to the column's Rust type and bound, never
//! interpolated. A value that does not cast is reported the way the store
//! reports cast errors: `Invalid price: abc.`

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgHasArrayType;
use sqlx::{Encode, Postgres, QueryBuilder, Type};
use uuid::Uuid;

use crate::error::app_error::{AppError, AppResult};

use super::filter::{ComparisonOp, Condition, Filter, FilterValue, Sort, SortDirection, TextSearch};
use super::pagination::PageRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Bool,
    Timestamp,
    Uuid,
}

/// API field name → SQL column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub field: &'static str,
    pub column: &'static str,
    pub ty: ColumnType,
}

impl Column {
    pub const fn new(field: &'static str, column: &'static str, ty: ColumnType) -> Self {
        Self { field, column, ty }
    }
}

/// Full-text configuration: the `tsvector` column plus the raw text columns
/// used for the case-sensitive word check.
#[derive(Debug, Clone, Copy)]
pub struct SearchColumns {
    pub vector: &'static str,
    pub text: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    columns: &'static [Column],
    search: Option<SearchColumns>,
}

impl ColumnMap {
    pub const fn new(columns: &'static [Column]) -> Self {
        Self {
            columns,
            search: None,
        }
    }

    pub const fn with_search(mut self, search: SearchColumns) -> Self {
        self.search = Some(search);
        self
    }

    pub fn resolve(&self, field: &str) -> AppResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .ok_or_else(|| AppError::bad_request(format!("Invalid field: {field}")))
    }

    /// Append ` AND <condition>` for every condition and the text search.
    /// The caller's SQL must already contain a `WHERE` clause.
    pub fn push_filter(&self, qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) -> AppResult<()> {
        for condition in &filter.conditions {
            qb.push(" AND ");
            self.push_condition(qb, condition)?;
        }
        if let Some(search) = &filter.text_search {
            self.push_text_search(qb, search)?;
        }
        Ok(())
    }

    fn push_condition(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        condition: &Condition,
    ) -> AppResult<()> {
        let column = self.resolve(&condition.field)?;
        let values = condition.value.values();

        match (&condition.value, condition.op) {
            (FilterValue::List(_), ComparisonOp::Ne) => {
                qb.push("NOT (").push(column.column).push(" = ANY(");
                bind_values(qb, column, values, true)?;
                qb.push("))");
            }
            (FilterValue::List(_), _) | (_, ComparisonOp::In) => {
                qb.push(column.column).push(" = ANY(");
                bind_values(qb, column, values, true)?;
                qb.push(")");
            }
            (FilterValue::Single(_), ComparisonOp::Ne) => {
                qb.push(column.column).push(" IS DISTINCT FROM ");
                bind_values(qb, column, values, false)?;
            }
            (FilterValue::Single(_), op) => {
                qb.push(column.column)
                    .push(" ")
                    .push(op.sql_operator())
                    .push(" ");
                bind_values(qb, column, values, false)?;
            }
        }
        Ok(())
    }

    fn search_columns(&self) -> AppResult<SearchColumns> {
        self.search
            .ok_or_else(|| AppError::bad_request("Search is not supported for this resource"))
    }

    fn push_text_search(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        search: &TextSearch,
    ) -> AppResult<()> {
        let columns = self.search_columns()?;

        qb.push(" AND ")
            .push(columns.vector)
            .push(" @@ to_tsquery('english', ");
        qb.push_bind(ts_query(search));
        qb.push(")");

        if search.case_sensitive && !columns.text.is_empty() {
            let patterns: Vec<String> = search.words.iter().map(|w| format!("%{w}%")).collect();
            qb.push(" AND (");
            for (i, column) in columns.text.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" LIKE ANY(");
                qb.push_bind(patterns.clone());
                qb.push(")");
            }
            qb.push(")");
        }
        Ok(())
    }

    /// Append ` ORDER BY ...`.
    pub fn push_order_by(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        sort: &Sort,
        search: Option<&TextSearch>,
    ) -> AppResult<()> {
        qb.push(" ORDER BY ");
        match (sort, search) {
            (Sort::Fields(keys), _) if !keys.is_empty() => {
                for (i, key) in keys.iter().enumerate() {
                    let column = self.resolve(&key.field)?;
                    if i > 0 {
                        qb.push(", ");
                    }
                    qb.push(column.column).push(match key.direction {
                        SortDirection::Asc => " ASC",
                        SortDirection::Desc => " DESC",
                    });
                }
            }
            (Sort::TextScore, Some(search)) => {
                let columns = self.search_columns()?;
                qb.push("ts_rank(")
                    .push(columns.vector)
                    .push(", to_tsquery('english', ");
                qb.push_bind(ts_query(search));
                qb.push(")) DESC, id ASC");
            }
            _ => {
                qb.push("id ASC");
            }
        }
        Ok(())
    }
}

/// Append ` LIMIT .. OFFSET ..`.
pub fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    qb.push(" LIMIT ");
    qb.push_bind(i64::try_from(page.limit()).unwrap_or(i64::MAX));
    qb.push(" OFFSET ");
    qb.push_bind(i64::try_from(page.skip()).unwrap_or(i64::MAX));
}

/// Words are alphanumeric already; any of them may match.
fn ts_query(search: &TextSearch) -> String {
    search.words.join(" | ")
}

// ============================================================================
// Value casting
// ============================================================================

fn cast_error(column: &Column, raw: &str) -> AppError {
    AppError::bad_request(format!("Invalid {}: {}.", column.field, raw))
}

fn cast_all<T>(
    column: &Column,
    values: &[String],
    parse: impl Fn(&str) -> Option<T>,
) -> AppResult<Vec<T>> {
    values
        .iter()
        .map(|raw| parse(raw.trim()).ok_or_else(|| cast_error(column, raw)))
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn bind_values(
    qb: &mut QueryBuilder<'_, Postgres>,
    column: &Column,
    values: &[String],
    as_array: bool,
) -> AppResult<()> {
    match column.ty {
        ColumnType::Text => bind(qb, values.to_vec(), as_array),
        ColumnType::Integer => bind(qb, cast_all(column, values, |v| v.parse::<i64>().ok())?, as_array),
        ColumnType::Float => bind(
            qb,
            cast_all(column, values, |v| v.parse::<f64>().ok().filter(|n| n.is_finite()))?,
            as_array,
        ),
        ColumnType::Bool => bind(qb, cast_all(column, values, parse_bool)?, as_array),
        ColumnType::Timestamp => bind(qb, cast_all(column, values, parse_timestamp)?, as_array),
        ColumnType::Uuid => bind(
            qb,
            cast_all(column, values, |v| Uuid::parse_str(v).ok())?,
            as_array,
        ),
    }
    Ok(())
}

fn bind<'args, T>(qb: &mut QueryBuilder<'args, Postgres>, mut values: Vec<T>, as_array: bool)
where
    T: 'args + Send + Encode<'args, Postgres> + Type<Postgres> + PgHasArrayType,
    Vec<T>: 'args + Send + Encode<'args, Postgres> + Type<Postgres>,
{
    if as_array {
        qb.push_bind(values);
    } else if let Some(value) = values.pop() {
        qb.push_bind(value);
    }
}
