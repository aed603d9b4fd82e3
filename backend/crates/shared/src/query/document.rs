//! In-process evaluation of a [`ListQuery`] over serialized documents
//!
//! Used by the in-memory repositories. Documents are the JSON form of an
//! entity keyed by API field names, so the same query means the same thing
//! here and in PostgreSQL: unknown fields and uncastable values are 400s,
//! `ne` matches missing values, array fields match when any element does.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::app_error::{AppError, AppResult};

use super::filter::{ComparisonOp, Condition, Filter, ListQuery, Sort, SortDirection, TextSearch};
use super::pagination::PageRequest;

/// Which fields may be queried and which take part in text search.
#[derive(Debug, Clone, Copy)]
pub struct DocumentSchema {
    pub fields: &'static [&'static str],
    /// `(field, weight)` pairs.
    pub search: &'static [(&'static str, u32)],
}

impl DocumentSchema {
    fn check_field(&self, field: &str) -> AppResult<()> {
        if self.fields.contains(&field) {
            Ok(())
        } else {
            Err(AppError::bad_request(format!("Invalid field: {field}")))
        }
    }

    pub fn matches(&self, document: &Value, filter: &Filter) -> AppResult<bool> {
        for condition in &filter.conditions {
            self.check_field(&condition.field)?;
            if !condition_matches(document.get(&condition.field), condition)? {
                return Ok(false);
            }
        }
        if let Some(search) = &filter.text_search {
            if self.text_score(document, search) == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Sum of weights of every searchable field containing any word.
    pub fn text_score(&self, document: &Value, search: &TextSearch) -> u32 {
        self.search
            .iter()
            .filter_map(|(field, weight)| {
                let text = document.get(*field)?.as_str()?;
                let hits = search
                    .words
                    .iter()
                    .filter(|w| {
                        if search.case_sensitive {
                            text.contains(w.as_str())
                        } else {
                            text.to_lowercase().contains(&w.to_lowercase())
                        }
                    })
                    .count() as u32;
                Some(hits * weight)
            })
            .sum()
    }

    /// Filter, count, sort and slice. Returns the page and the total count.
    pub fn run<T>(
        &self,
        documents: Vec<(T, Value)>,
        query: &ListQuery,
    ) -> AppResult<(Vec<(T, Value)>, u64)> {
        if let Sort::Fields(keys) = &query.sort {
            for key in keys {
                self.check_field(&key.field)?;
            }
        }

        let mut matched = Vec::new();
        for (item, document) in documents {
            if self.matches(&document, &query.filter)? {
                matched.push((item, document));
            }
        }
        let total = matched.len() as u64;

        match (&query.sort, &query.filter.text_search) {
            (Sort::Fields(keys), _) => matched.sort_by(|(_, a), (_, b)| {
                keys.iter()
                    .map(|k| {
                        let ord = compare_values(a.get(&k.field), b.get(&k.field));
                        match k.direction {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    })
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            }),
            (Sort::TextScore, Some(search)) => matched.sort_by(|(_, a), (_, b)| {
                self.text_score(b, search)
                    .cmp(&self.text_score(a, search))
                    .then_with(|| compare_values(a.get("id"), b.get("id")))
            }),
            (Sort::TextScore, None) => {}
        }

        Ok((page_slice(matched, query.page), total))
    }
}

fn page_slice<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(limit).collect()
}

static NULL: Value = Value::Null;

fn condition_matches(value: Option<&Value>, condition: &Condition) -> AppResult<bool> {
    let raws = condition.value.values();
    let value = value.unwrap_or(&NULL);

    if let Value::Array(elements) = value {
        for element in elements {
            if condition_matches(Some(element), condition)? {
                return Ok(true);
            }
        }
        return Ok(condition.op == ComparisonOp::Ne && elements.is_empty());
    }

    let mut results = Vec::with_capacity(raws.len());
    for raw in raws {
        results.push(compare_raw(value, raw, &condition.field)?);
    }

    Ok(match condition.op {
        ComparisonOp::Eq | ComparisonOp::In => results.contains(&Some(Ordering::Equal)),
        ComparisonOp::Ne => !results.contains(&Some(Ordering::Equal)),
        ComparisonOp::Gt => results.iter().all(|o| *o == Some(Ordering::Greater)),
        ComparisonOp::Gte => results.iter().all(|o| o.is_some_and(Ordering::is_ge)),
        ComparisonOp::Lt => results.iter().all(|o| *o == Some(Ordering::Less)),
        ComparisonOp::Lte => results.iter().all(|o| o.is_some_and(Ordering::is_le)),
    })
}

/// Ordering of the document value relative to the raw query value.
/// `None` when either side is missing.
fn compare_raw(value: &Value, raw: &str, field: &str) -> AppResult<Option<Ordering>> {
    let cast_error = || AppError::bad_request(format!("Invalid {field}: {raw}."));
    let raw = raw.trim();
    Ok(match value {
        Value::Null => None,
        Value::Number(n) => {
            let rhs = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(cast_error)?;
            n.as_f64().and_then(|lhs| lhs.partial_cmp(&rhs))
        }
        Value::Bool(b) => {
            let rhs = match raw {
                "true" => true,
                "false" => false,
                _ => return Err(cast_error()),
            };
            Some(b.cmp(&rhs))
        }
        Value::String(s) => match (parse_instant(s), parse_instant(raw)) {
            (Some(lhs), Some(rhs)) => Some(lhs.cmp(&rhs)),
            _ => Some(s.as_str().cmp(raw)),
        },
        Value::Array(_) | Value::Object(_) => None,
    })
}

/// Total order used for sorting: nulls last, numbers, then strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (parse_instant(x), parse_instant(y)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Timestamps serialize with a variable number of fractional digits, so
/// they are compared as instants. A bare date means midnight UTC.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}
