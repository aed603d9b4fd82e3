//! Typed filter, sort and projection produced by the query translator
//!
//! These types are store-agnostic. The PostgreSQL adapter renders them with
//! bound parameters ([`super::sql`]); the in-memory adapters evaluate them
//! directly against serialized documents.

use serde_json::Value;

use super::pagination::PageRequest;

// ============================================================================
// Comparison operators
// ============================================================================

/// Operators accepted in `field[op]=value` query keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl ComparisonOp {
    /// Map a bracketed operator name. Unknown names yield `None`.
    pub fn from_operator(op: &str) -> Option<Self> {
        match op {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            "ne" => Some(Self::Ne),
            _ => None,
        }
    }

    /// SQL comparison token (not used for `In`).
    pub const fn sql_operator(&self) -> &'static str {
        match self {
            Self::Eq | Self::In => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Raw value(s) of a condition, still text until the adapter casts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Single(String),
    List(Vec<String>),
}

impl FilterValue {
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::List(vs) => vs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub op: ComparisonOp,
    pub value: FilterValue,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: ComparisonOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }
}

/// Case-sensitive full-text constraint. `words` are already escaped to
/// plain alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub words: Vec<String>,
    pub case_sensitive: bool,
}

/// Conjunction of every condition plus an optional text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
    pub text_search: Option<TextSearch>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.text_search.is_none()
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

// ============================================================================
// Sort
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse `price` / `-price`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(Self::desc(field)),
            None if raw.is_empty() => None,
            None => Some(Self::asc(raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sort {
    Fields(Vec<SortKey>),
    /// Relevance of the text search, best match first.
    TextScore,
}

// ============================================================================
// Projection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Only these fields (plus `id`).
    Include(Vec<String>),
    /// Everything but these fields.
    Exclude(Vec<String>),
}

impl Projection {
    /// Apply to a serialized document in place. Non-objects are left alone.
    pub fn apply(&self, document: &mut Value) {
        let Some(object) = document.as_object_mut() else {
            return;
        };
        match self {
            Self::Include(fields) => {
                object.retain(|key, _| key == "id" || fields.iter().any(|f| f == key));
            }
            Self::Exclude(fields) => {
                for field in fields {
                    object.remove(field);
                }
            }
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::Exclude(Vec::new())
    }
}

// ============================================================================
// ListQuery
// ============================================================================

/// Everything a store needs to answer one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Filter,
    pub sort: Sort,
    pub projection: Projection,
    pub page: PageRequest,
}
