//! Query-string → [`ListQuery`] translation
//!
//! Input is the ordered list of `(key, value)` pairs from the URL. Keys other
//! than the reserved ones are filters, either `field=value` or
//! `field[op]=value`; operators go through [`ComparisonOp::from_operator`].
//!
//! ```
//! use kernel::query::translator::{QueryTranslator, ResourceDefaults};
//!
//! let translator = QueryTranslator::new(ResourceDefaults::default());
//! let pairs = vec![
//!     ("duration[gte]".to_string(), "5".to_string()),
//!     ("sort".to_string(), "-price".to_string()),
//!     ("limit".to_string(), "3".to_string()),
//! ];
//! let query = translator.translate(&pairs).unwrap();
//! assert_eq!(query.filter.conditions.len(), 1);
//! assert_eq!(query.page.limit(), 3);
//! ```

use crate::error::app_error::{AppError, AppResult};

use super::filter::{
    ComparisonOp, Condition, Filter, FilterValue, ListQuery, Projection, Sort, SortKey, TextSearch,
};
use super::pagination::PageRequest;

/// Keys that control the listing and never reach the filter.
pub const RESERVED_KEYS: [&str; 5] = ["page", "limit", "sort", "fields", "search"];

pub const MIN_SEARCH_LENGTH: usize = 3;

/// Field used to break sort ties so pages stay stable.
pub const TIEBREAK_FIELD: &str = "id";

/// Per-resource defaults applied when the request leaves them out.
#[derive(Debug, Clone)]
pub struct ResourceDefaults {
    pub sort: Vec<SortKey>,
    pub excluded_fields: Vec<String>,
}

impl Default for ResourceDefaults {
    fn default() -> Self {
        Self {
            sort: vec![SortKey::desc("createdAt")],
            excluded_fields: Vec::new(),
        }
    }
}

impl ResourceDefaults {
    pub fn excluding<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryTranslator {
    defaults: ResourceDefaults,
}

impl QueryTranslator {
    pub fn new(defaults: ResourceDefaults) -> Self {
        Self { defaults }
    }

    pub fn translate(&self, pairs: &[(String, String)]) -> AppResult<ListQuery> {
        let reserved = |name: &str| {
            pairs
                .iter()
                .rev()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        let mut filter = build_filter(pairs)?;
        filter.text_search = reserved("search").map(parse_search).transpose()?.flatten();

        let sort = match reserved("sort").map(parse_sort).filter(|keys| !keys.is_empty()) {
            Some(keys) => Sort::Fields(with_tiebreak(keys)),
            None if filter.text_search.is_some() => Sort::TextScore,
            None => Sort::Fields(with_tiebreak(self.defaults.sort.clone())),
        };

        let projection = self.projection(reserved("fields"))?;
        let page = PageRequest::from_raw(reserved("page"), reserved("limit"));

        Ok(ListQuery {
            filter,
            sort,
            projection,
            page,
        })
    }

    fn projection(&self, raw: Option<&str>) -> AppResult<Projection> {
        let fields = raw.map(split_list).unwrap_or_default();
        if fields.is_empty() {
            return Ok(Projection::Exclude(self.defaults.excluded_fields.clone()));
        }

        let (excluded, included): (Vec<_>, Vec<_>) =
            fields.into_iter().partition(|f| f.starts_with('-'));
        match (excluded.is_empty(), included.is_empty()) {
            (true, _) => Ok(Projection::Include(included)),
            (false, true) => {
                let mut fields: Vec<String> = excluded
                    .into_iter()
                    .map(|f| f.trim_start_matches('-').to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
                for default in &self.defaults.excluded_fields {
                    if !fields.contains(default) {
                        fields.push(default.clone());
                    }
                }
                Ok(Projection::Exclude(fields))
            }
            (false, false) => Err(AppError::bad_request(
                "Cannot mix included and excluded fields in projection",
            )),
        }
    }
}

// ============================================================================
// Filter
// ============================================================================

fn parse_key(key: &str) -> AppResult<(&str, Option<ComparisonOp>)> {
    let invalid = || AppError::bad_request(format!("Invalid query parameter: {key}"));

    let Some(open) = key.find('[') else {
        return if key.is_empty() { Err(invalid()) } else { Ok((key, None)) };
    };
    let field = &key[..open];
    let op = key[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
    if field.is_empty() || op.contains(['[', ']']) {
        return Err(invalid());
    }
    let op = ComparisonOp::from_operator(op)
        .ok_or_else(|| AppError::bad_request(format!("Invalid query operator: {op}")))?;
    Ok((field, Some(op)))
}

fn build_filter(pairs: &[(String, String)]) -> AppResult<Filter> {
    // (field, op, values) grouped in first-seen order
    let mut groups: Vec<(&str, Option<ComparisonOp>, Vec<&str>)> = Vec::new();

    for (key, value) in pairs {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let (field, op) = parse_key(key)?;
        match groups.iter_mut().find(|(f, o, _)| *f == field && *o == op) {
            Some((_, _, values)) => values.push(value.as_str()),
            None => groups.push((field, op, vec![value.as_str()])),
        }
    }

    let mut filter = Filter::default();
    for (field, op, values) in groups {
        match op {
            None if values.len() == 1 => filter.conditions.push(Condition::new(
                field,
                ComparisonOp::Eq,
                FilterValue::Single(values[0].to_string()),
            )),
            None => filter.conditions.push(Condition::new(
                field,
                ComparisonOp::In,
                FilterValue::List(values.iter().map(|v| v.to_string()).collect()),
            )),
            Some(ComparisonOp::In) => {
                let list: Vec<String> = values.into_iter().flat_map(split_list).collect();
                if list.is_empty() {
                    return Err(AppError::bad_request(format!(
                        "Invalid query parameter: {field}[in]"
                    )));
                }
                filter
                    .conditions
                    .push(Condition::new(field, ComparisonOp::In, FilterValue::List(list)));
            }
            Some(op) => {
                for value in values {
                    filter.conditions.push(Condition::new(
                        field,
                        op,
                        FilterValue::Single(value.to_string()),
                    ));
                }
            }
        }
    }
    Ok(filter)
}

// ============================================================================
// Search / sort helpers
// ============================================================================

/// Empty means "no search". Anything shorter than [`MIN_SEARCH_LENGTH`] is
/// rejected before the store is touched.
fn parse_search(raw: &str) -> AppResult<Option<TextSearch>> {
    let term = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if term.chars().count() < MIN_SEARCH_LENGTH {
        return Err(AppError::bad_request(format!(
            "Search term must be at least {MIN_SEARCH_LENGTH} characters"
        )));
    }

    let words: Vec<String> = term
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return Err(AppError::bad_request(
            "Search term must contain letters or digits",
        ));
    }

    Ok(Some(TextSearch {
        words,
        case_sensitive: true,
    }))
}

fn parse_sort(raw: &str) -> Vec<SortKey> {
    raw.split(',').filter_map(SortKey::parse).collect()
}

fn with_tiebreak(mut keys: Vec<SortKey>) -> Vec<SortKey> {
    if !keys.iter().any(|k| k.field == TIEBREAK_FIELD) {
        keys.push(SortKey::asc(TIEBREAK_FIELD));
    }
    keys
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn tours() -> QueryTranslator {
        QueryTranslator::new(ResourceDefaults::default().excluding(["secretTour"]))
    }

    #[test]
    fn test_reserved_keys_never_filter() {
        let query = tours()
            .translate(&pairs(&[
                ("page", "2"),
                ("limit", "5"),
                ("sort", "price"),
                ("fields", "name"),
                ("difficulty", "easy"),
            ]))
            .unwrap();
        assert_eq!(
            query.filter.conditions,
            vec![Condition::new(
                "difficulty",
                ComparisonOp::Eq,
                FilterValue::Single("easy".into())
            )]
        );
    }

    #[test]
    fn test_bracket_operators() {
        let query = tours()
            .translate(&pairs(&[("duration[gte]", "5"), ("price[lt]", "1500")]))
            .unwrap();
        assert_eq!(query.filter.conditions[0].op, ComparisonOp::Gte);
        assert_eq!(query.filter.conditions[0].field, "duration");
        assert_eq!(query.filter.conditions[1].op, ComparisonOp::Lt);
    }

    #[test]
    fn test_unknown_operator_is_bad_request() {
        let err = tours()
            .translate(&pairs(&[("price[where]", "1")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "Invalid query operator: where");
    }

    #[test]
    fn test_malformed_key_is_bad_request() {
        for key in ["[gte]", "price[gte", "price[gte][x]"] {
            let err = tours().translate(&pairs(&[(key, "1")])).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest, "{key}");
        }
    }

    #[test]
    fn test_operator_words_inside_values_are_untouched() {
        let query = tours()
            .translate(&pairs(&[("name", "The gte Explorer in lt")]))
            .unwrap();
        assert_eq!(
            query.filter.conditions[0].value,
            FilterValue::Single("The gte Explorer in lt".into())
        );
    }

    #[test]
    fn test_repeated_keys_become_in() {
        let query = tours()
            .translate(&pairs(&[("difficulty", "easy"), ("difficulty", "medium")]))
            .unwrap();
        assert_eq!(
            query.filter.conditions,
            vec![Condition::new(
                "difficulty",
                ComparisonOp::In,
                FilterValue::List(vec!["easy".into(), "medium".into()])
            )]
        );
    }

    #[test]
    fn test_in_operator_splits_commas() {
        let query = tours()
            .translate(&pairs(&[("difficulty[in]", "easy, difficult")]))
            .unwrap();
        assert_eq!(
            query.filter.conditions[0].value,
            FilterValue::List(vec!["easy".into(), "difficult".into()])
        );
    }

    #[test]
    fn test_short_search_rejected() {
        let err = tours().translate(&pairs(&[("search", " ab ")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "Search term must be at least 3 characters");
    }

    #[test]
    fn test_search_is_escaped_and_sorts_by_score() {
        let query = tours()
            .translate(&pairs(&[("search", "Forest (hiker)*")]))
            .unwrap();
        let search = query.filter.text_search.unwrap();
        assert_eq!(search.words, vec!["Forest".to_string(), "hiker".to_string()]);
        assert!(search.case_sensitive);
        assert_eq!(query.sort, Sort::TextScore);
    }

    #[test]
    fn test_empty_search_is_ignored() {
        let query = tours().translate(&pairs(&[("search", "")])).unwrap();
        assert!(query.filter.text_search.is_none());
    }

    #[test]
    fn test_explicit_sort_wins_over_search() {
        let query = tours()
            .translate(&pairs(&[("search", "forest"), ("sort", "-price,duration")]))
            .unwrap();
        assert_eq!(
            query.sort,
            Sort::Fields(vec![
                SortKey::desc("price"),
                SortKey::asc("duration"),
                SortKey::asc("id")
            ])
        );
    }

    #[test]
    fn test_default_sort() {
        let query = tours().translate(&[]).unwrap();
        assert_eq!(
            query.sort,
            Sort::Fields(vec![SortKey::desc("createdAt"), SortKey::asc("id")])
        );
        assert_eq!(query.projection, Projection::Exclude(vec!["secretTour".into()]));
        assert_eq!(query.page, PageRequest::default());
    }

    #[test]
    fn test_fields_projection() {
        let query = tours()
            .translate(&pairs(&[("fields", "name,price")]))
            .unwrap();
        assert_eq!(
            query.projection,
            Projection::Include(vec!["name".into(), "price".into()])
        );

        let query = tours().translate(&pairs(&[("fields", "-summary")])).unwrap();
        assert_eq!(
            query.projection,
            Projection::Exclude(vec!["summary".into(), "secretTour".into()])
        );

        assert!(tours().translate(&pairs(&[("fields", "name,-price")])).is_err());
    }

    #[test]
    fn test_limit_clamped_through_translator() {
        let query = tours().translate(&pairs(&[("limit", "1000")])).unwrap();
        assert_eq!(query.page.limit(), 24);
    }
}
