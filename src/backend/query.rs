//! Table query builder
//!
//! Renders filters in the REST dialect of the hosted database
//! (`column=op.value`, `order=column.desc`, `or=(a.eq.1,b.eq.2)`).

use std::fmt::Display;

/// Characters that would break out of a filter expression
const RESERVED: &[char] = &[',', '(', ')', '*', '%', '\\', '"', ':'];

/// A select/update/delete target with its filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    table: String,
    params: Vec<(String, String)>,
    orders: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    count_exact: bool,
}

impl TableQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            params: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            count_exact: false,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns and embedded relations, e.g. `*,tags(*)`
    pub fn select(mut self, columns: &str) -> Self {
        self.params.retain(|(k, _)| k != "select");
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("eq.{}", value))
    }

    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, format!("neq.{}", value))
    }

    /// Case-insensitive substring match; blank terms add no filter
    pub fn ilike(self, column: &str, term: &str) -> Self {
        match search_pattern(term) {
            Some(pattern) => self.filter(column, format!("ilike.{}", pattern)),
            None => self,
        }
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is.null".to_string())
    }

    pub fn in_<V: Display>(self, column: &str, values: &[V]) -> Self {
        let list = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, format!("in.({})", list))
    }

    /// Raw disjunction, e.g. `status.eq.pending,status.eq.confirmed`
    pub fn or(self, expr: &str) -> Self {
        self.filter("or", format!("({})", expr))
    }

    /// Case-insensitive match on any of `columns`; blank terms add no filter
    pub fn search_any(self, columns: &[&str], term: &str) -> Self {
        match search_pattern(term) {
            Some(pattern) => {
                let expr = columns
                    .iter()
                    .map(|c| format!("{}.ilike.{}", c, pattern))
                    .collect::<Vec<_>>()
                    .join(",");
                self.filter("or", format!("({})", expr))
            }
            None => self,
        }
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.orders.push(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Window of rows starting at `offset`
    pub fn range(self, offset: u64, limit: u64) -> Self {
        self.offset(offset).limit(limit)
    }

    /// Ask for the exact total in the `Content-Range` header
    pub fn count_exact(mut self) -> Self {
        self.count_exact = true;
        self
    }

    pub fn wants_count(&self) -> bool {
        self.count_exact
    }

    fn filter(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    /// URL-encoded query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = self.params.clone();
        if !self.orders.is_empty() {
            pairs.push(("order".to_string(), self.orders.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Turn a free-text search into a wildcard pattern.
///
/// Reserved characters are dropped so user input cannot alter the filter
/// expression. Returns `None` when nothing searchable is left.
pub fn search_pattern(term: &str) -> Option<String> {
    let cleaned: String = term
        .chars()
        .filter(|c| !RESERVED.contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(format!("*{}*", cleaned))
    }
}

/// Parse the total out of a `Content-Range` header (`0-9/42`, `*/0`).
///
/// Returns `None` when the total is unknown (`*/*`) or the header is malformed.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}
