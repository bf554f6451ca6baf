//! WHERE-clause builder shared by the search queries

use crate::util::non_blank;
use rusqlite::ToSql;

/// Accumulates AND-combined conditions with their bound parameters.
#[derive(Default)]
pub(crate) struct SqlFilter {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl SqlFilter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive, whitespace-trimmed text equality. Blank values are ignored.
    pub(crate) fn text_eq(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = non_blank(value) {
            self.clauses
                .push(format!("TRIM(LOWER({})) = TRIM(LOWER(?))", column));
            self.params.push(Box::new(v.to_string()));
        }
        self
    }

    pub(crate) fn eq<T: ToSql + 'static>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.clauses.push(format!("{} = ?", column));
            self.params.push(Box::new(v));
        }
        self
    }

    pub(crate) fn at_least<T: ToSql + 'static>(
        &mut self,
        column: &str,
        value: Option<T>,
    ) -> &mut Self {
        if let Some(v) = value {
            self.clauses.push(format!("{} >= ?", column));
            self.params.push(Box::new(v));
        }
        self
    }

    pub(crate) fn at_most<T: ToSql + 'static>(
        &mut self,
        column: &str,
        value: Option<T>,
    ) -> &mut Self {
        if let Some(v) = value {
            self.clauses.push(format!("{} <= ?", column));
            self.params.push(Box::new(v));
        }
        self
    }

    /// ` WHERE a AND b`, or an empty string when nothing was added
    pub(crate) fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub(crate) fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Append an extra positional parameter after the filter's own
    pub(crate) fn push_param<T: ToSql + 'static>(&mut self, value: T) {
        self.params.push(Box::new(value));
    }
}
