//! Offset windows over ordered result sets
//!
//! Jira paginates with `startAt`/`maxResults`, TestRail and Slack with
//! `offset`/`limit`. Both reduce to a [`PageWindow`]. A window starting past the
//! end yields an empty page, never an error.

use crate::errors::{FieldError, WebError};

/// Jira's `maxResults` when the client sends none
pub const JIRA_DEFAULT_MAX_RESULTS: usize = 50;

/// Jira silently caps `maxResults` at this value
pub const JIRA_MAX_RESULTS_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Window from Jira-style `startAt`/`maxResults`
    ///
    /// `maxResults = 0` is allowed and returns only the total.
    pub fn from_start_at(start_at: Option<i64>, max_results: Option<i64>) -> Result<Self, WebError> {
        let mut errors = Vec::new();
        let offset = non_negative("startAt", start_at.unwrap_or(0), &mut errors);
        let limit = non_negative(
            "maxResults",
            max_results.unwrap_or(JIRA_DEFAULT_MAX_RESULTS as i64),
            &mut errors,
        );

        if errors.is_empty() {
            Ok(Self::new(offset, limit.min(JIRA_MAX_RESULTS_CAP)))
        } else {
            Err(WebError::validation(errors))
        }
    }

    /// Window from `limit`/`offset` query parameters
    ///
    /// `limit` must be at least 1 and is capped at `max_limit`.
    pub fn from_limit_offset(
        limit: Option<i64>,
        offset: Option<i64>,
        default_limit: usize,
        max_limit: usize,
    ) -> Result<Self, WebError> {
        let mut errors = Vec::new();
        let offset = non_negative("offset", offset.unwrap_or(0), &mut errors);
        let limit = match limit {
            Some(value) if value < 1 => {
                errors.push(FieldError::invalid("limit", "limit must be at least 1"));
                0
            }
            Some(value) => usize::try_from(value).unwrap_or(usize::MAX),
            None => default_limit,
        };

        if errors.is_empty() {
            Ok(Self::new(offset, limit.min(max_limit)))
        } else {
            Err(WebError::validation(errors))
        }
    }

    /// Take this window out of an already ordered collection
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }

    /// Offset of the following page, if any items remain after this one
    pub fn next_offset(&self, total: usize) -> Option<usize> {
        let end = self.offset.saturating_add(self.limit);
        (self.limit > 0 && end < total).then_some(end)
    }
}

fn non_negative(field: &str, value: i64, errors: &mut Vec<FieldError>) -> usize {
    match usize::try_from(value) {
        Ok(value) => value,
        Err(_) => {
            errors.push(FieldError::invalid(field, format!("{} must not be negative", field)));
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jira_defaults_and_cap() {
        assert_eq!(PageWindow::from_start_at(None, None).unwrap(), PageWindow::new(0, 50));
        assert_eq!(
            PageWindow::from_start_at(Some(5), Some(1000)).unwrap(),
            PageWindow::new(5, JIRA_MAX_RESULTS_CAP)
        );
        assert_eq!(PageWindow::from_start_at(None, Some(0)).unwrap().limit, 0);
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let err = PageWindow::from_start_at(Some(-1), Some(-5)).unwrap_err();
        assert_eq!(err.field_errors().len(), 2);

        assert!(PageWindow::from_limit_offset(Some(0), None, 100, 1000).is_err());
        assert!(PageWindow::from_limit_offset(None, Some(-3), 100, 1000).is_err());
    }

    #[test]
    fn test_limit_offset_defaults() {
        let window = PageWindow::from_limit_offset(None, None, 250, 250).unwrap();
        assert_eq!(window, PageWindow::new(0, 250));

        let window = PageWindow::from_limit_offset(Some(5000), Some(2), 100, 1000).unwrap();
        assert_eq!(window, PageWindow::new(2, 1000));
    }

    #[test]
    fn test_slice() {
        let items = vec![1, 2, 3];
        assert_eq!(PageWindow::new(2, 1).slice(items.clone()), vec![3]);
        assert_eq!(PageWindow::new(1, 10).slice(items.clone()), vec![2, 3]);
        assert!(PageWindow::new(10, 5).slice(items).is_empty());
    }

    #[test]
    fn test_next_offset() {
        assert_eq!(PageWindow::new(0, 2).next_offset(3), Some(2));
        assert_eq!(PageWindow::new(2, 2).next_offset(3), None);
        assert_eq!(PageWindow::new(0, 0).next_offset(3), None);
    }
}
