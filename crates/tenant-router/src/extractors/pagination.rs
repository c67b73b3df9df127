//! Pagination extractor.
//!
//! Splits the query string into `_count`/`_offset` and the remaining search
//! parameters, applying the configured page size limits.

use axum::{extract::FromRequestParts, http::request::Parts};
use url::form_urlencoded;

use crate::backend::{ResourceHandler, SearchRequest};
use crate::error::RestError;
use crate::state::AppState;

/// Axum extractor for pagination and search parameters.
///
/// # Example
///
/// ```rust,ignore
/// use helios_tenant_router::extractors::Pagination;
///
/// async fn list_handler(pagination: Pagination) {
///     let page_size = pagination.count();
///     let offset = pagination.offset();
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    count: usize,
    offset: usize,
    params: Vec<(String, String)>,
}

impl Pagination {
    /// Creates a Pagination with the count capped at `max_count`.
    pub fn new(count: usize, offset: usize, max_count: usize) -> Self {
        Self {
            count: count.min(max_count),
            offset,
            params: Vec::new(),
        }
    }

    /// Parses a raw query string.
    pub fn from_query(
        query: Option<&str>,
        default_count: usize,
        max_count: usize,
    ) -> Result<Self, RestError> {
        let mut count = default_count;
        let mut offset = 0;
        let mut params = Vec::new();

        for (name, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match name.as_ref() {
                "_count" => count = parse_number("_count", &value)?,
                "_offset" => offset = parse_number("_offset", &value)?,
                _ => params.push((name.into_owned(), value.into_owned())),
            }
        }

        let mut pagination = Self::new(count, offset, max_count);
        pagination.params = params;
        Ok(pagination)
    }

    /// Returns the page size.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the non-paging query parameters in request order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Converts into the request forwarded to the handler.
    pub fn into_search_request(self) -> SearchRequest {
        SearchRequest {
            params: self.params,
            count: self.count,
            offset: self.offset,
        }
    }
}

fn parse_number(name: &str, value: &str) -> Result<usize, RestError> {
    value.parse().map_err(|_| RestError::BadRequest {
        message: format!("Invalid value for {}: {}", name, value),
    })
}

impl<H> FromRequestParts<AppState<H>> for Pagination
where
    H: ResourceHandler + 'static,
{
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<H>,
    ) -> Result<Self, Self::Rejection> {
        Pagination::from_query(
            parts.uri.query(),
            state.default_page_size(),
            state.max_page_size(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_capped_at_max() {
        let pagination = Pagination::new(200, 0, 100);
        assert_eq!(pagination.count(), 100);
    }

    #[test]
    fn test_defaults() {
        let pagination = Pagination::from_query(None, 20, 1000).unwrap();
        assert_eq!(pagination.count(), 20);
        assert_eq!(pagination.offset(), 0);
        assert!(pagination.params().is_empty());
    }

    #[test]
    fn test_from_query() {
        let pagination =
            Pagination::from_query(Some("name=Smith&_count=5&_offset=10&gender=male"), 20, 1000)
                .unwrap();
        assert_eq!(pagination.count(), 5);
        assert_eq!(pagination.offset(), 10);

        let request = pagination.into_search_request();
        assert_eq!(
            request.params,
            vec![
                ("name".to_string(), "Smith".to_string()),
                ("gender".to_string(), "male".to_string()),
            ]
        );
        assert_eq!(request.count, 5);
    }

    #[test]
    fn test_decodes_values() {
        let pagination = Pagination::from_query(Some("name=van%20Dyke"), 20, 1000).unwrap();
        assert_eq!(pagination.params()[0].1, "van Dyke");
    }

    #[test]
    fn test_invalid_count() {
        let err = Pagination::from_query(Some("_count=many"), 20, 1000).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for _count: many");
    }
}
