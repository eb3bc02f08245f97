use serde::Deserialize;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::{TableOrder, TableSort};

/// Raw list query parameters as received on the wire. Paging values stay text
/// so a non-numeric value is reported as a `FilterError`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    pub fn requested_limit(&self) -> Result<Option<i64>, FilterError> {
        parse_paging(self.limit.as_deref(), FilterError::InvalidLimit)
    }

    pub fn requested_offset(&self) -> Result<Option<i64>, FilterError> {
        parse_paging(self.offset.as_deref(), FilterError::InvalidOffset)
    }
}

fn parse_paging(raw: Option<&str>, invalid: fn(String) -> FilterError) -> Result<Option<i64>, FilterError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(|_| invalid(v.to_string())),
        None => Ok(None),
    }
}

/// Validated list parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub sort: TableSort,
    pub order: TableOrder,
    pub limit: i64,
    pub offset: i64,
}

impl Filter {
    /// Validates sort and order, then clamps paging.
    ///
    /// A missing, negative or oversized `limit` becomes `max_limit`; a missing or
    /// negative `offset` becomes 0.
    pub fn from_query(query: &ListQuery, max_limit: i64) -> Result<Self, FilterError> {
        let sort = FilterOrder::parse_sort(query.sort.as_deref())?;
        let order = FilterOrder::parse_order(query.order.as_deref())?;

        let limit = match query.requested_limit()? {
            Some(limit) if (0..=max_limit).contains(&limit) => limit,
            _ => max_limit,
        };
        let offset = query.requested_offset()?.filter(|offset| *offset >= 0).unwrap_or(0);

        Ok(Self { sort, order, limit, offset })
    }

    pub fn order_clause(&self) -> String {
        FilterOrder::generate(self.sort, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<i64>, offset: Option<i64>) -> ListQuery {
        ListQuery {
            sort: Some("name".to_string()),
            order: Some("asc".to_string()),
            limit: limit.map(|v| v.to_string()),
            offset: offset.map(|v| v.to_string()),
        }
    }

    #[test]
    fn clamps_limit_to_maximum() {
        assert_eq!(Filter::from_query(&query(Some(500), None), 100).unwrap().limit, 100);
        assert_eq!(Filter::from_query(&query(None, None), 100).unwrap().limit, 100);
        assert_eq!(Filter::from_query(&query(Some(-3), None), 100).unwrap().limit, 100);
        assert_eq!(Filter::from_query(&query(Some(25), None), 100).unwrap().limit, 25);
    }

    #[test]
    fn negative_offset_becomes_zero() {
        assert_eq!(Filter::from_query(&query(None, Some(-5)), 100).unwrap().offset, 0);
        assert_eq!(Filter::from_query(&query(None, Some(40)), 100).unwrap().offset, 40);
    }

    #[test]
    fn non_numeric_paging_is_rejected() {
        let mut bad = query(None, None);
        bad.limit = Some("ten".to_string());
        assert!(matches!(Filter::from_query(&bad, 100), Err(FilterError::InvalidLimit(v)) if v == "ten"));

        let mut bad = query(None, None);
        bad.offset = Some("1.5".to_string());
        assert!(matches!(Filter::from_query(&bad, 100), Err(FilterError::InvalidOffset(_))));

        let mut blank = query(None, None);
        blank.limit = Some(" ".to_string());
        assert_eq!(Filter::from_query(&blank, 100).unwrap().limit, 100);
    }

    #[test]
    fn rejects_bad_sort() {
        let mut bad = query(None, None);
        bad.sort = Some("password".to_string());
        assert!(matches!(Filter::from_query(&bad, 100), Err(FilterError::InvalidSort(_))));
    }
}
