use super::error::FilterError;
use super::types::{TableOrder, TableSort};

pub struct FilterOrder;

impl FilterOrder {
    pub fn parse_sort(sort: Option<&str>) -> Result<TableSort, FilterError> {
        let raw = sort.map(str::trim).filter(|s| !s.is_empty()).ok_or(FilterError::MissingSort)?;
        TableSort::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| FilterError::InvalidSort(raw.to_string()))
    }

    pub fn parse_order(order: Option<&str>) -> Result<TableOrder, FilterError> {
        let raw = order.map(str::trim).filter(|s| !s.is_empty()).ok_or(FilterError::MissingOrder)?;
        if raw.eq_ignore_ascii_case("asc") {
            Ok(TableOrder::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Ok(TableOrder::Desc)
        } else {
            Err(FilterError::InvalidOrder(raw.to_string()))
        }
    }

    /// ORDER BY clause for a validated sort. `id` breaks ties so paging is stable.
    pub fn generate(sort: TableSort, order: TableOrder) -> String {
        format!("ORDER BY {} {}, \"id\" {}", sort.column(), order.to_sql(), order.to_sql())
    }
}
