//! Pagination parameter parsing and in-memory paging.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::pagination::types::{
    PaginatedResponse, PaginationMeta, PaginationParams, PaginationQuery, SortOrder, DEFAULT_LIMIT,
    DEFAULT_PAGE, MAX_LIMIT,
};

impl PaginationParams {
    /// Validate raw query parameters.
    ///
    /// `page` is at least 1 and `limit` is clamped to `1..=MAX_LIMIT`.
    /// Values that do not parse as integers fall back to the defaults.
    pub fn from_query(query: &PaginationQuery) -> Self {
        let page = parse_or(query.page.as_deref(), DEFAULT_PAGE as i64).max(1);
        let limit = parse_or(query.limit.as_deref(), DEFAULT_LIMIT as i64).clamp(1, MAX_LIMIT as i64);

        Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            limit: limit as u32,
            sort_by: query
                .sort_by
                .as_deref()
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string),
            sort_order: query
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
        }
    }

    /// Number of items before the first item of this page.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(params.limit as u64).max(1);
        Self {
            current_page: params.page,
            total_pages,
            total_items,
            items_per_page: params.limit,
            has_next_page: (params.page as u64) < total_pages,
            has_previous_page: params.page > 1,
        }
    }
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(params, total_items),
        }
    }
}

/// Sort (when `sort_by` is set) and slice an in-memory collection.
///
/// Items are compared on the named field of their JSON form. Items missing
/// the field, or holding `null`, always sort after the rest.
pub fn paginate<T>(items: &[T], params: &PaginationParams) -> PaginatedResponse<T>
where
    T: Serialize + Clone,
{
    let mut ordered: Vec<&T> = items.iter().collect();

    if let Some(field) = &params.sort_by {
        let mut keyed: Vec<(Option<Value>, &T)> = ordered
            .into_iter()
            .map(|item| (sort_key(item, field), item))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| compare_values(a.as_ref(), b.as_ref(), params.sort_order));
        ordered = keyed.into_iter().map(|(_, item)| item).collect();
    }

    let data = ordered
        .into_iter()
        .skip(params.offset() as usize)
        .take(params.limit as usize)
        .cloned()
        .collect();

    PaginatedResponse::new(data, params, items.len() as u64)
}

fn sort_key<T: Serialize>(item: &T, field: &str) -> Option<Value> {
    match serde_json::to_value(item) {
        Ok(Value::Object(mut map)) => map.remove(field).filter(|value| !value.is_null()),
        _ => None,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let ascending = match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (a, b) => a.to_string().cmp(&b.to_string()),
    };

    match order {
        SortOrder::Asc => ascending,
        SortOrder::Desc => ascending.reverse(),
    }
}
