//! Filters and ordering accepted by the list queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::ProductId;

/// Stock level below which a product counts as low.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub name_icontains: Option<String>,
    pub email_icontains: Option<String>,
    /// Phone number prefix, e.g. `+1`.
    pub phone_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub name_icontains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i64>,
    pub stock_lte: Option<i64>,
    pub low_stock: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
    pub customer_name_icontains: Option<String>,
    pub product_name_icontains: Option<String>,
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A single sort key, restricted to a whitelisted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: Direction,
}

pub const CUSTOMER_SORT_COLUMNS: &[&str] = &["id", "name", "email", "phone"];
pub const PRODUCT_SORT_COLUMNS: &[&str] = &["id", "name", "price", "stock"];
pub const ORDER_SORT_COLUMNS: &[&str] = &["id", "customer_id", "total_amount", "order_date"];

impl OrderBy {
    /// Parses `"name"`, `"-order_date"` or `"-orderDate"` against the allowed columns.
    pub fn parse(raw: &str, allowed: &[&'static str]) -> Result<Self, String> {
        let raw = raw.trim();
        let (direction, field) = match raw.strip_prefix('-') {
            Some(rest) => (Direction::Desc, rest),
            None => (Direction::Asc, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let column = to_snake_case(field);
        allowed
            .iter()
            .find(|c| **c == column)
            .map(|c| OrderBy { column: *c, direction })
            .ok_or_else(|| format!("Cannot order by '{}'. Allowed fields: {}", field, allowed.join(", ")))
    }

    pub fn desc(column: &'static str) -> Self {
        Self { column, direction: Direction::Desc }
    }
}

fn to_snake_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direction_and_case() {
        assert_eq!(OrderBy::parse("-order_date", ORDER_SORT_COLUMNS).unwrap(), OrderBy::desc("order_date"));
        assert_eq!(OrderBy::parse("-orderDate", ORDER_SORT_COLUMNS).unwrap(), OrderBy::desc("order_date"));
        assert_eq!(
            OrderBy::parse("name", CUSTOMER_SORT_COLUMNS).unwrap(),
            OrderBy { column: "name", direction: Direction::Asc }
        );
    }

    #[test]
    fn rejects_unknown_columns() {
        let err = OrderBy::parse("name; DROP TABLE customers", CUSTOMER_SORT_COLUMNS).unwrap_err();
        assert!(err.starts_with("Cannot order by"));
        assert!(OrderBy::parse("stock", CUSTOMER_SORT_COLUMNS).is_err());
    }
}
