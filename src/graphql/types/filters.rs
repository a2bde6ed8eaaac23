use crate::storage::{CustomerFilter, OrderFilter, ProductFilter};
use async_graphql::{InputObject, ID};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(InputObject, Clone, Debug, Default)]
pub struct CustomerFilterInput {
    /// Case-insensitive substring of the name
    pub name_icontains: Option<String>,
    /// Case-insensitive substring of the email
    pub email_icontains: Option<String>,
    /// Phone number prefix, e.g. "+1"
    pub phone_pattern: Option<String>,
}

impl From<CustomerFilterInput> for CustomerFilter {
    fn from(input: CustomerFilterInput) -> Self {
        Self {
            name_icontains: input.name_icontains,
            email_icontains: input.email_icontains,
            phone_pattern: input.phone_pattern,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct ProductFilterInput {
    pub name_icontains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i64>,
    pub stock_lte: Option<i64>,
    /// Only products with stock below 10 (or, when false, at least 10)
    pub low_stock: Option<bool>,
}

impl From<ProductFilterInput> for ProductFilter {
    fn from(input: ProductFilterInput) -> Self {
        Self {
            name_icontains: input.name_icontains,
            price_gte: input.price_gte,
            price_lte: input.price_lte,
            stock_gte: input.stock_gte,
            stock_lte: input.stock_lte,
            low_stock: input.low_stock,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct OrderFilterInput {
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
    pub customer_name_icontains: Option<String>,
    pub product_name_icontains: Option<String>,
    /// Orders containing this product
    pub product_id: Option<ID>,
}

impl TryFrom<OrderFilterInput> for OrderFilter {
    type Error = String;

    fn try_from(input: OrderFilterInput) -> Result<Self, Self::Error> {
        let product_id = input
            .product_id
            .map(|id| id.parse::<i64>().map_err(|_| format!("Invalid product ID: {}", id.0)))
            .transpose()?;
        Ok(Self {
            total_amount_gte: input.total_amount_gte,
            total_amount_lte: input.total_amount_lte,
            order_date_gte: input.order_date_gte,
            order_date_lte: input.order_date_lte,
            customer_name_icontains: input.customer_name_icontains,
            product_name_icontains: input.product_name_icontains,
            product_id,
        })
    }
}
