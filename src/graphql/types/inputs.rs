use crate::app;
use async_graphql::{InputObject, ID};
use chrono::{DateTime, Utc};

#[derive(InputObject, Clone, Debug)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<CustomerInput> for app::CustomerInput {
    fn from(input: CustomerInput) -> Self {
        Self { name: input.name, email: input.email, phone: input.phone }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    /// Defaults to 0
    pub stock: Option<i64>,
}

impl From<ProductInput> for app::ProductInput {
    fn from(input: ProductInput) -> Self {
        Self { name: input.name, price: input.price, stock: input.stock }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct OrderInput {
    pub customer_id: ID,
    pub product_ids: Vec<ID>,
    /// Defaults to the time the order is created
    pub order_date: Option<DateTime<Utc>>,
}

impl From<OrderInput> for app::OrderInput {
    fn from(input: OrderInput) -> Self {
        Self {
            customer_id: input.customer_id.0,
            product_ids: input.product_ids.into_iter().map(|id| id.0).collect(),
            order_date: input.order_date,
        }
    }
}
