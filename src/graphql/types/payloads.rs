//! Mutation payloads: the affected object(s) plus human-readable errors.

use super::{Customer, Order, Product};
use crate::app::{BulkCreateCustomersResult, CreateCustomerResult, CreateOrderResult, CreateProductResult, RestockResult};
use async_graphql::SimpleObject;

#[derive(SimpleObject)]
pub struct CreateCustomerPayload {
    pub customer: Option<Customer>,
    pub message: Option<String>,
    pub errors: Vec<String>,
}

impl From<CreateCustomerResult> for CreateCustomerPayload {
    fn from(result: CreateCustomerResult) -> Self {
        Self { customer: result.customer.map(Into::into), message: result.message, errors: result.errors }
    }
}

#[derive(SimpleObject)]
pub struct BulkCreateCustomersPayload {
    /// Customers that passed validation and were stored
    pub customers: Vec<Customer>,
    /// One entry per rejected row
    pub errors: Vec<String>,
}

impl From<BulkCreateCustomersResult> for BulkCreateCustomersPayload {
    fn from(result: BulkCreateCustomersResult) -> Self {
        Self { customers: result.customers.into_iter().map(Into::into).collect(), errors: result.errors }
    }
}

#[derive(SimpleObject)]
pub struct CreateProductPayload {
    pub product: Option<Product>,
    pub errors: Vec<String>,
}

impl From<CreateProductResult> for CreateProductPayload {
    fn from(result: CreateProductResult) -> Self {
        Self { product: result.product.map(Into::into), errors: result.errors }
    }
}

#[derive(SimpleObject)]
pub struct CreateOrderPayload {
    pub order: Option<Order>,
    pub errors: Vec<String>,
}

impl From<CreateOrderResult> for CreateOrderPayload {
    fn from(result: CreateOrderResult) -> Self {
        Self { order: result.order.map(Into::into), errors: result.errors }
    }
}

#[derive(SimpleObject)]
pub struct UpdateLowStockProductsPayload {
    pub updated_products: Vec<Product>,
    pub message: String,
    pub errors: Vec<String>,
}

impl From<RestockResult> for UpdateLowStockProductsPayload {
    fn from(result: RestockResult) -> Self {
        Self {
            updated_products: result.updated_products.into_iter().map(Into::into).collect(),
            message: result.message,
            errors: result.errors,
        }
    }
}
