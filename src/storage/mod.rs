pub mod query;
pub mod sqlite;

pub use query::{CustomerFilter, Direction, OrderBy, OrderFilter, ProductFilter, LOW_STOCK_THRESHOLD};
pub use sqlite::{SqliteStorage, DATETIME_SUBSEC_DIGITS};

use crate::domain::*;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence boundary for customers, products and orders.
#[async_trait]
pub trait Storage: Send + Sync {
    // Customer operations
    async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer>;
    /// Inserts every row or none of them.
    async fn create_customers(&self, customers: &[NewCustomer]) -> Result<Vec<Customer>>;
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;
    async fn get_customer_by_email(&self, email: &str) -> Result<Option<Customer>>;
    async fn email_exists(&self, email: &str) -> Result<bool>;
    async fn list_customers(&self, filter: &CustomerFilter, order_by: Option<OrderBy>) -> Result<Vec<Customer>>;

    // Product operations
    async fn create_product(&self, product: &NewProduct) -> Result<Product>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;
    async fn get_product_by_name(&self, name: &str) -> Result<Option<Product>>;
    async fn get_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>>;
    async fn list_products(&self, filter: &ProductFilter, order_by: Option<OrderBy>) -> Result<Vec<Product>>;
    /// Adds `increment` to the stock of every product below `threshold`, returning the updated rows.
    async fn restock_below(&self, threshold: i64, increment: i64) -> Result<Vec<Product>>;

    // Order operations
    /// Writes the order and its product references atomically.
    async fn create_order(&self, order: &NewOrder) -> Result<Order>;
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;
    async fn list_orders(&self, filter: &OrderFilter, order_by: Option<OrderBy>) -> Result<Vec<Order>>;
    async fn get_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;
}
