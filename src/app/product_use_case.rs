use crate::domain::{NewProduct, Product};
use crate::observability::{record_mutation, Outcome};
use crate::storage::{Storage, LOW_STOCK_THRESHOLD};
use crate::validation::{is_blank, is_valid_price, price_from_f64};
use std::sync::Arc;
use tracing::{error, info};

/// Amount added to each low-stock product by a restock run.
pub const RESTOCK_INCREMENT: i64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateProductResult {
    pub product: Option<Product>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestockResult {
    pub updated_products: Vec<Product>,
    pub message: String,
    pub errors: Vec<String>,
}

pub struct ProductUseCase {
    storage: Arc<dyn Storage>,
}

impl ProductUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Field errors are collected together; nothing is written if any exist.
    pub async fn create_product(&self, input: ProductInput) -> CreateProductResult {
        let Some(price) = price_from_f64(input.price) else {
            record_mutation("create_product", Outcome::Rejected);
            return CreateProductResult { product: None, errors: vec!["Price must be a valid number.".to_string()] };
        };

        let mut errors = Vec::new();
        if !is_valid_price(price) {
            errors.push("Price must be positive.".to_string());
        }
        let stock = input.stock.unwrap_or(0);
        if stock < 0 {
            errors.push("Stock cannot be negative.".to_string());
        }
        if is_blank(&input.name) {
            errors.push("Name is required.".to_string());
        }
        if !errors.is_empty() {
            record_mutation("create_product", Outcome::Rejected);
            return CreateProductResult { product: None, errors };
        }

        let new_product = NewProduct { name: input.name.trim().to_string(), price, stock };
        match self.storage.create_product(&new_product).await {
            Ok(product) => {
                info!("Created product {} ({} @ {})", product.id, product.name, product.price);
                record_mutation("create_product", Outcome::Success);
                CreateProductResult { product: Some(product), errors: Vec::new() }
            }
            Err(e) => {
                error!("Failed to create product {}: {}", new_product.name, e);
                record_mutation("create_product", Outcome::Failed);
                CreateProductResult { product: None, errors: vec![format!("Failed to create product: {e}")] }
            }
        }
    }

    /// Adds [`RESTOCK_INCREMENT`] to every product whose stock is below the low-stock threshold.
    pub async fn update_low_stock_products(&self) -> RestockResult {
        match self.storage.restock_below(LOW_STOCK_THRESHOLD, RESTOCK_INCREMENT).await {
            Ok(updated_products) => {
                let message = format!("Updated {} low-stock products.", updated_products.len());
                info!("{}", message);
                record_mutation("update_low_stock_products", Outcome::Success);
                RestockResult { updated_products, message, errors: Vec::new() }
            }
            Err(e) => {
                error!("Restock failed: {}", e);
                record_mutation("update_low_stock_products", Outcome::Failed);
                RestockResult {
                    updated_products: Vec::new(),
                    message: "Updated 0 low-stock products.".to_string(),
                    errors: vec![format!("Failed to restock products: {e}")],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ProductFilter, SqliteStorage};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn input(name: &str, price: f64, stock: Option<i64>) -> ProductInput {
        ProductInput { name: name.to_string(), price, stock }
    }

    fn use_case() -> (ProductUseCase, Arc<SqliteStorage>) {
        let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
        (ProductUseCase::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn stock_defaults_to_zero() {
        let (use_case, _) = use_case();
        let result = use_case.create_product(input("Laptop", 999.99, None)).await;
        let product = result.product.unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.price, Decimal::from_str("999.99").unwrap());
    }

    #[tokio::test]
    async fn collects_all_field_errors() {
        let (use_case, storage) = use_case();
        let result = use_case.create_product(input("Broken", -1.0, Some(-3))).await;
        assert!(result.product.is_none());
        assert_eq!(result.errors, vec!["Price must be positive.", "Stock cannot be negative."]);

        let nameless = use_case.create_product(input(" ", 0.0, Some(-1))).await;
        assert_eq!(
            nameless.errors,
            vec!["Price must be positive.", "Stock cannot be negative.", "Name is required."]
        );
        assert!(storage.list_products(&ProductFilter::default(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_non_numeric_and_sub_cent_prices() {
        let (use_case, _) = use_case();
        let nan = use_case.create_product(input("NaN", f64::NAN, None)).await;
        assert_eq!(nan.errors, vec!["Price must be a valid number."]);

        let tiny = use_case.create_product(input("Tiny", 0.004, None)).await;
        assert_eq!(tiny.errors, vec!["Price must be positive."]);
    }

    #[tokio::test]
    async fn restock_adds_ten_below_threshold_only() {
        let (use_case, storage) = use_case();
        let low = use_case.create_product(input("Cable", 4.99, Some(2))).await.product.unwrap();
        let edge = use_case.create_product(input("Mouse", 19.99, Some(9))).await.product.unwrap();
        let full = use_case.create_product(input("Monitor", 199.0, Some(10))).await.product.unwrap();

        let result = use_case.update_low_stock_products().await;
        assert_eq!(result.message, "Updated 2 low-stock products.");
        assert!(result.errors.is_empty());

        assert_eq!(storage.get_product(low.id).await.unwrap().unwrap().stock, 12);
        assert_eq!(storage.get_product(edge.id).await.unwrap().unwrap().stock, 19);
        assert_eq!(storage.get_product(full.id).await.unwrap().unwrap().stock, 10);

        let again = use_case.update_low_stock_products().await;
        assert_eq!(again.message, "Updated 0 low-stock products.");
        assert!(again.updated_products.is_empty());
    }
}
