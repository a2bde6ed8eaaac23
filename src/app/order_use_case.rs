use crate::domain::{NewOrder, Order, Product, ProductId};
use crate::observability::{record_mutation, Outcome};
use crate::storage::{Storage, DATETIME_SUBSEC_DIGITS};
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info};

/// Order request with ids exactly as the client sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderInput {
    pub customer_id: String,
    pub product_ids: Vec<String>,
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateOrderResult {
    pub order: Option<Order>,
    pub errors: Vec<String>,
}

pub struct OrderUseCase {
    storage: Arc<dyn Storage>,
}

/// Sum of the listed prices; the order keeps this value even if prices change later.
pub fn order_total(products: &[Product]) -> Decimal {
    products.iter().map(|p| p.price).sum()
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

impl OrderUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Checks the customer, then every product id, reporting all bad product ids
    /// together. The order and its product references are written atomically.
    pub async fn create_order(&self, input: OrderInput) -> CreateOrderResult {
        match self.try_create_order(input).await {
            Ok(order) => {
                record_mutation("create_order", Outcome::Success);
                CreateOrderResult { order: Some(order), errors: Vec::new() }
            }
            Err((outcome, errors)) => {
                record_mutation("create_order", outcome);
                CreateOrderResult { order: None, errors }
            }
        }
    }

    async fn try_create_order(&self, input: OrderInput) -> Result<Order, (Outcome, Vec<String>)> {
        let reject = |message: String| (Outcome::Rejected, vec![message]);
        let failed = |e: crate::error::CrmError| (Outcome::Failed, vec![format!("Failed to create order: {e}")]);

        let customer = match parse_id(&input.customer_id) {
            Some(id) => self.storage.get_customer(id).await.map_err(failed)?,
            None => None,
        };
        let Some(customer) = customer else {
            return Err(reject("Invalid customer ID.".to_string()));
        };

        if input.product_ids.is_empty() {
            return Err(reject("At least one product must be provided.".to_string()));
        }

        // Repeated ids reference the same product once.
        let mut seen = HashSet::new();
        let requested: Vec<&str> = input.product_ids.iter().map(|raw| raw.trim()).filter(|raw| seen.insert(*raw)).collect();
        let parsed: Vec<ProductId> = requested.iter().filter_map(|raw| parse_id(raw)).collect();

        let found: HashMap<ProductId, Product> = self
            .storage
            .get_products_by_ids(&parsed)
            .await
            .map_err(failed)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut errors = Vec::new();
        let mut products = Vec::with_capacity(requested.len());
        for raw in requested {
            match parse_id(raw).and_then(|id| found.get(&id)) {
                Some(product) => products.push(product.clone()),
                None => errors.push(format!("Invalid product ID: {raw}")),
            }
        }
        if !errors.is_empty() {
            return Err((Outcome::Rejected, errors));
        }

        let new_order = NewOrder {
            customer_id: customer.id,
            product_ids: products.iter().map(|p| p.id).collect(),
            total_amount: order_total(&products),
            order_date: input.order_date.unwrap_or_else(Utc::now).trunc_subsecs(DATETIME_SUBSEC_DIGITS),
        };
        let order = self.storage.create_order(&new_order).await.map_err(|e| {
            error!("Failed to create order for customer {}: {}", customer.id, e);
            failed(e)
        })?;
        info!("Created order {} for customer {} totalling {}", order.id, customer.email, order.total_amount);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Customer, NewCustomer, NewProduct};
    use crate::storage::{OrderFilter, SqliteStorage};
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct Fixture {
        use_case: OrderUseCase,
        storage: Arc<SqliteStorage>,
        customer: Customer,
        laptop: Product,
        tablet: Product,
    }

    async fn fixture() -> Fixture {
        let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
        let customer = storage
            .create_customer(&NewCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        let laptop = storage
            .create_product(&NewProduct { name: "Laptop".to_string(), price: dec("999.99"), stock: 10 })
            .await
            .unwrap();
        let tablet = storage
            .create_product(&NewProduct { name: "Tablet".to_string(), price: dec("399.99"), stock: 15 })
            .await
            .unwrap();
        Fixture { use_case: OrderUseCase::new(storage.clone()), storage, customer, laptop, tablet }
    }

    fn input(customer_id: i64, product_ids: &[&str]) -> OrderInput {
        OrderInput {
            customer_id: customer_id.to_string(),
            product_ids: product_ids.iter().map(|s| s.to_string()).collect(),
            order_date: None,
        }
    }

    #[tokio::test]
    async fn total_is_sum_of_prices() {
        let f = fixture().await;
        let (laptop, tablet) = (f.laptop.id.to_string(), f.tablet.id.to_string());
        let result = f.use_case.create_order(input(f.customer.id, &[laptop.as_str(), tablet.as_str()])).await;

        let order = result.order.unwrap();
        assert_eq!(order.total_amount, dec("1399.98"));
        assert_eq!(order.product_ids, vec![f.laptop.id, f.tablet.id]);
        assert_eq!(order.customer_id, f.customer.id);
    }

    #[tokio::test]
    async fn unknown_customer_fails_first() {
        let f = fixture().await;
        let result = f.use_case.create_order(input(999, &[])).await;
        assert_eq!(result.errors, vec!["Invalid customer ID."]);

        let garbage = OrderInput { customer_id: "abc".to_string(), ..Default::default() };
        assert_eq!(f.use_case.create_order(garbage).await.errors, vec!["Invalid customer ID."]);
    }

    #[tokio::test]
    async fn empty_product_list_is_rejected() {
        let f = fixture().await;
        let result = f.use_case.create_order(input(f.customer.id, &[])).await;
        assert!(result.order.is_none());
        assert_eq!(result.errors, vec!["At least one product must be provided."]);
    }

    #[tokio::test]
    async fn every_invalid_product_is_named_and_nothing_is_written() {
        let f = fixture().await;
        let laptop = f.laptop.id.to_string();
        let result = f.use_case.create_order(input(f.customer.id, &[laptop.as_str(), "777", "nope"])).await;

        assert!(result.order.is_none());
        assert_eq!(result.errors, vec!["Invalid product ID: 777", "Invalid product ID: nope"]);
        assert!(f.storage.list_orders(&OrderFilter::default(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_count_once() {
        let f = fixture().await;
        let tablet = f.tablet.id.to_string();
        let order = f.use_case.create_order(input(f.customer.id, &[tablet.as_str(), tablet.as_str()])).await.order.unwrap();
        assert_eq!(order.product_ids, vec![f.tablet.id]);
        assert_eq!(order.total_amount, dec("399.99"));
    }

    #[tokio::test]
    async fn explicit_order_date_is_kept() {
        let f = fixture().await;
        let when = Utc.with_ymd_and_hms(2024, 12, 24, 18, 30, 0).unwrap();
        let laptop = f.laptop.id.to_string();
        let mut request = input(f.customer.id, &[laptop.as_str()]);
        request.order_date = Some(when);

        let order = f.use_case.create_order(request).await.order.unwrap();
        let stored = f.storage.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.order_date, when);
    }

    #[tokio::test]
    async fn sub_microsecond_date_matches_stored_value() {
        let f = fixture().await;
        let when = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::nanoseconds(123_456_789);
        let laptop = f.laptop.id.to_string();
        let mut request = input(f.customer.id, &[laptop.as_str()]);
        request.order_date = Some(when);

        let order = f.use_case.create_order(request).await.order.unwrap();
        let stored = f.storage.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(order.order_date, stored.order_date);
        assert_eq!(order.order_date, when - chrono::Duration::nanoseconds(789));
    }
}
