//! Demo data: a fixed set of customers and products plus a few random orders.

use crate::app::order_total;
use crate::domain::{Customer, NewCustomer, NewOrder, NewProduct, Order, Product};
use crate::error::Result;
use crate::storage::Storage;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::info;

pub const SEED_ORDER_COUNT: usize = 5;

const CUSTOMERS: [(&str, &str, &str); 5] = [
    ("Alice Johnson", "alice@example.com", "+1234567890"),
    ("Bob Smith", "bob@example.com", "123-456-7890"),
    ("Carol White", "carol@example.com", "+1987654321"),
    ("David Green", "david@example.com", "321-654-0987"),
    ("Eve Black", "eve@example.com", "+1478523690"),
];

// (name, price in cents, stock)
const PRODUCTS: [(&str, i64, i64); 5] = [
    ("Laptop", 99999, 10),
    ("Smartphone", 69999, 25),
    ("Tablet", 39999, 15),
    ("Headphones", 14999, 40),
    ("Smartwatch", 24999, 20),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
}

async fn seed_customers(storage: &dyn Storage) -> Result<Vec<Customer>> {
    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (name, email, phone) in CUSTOMERS {
        let customer = match storage.get_customer_by_email(email).await? {
            Some(existing) => existing,
            None => {
                storage
                    .create_customer(&NewCustomer {
                        name: name.to_string(),
                        email: email.to_string(),
                        phone: Some(phone.to_string()),
                    })
                    .await?
            }
        };
        customers.push(customer);
    }
    info!("Seeded {} customers", customers.len());
    Ok(customers)
}

async fn seed_products(storage: &dyn Storage) -> Result<Vec<Product>> {
    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, cents, stock) in PRODUCTS {
        let product = match storage.get_product_by_name(name).await? {
            Some(existing) => existing,
            None => {
                storage
                    .create_product(&NewProduct { name: name.to_string(), price: Decimal::new(cents, 2), stock })
                    .await?
            }
        };
        products.push(product);
    }
    info!("Seeded {} products", products.len());
    Ok(products)
}

async fn seed_orders<R: Rng + Send>(
    storage: &dyn Storage,
    customers: &[Customer],
    products: &[Product],
    rng: &mut R,
) -> Result<Vec<Order>> {
    let mut orders = Vec::with_capacity(SEED_ORDER_COUNT);
    for _ in 0..SEED_ORDER_COUNT {
        // Draw everything before awaiting so the rng borrow stays local.
        let (customer_id, selected) = {
            let Some(customer) = customers.choose(rng) else { break };
            let count = rng.gen_range(1..=3).min(products.len());
            let selected: Vec<Product> = products.choose_multiple(rng, count).cloned().collect();
            (customer.id, selected)
        };
        if selected.is_empty() {
            break;
        }

        let order = storage
            .create_order(&NewOrder {
                customer_id,
                product_ids: selected.iter().map(|p| p.id).collect(),
                total_amount: order_total(&selected),
                order_date: Utc::now(),
            })
            .await?;
        orders.push(order);
    }
    info!("Seeded {} orders", orders.len());
    Ok(orders)
}

/// Customers and products are matched by email and name, so re-running only adds orders.
pub async fn seed_with_rng<R: Rng + Send>(storage: &dyn Storage, rng: &mut R) -> Result<SeedSummary> {
    info!("Seeding database...");
    let customers = seed_customers(storage).await?;
    let products = seed_products(storage).await?;
    let orders = seed_orders(storage, &customers, &products, rng).await?;
    info!("Database seeding complete");

    Ok(SeedSummary { customers: customers.len(), products: products.len(), orders: orders.len() })
}

pub async fn seed(storage: &dyn Storage) -> Result<SeedSummary> {
    seed_with_rng(storage, &mut StdRng::from_entropy()).await
}
