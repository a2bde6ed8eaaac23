use super::query::{CustomerFilter, Direction, OrderBy, OrderFilter, ProductFilter};
use super::Storage;
use crate::domain::*;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS customers (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        name   TEXT NOT NULL,
        email  TEXT NOT NULL UNIQUE,
        phone  TEXT
    );
    CREATE TABLE IF NOT EXISTS products (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        name   TEXT NOT NULL,
        price  TEXT NOT NULL,
        stock  INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0)
    );
    CREATE TABLE IF NOT EXISTS orders (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id   INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
        total_amount  TEXT NOT NULL,
        order_date    TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS order_products (
        order_id    INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id  INTEGER NOT NULL REFERENCES products(id),
        PRIMARY KEY (order_id, product_id)
    );
    CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id);
    CREATE INDEX IF NOT EXISTS idx_orders_date ON orders(order_date);
"#;

/// Ids bound per `IN (...)` query; stays under SQLite's host parameter limit.
const MAX_BOUND_IDS: usize = 500;

const CUSTOMER_COLUMNS: &str = "id, name, email, phone";
const PRODUCT_COLUMNS: &str = "id, name, price, stock";

/// SQLite-backed storage. A single connection is shared behind a mutex; every
/// multi-row write runs inside one transaction.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!("Opening SQLite database at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves nothing half-applied outside a transaction,
        // so a poisoned lock is still usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Dates are stored with microsecond precision.
pub const DATETIME_SUBSEC_DIGITS: u16 = 6;

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
    })
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: decimal_column(row, 2)?,
        stock: row.get(3)?,
    })
}

/// Order row without its product references.
fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        product_ids: Vec::new(),
        total_amount: decimal_column(row, 2)?,
        order_date: datetime_column(row, 3)?,
    })
}

fn load_product_ids(conn: &Connection, order_id: OrderId) -> rusqlite::Result<Vec<ProductId>> {
    let mut stmt = conn.prepare_cached("SELECT product_id FROM order_products WHERE order_id = ?1 ORDER BY rowid")?;
    let ids = stmt.query_map(params![order_id], |row| row.get(0))?;
    ids.collect()
}

fn with_product_ids(conn: &Connection, mut orders: Vec<Order>) -> rusqlite::Result<Vec<Order>> {
    for order in &mut orders {
        order.product_ids = load_product_ids(conn, order.id)?;
    }
    Ok(orders)
}

fn insert_customer(conn: &Connection, customer: &NewCustomer) -> rusqlite::Result<Customer> {
    conn.execute(
        "INSERT INTO customers (name, email, phone) VALUES (?1, ?2, ?3)",
        params![customer.name, customer.email, customer.phone],
    )?;
    Ok(Customer {
        id: conn.last_insert_rowid(),
        name: customer.name.clone(),
        email: customer.email.clone(),
        phone: customer.phone.clone(),
    })
}

/// `%needle%` pattern for LIKE with `\` as the escape character. SQLite's LIKE
/// folds ASCII case only, so non-ASCII letters must match exactly.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = contains_pattern(prefix);
    pattern.remove(0);
    pattern
}

fn decimal_value(d: &Decimal) -> Value {
    use rust_decimal::prelude::ToPrimitive;
    Value::Real(d.to_f64().unwrap_or(0.0))
}

/// Accumulates `WHERE` clauses with their bound values.
#[derive(Default)]
struct WhereBuilder {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl WhereBuilder {
    fn push(&mut self, clause: &str, value: Value) {
        self.values.push(value);
        self.clauses.push(clause.replace('?', &format!("?{}", self.values.len())));
    }

    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn order_clause(order_by: Option<OrderBy>, prefix: &str) -> String {
    match order_by {
        Some(OrderBy { column, direction }) => {
            let dir = match direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            let expr = match column {
                "price" | "total_amount" => format!("CAST({prefix}{column} AS REAL)"),
                _ => format!("{prefix}{column}"),
            };
            format!(" ORDER BY {expr} {dir}, {prefix}id ASC")
        }
        None => format!(" ORDER BY {prefix}id ASC"),
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer> {
        let conn = self.conn();
        let created = insert_customer(&conn, customer)?;
        debug!("Created customer: {} with id {}", created.email, created.id);
        Ok(created)
    }

    async fn create_customers(&self, customers: &[NewCustomer]) -> Result<Vec<Customer>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(customers.len());
        for customer in customers {
            created.push(insert_customer(&tx, customer)?);
        }
        tx.commit()?;
        debug!("Created {} customers in one transaction", created.len());
        Ok(created)
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let conn = self.conn();
        let customer = conn
            .query_row(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"),
                params![id],
                customer_from_row,
            )
            .optional()?;
        Ok(customer)
    }

    async fn get_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let conn = self.conn();
        let customer = conn
            .query_row(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = ?1"),
                params![email],
                customer_from_row,
            )
            .optional()?;
        Ok(customer)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn list_customers(&self, filter: &CustomerFilter, order_by: Option<OrderBy>) -> Result<Vec<Customer>> {
        let mut wb = WhereBuilder::default();
        if let Some(name) = &filter.name_icontains {
            wb.push(r"name LIKE ? ESCAPE '\'", Value::Text(contains_pattern(name)));
        }
        if let Some(email) = &filter.email_icontains {
            wb.push(r"email LIKE ? ESCAPE '\'", Value::Text(contains_pattern(email)));
        }
        if let Some(prefix) = &filter.phone_pattern {
            wb.push(r"phone LIKE ? ESCAPE '\'", Value::Text(prefix_pattern(prefix)));
        }
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers{}{}",
            wb.sql(),
            order_clause(order_by, "")
        );

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(wb.values), customer_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO products (name, price, stock) VALUES (?1, ?2, ?3)",
            params![product.name, product.price.to_string(), product.stock],
        )?;
        let created = Product {
            id: conn.last_insert_rowid(),
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
        };
        debug!("Created product: {} with id {}", created.name, created.id);
        Ok(created)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let conn = self.conn();
        let product = conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                params![id],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    async fn get_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let conn = self.conn();
        let product = conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1 ORDER BY id LIMIT 1"),
                params![name],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    async fn get_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let conn = self.conn();
        let mut products = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_BOUND_IDS) {
            let placeholders = (1..=chunk.len()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");
            let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ({placeholders})");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), product_from_row)?;
            for row in rows {
                products.push(row?);
            }
        }
        products.sort_by_key(|p| p.id);
        products.dedup_by_key(|p| p.id);
        Ok(products)
    }

    async fn list_products(&self, filter: &ProductFilter, order_by: Option<OrderBy>) -> Result<Vec<Product>> {
        let mut wb = WhereBuilder::default();
        if let Some(name) = &filter.name_icontains {
            wb.push(r"name LIKE ? ESCAPE '\'", Value::Text(contains_pattern(name)));
        }
        if let Some(min) = &filter.price_gte {
            wb.push("CAST(price AS REAL) >= ?", decimal_value(min));
        }
        if let Some(max) = &filter.price_lte {
            wb.push("CAST(price AS REAL) <= ?", decimal_value(max));
        }
        if let Some(min) = filter.stock_gte {
            wb.push("stock >= ?", Value::Integer(min));
        }
        if let Some(max) = filter.stock_lte {
            wb.push("stock <= ?", Value::Integer(max));
        }
        match filter.low_stock {
            Some(true) => wb.push("stock < ?", Value::Integer(super::LOW_STOCK_THRESHOLD)),
            Some(false) => wb.push("stock >= ?", Value::Integer(super::LOW_STOCK_THRESHOLD)),
            None => {}
        }
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products{}{}",
            wb.sql(),
            order_clause(order_by, "")
        );

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(wb.values), product_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn restock_below(&self, threshold: i64, increment: i64) -> Result<Vec<Product>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut products = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock < ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![threshold], product_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for product in &mut products {
            tx.execute(
                "UPDATE products SET stock = stock + ?1 WHERE id = ?2",
                params![increment, product.id],
            )?;
            product.stock += increment;
        }
        tx.commit()?;
        debug!("Restocked {} products below {}", products.len(), threshold);
        Ok(products)
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order> {
        let order_date = order.order_date.trunc_subsecs(DATETIME_SUBSEC_DIGITS);
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO orders (customer_id, total_amount, order_date) VALUES (?1, ?2, ?3)",
            params![
                order.customer_id,
                order.total_amount.to_string(),
                format_datetime(&order_date)
            ],
        )?;
        let order_id = tx.last_insert_rowid();
        for product_id in &order.product_ids {
            tx.execute(
                "INSERT OR IGNORE INTO order_products (order_id, product_id) VALUES (?1, ?2)",
                params![order_id, product_id],
            )?;
        }
        let product_ids = load_product_ids(&tx, order_id)?;
        tx.commit()?;

        debug!("Created order {} for customer {}", order_id, order.customer_id);
        Ok(Order {
            id: order_id,
            customer_id: order.customer_id,
            product_ids,
            total_amount: order.total_amount,
            order_date,
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let conn = self.conn();
        let order = conn
            .query_row(
                "SELECT id, customer_id, total_amount, order_date FROM orders WHERE id = ?1",
                params![id],
                order_from_row,
            )
            .optional()?;
        match order {
            Some(mut order) => {
                order.product_ids = load_product_ids(&conn, order.id)?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    async fn list_orders(&self, filter: &OrderFilter, order_by: Option<OrderBy>) -> Result<Vec<Order>> {
        let mut wb = WhereBuilder::default();
        if let Some(min) = &filter.total_amount_gte {
            wb.push("CAST(o.total_amount AS REAL) >= ?", decimal_value(min));
        }
        if let Some(max) = &filter.total_amount_lte {
            wb.push("CAST(o.total_amount AS REAL) <= ?", decimal_value(max));
        }
        if let Some(from) = &filter.order_date_gte {
            wb.push("o.order_date >= ?", Value::Text(format_datetime(from)));
        }
        if let Some(to) = &filter.order_date_lte {
            wb.push("o.order_date <= ?", Value::Text(format_datetime(to)));
        }
        if let Some(name) = &filter.customer_name_icontains {
            wb.push(
                r"EXISTS (SELECT 1 FROM customers c WHERE c.id = o.customer_id AND c.name LIKE ? ESCAPE '\')",
                Value::Text(contains_pattern(name)),
            );
        }
        if let Some(name) = &filter.product_name_icontains {
            wb.push(
                r"EXISTS (SELECT 1 FROM order_products op JOIN products p ON p.id = op.product_id
                   WHERE op.order_id = o.id AND p.name LIKE ? ESCAPE '\')",
                Value::Text(contains_pattern(name)),
            );
        }
        if let Some(product_id) = filter.product_id {
            wb.push(
                "EXISTS (SELECT 1 FROM order_products op WHERE op.order_id = o.id AND op.product_id = ?)",
                Value::Integer(product_id),
            );
        }
        let sql = format!(
            "SELECT o.id, o.customer_id, o.total_amount, o.order_date FROM orders o{}{}",
            wb.sql(),
            order_clause(order_by, "o.")
        );

        let conn = self.conn();
        let orders = {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(wb.values), order_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(with_product_ids(&conn, orders)?)
    }

    async fn get_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let conn = self.conn();
        let orders = {
            let mut stmt = conn.prepare(
                "SELECT id, customer_id, total_amount, order_date FROM orders WHERE customer_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![customer_id], order_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(with_product_ids(&conn, orders)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::query::{OrderBy, ORDER_SORT_COLUMNS, PRODUCT_SORT_COLUMNS};
    use chrono::{Duration, TimeZone};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn new_customer(name: &str, email: &str) -> NewCustomer {
        NewCustomer { name: name.to_string(), email: email.to_string(), phone: None }
    }

    async fn product(storage: &SqliteStorage, name: &str, price: &str, stock: i64) -> Product {
        storage
            .create_product(&NewProduct { name: name.to_string(), price: dec(price), stock })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn bulk_insert_is_all_or_nothing() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.create_customer(&new_customer("Alice", "alice@example.com")).await.unwrap();

        let batch = vec![new_customer("Bob", "bob@example.com"), new_customer("Alice 2", "alice@example.com")];
        assert!(storage.create_customers(&batch).await.is_err());

        assert!(!storage.email_exists("bob@example.com").await.unwrap());
        let all = storage.list_customers(&CustomerFilter::default(), None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn decimals_survive_storage() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let created = product(&storage, "Laptop", "999.99", 3).await;
        let loaded = storage.get_product(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.price, dec("999.99"));
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn product_filters_and_ordering() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        product(&storage, "Laptop", "999.99", 10).await;
        product(&storage, "Phone Case", "9.50", 3).await;
        product(&storage, "Smartphone", "699.99", 25).await;

        let cheap = ProductFilter { price_lte: Some(dec("700")), ..Default::default() };
        let by_price = OrderBy::parse("-price", PRODUCT_SORT_COLUMNS).unwrap();
        let names: Vec<_> = storage
            .list_products(&cheap, Some(by_price))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Smartphone", "Phone Case"]);

        let low = ProductFilter { low_stock: Some(true), ..Default::default() };
        let low = storage.list_products(&low, None).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Phone Case");

        let phone = ProductFilter { name_icontains: Some("PHONE".to_string()), ..Default::default() };
        assert_eq!(storage.list_products(&phone, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn like_wildcards_are_literal() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.create_customer(&new_customer("100% Cotton Ltd", "cotton@example.com")).await.unwrap();
        storage.create_customer(&new_customer("1000 Widgets", "widgets@example.com")).await.unwrap();

        let filter = CustomerFilter { name_icontains: Some("100%".to_string()), ..Default::default() };
        let found = storage.list_customers(&filter, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "cotton@example.com");
    }

    #[tokio::test]
    async fn non_ascii_names_match_in_their_own_case() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.create_customer(&new_customer("Émile Zola", "emile@example.com")).await.unwrap();
        storage.create_customer(&new_customer("Zoë Åkesson", "zoe@example.com")).await.unwrap();

        for needle in ["Émile", "Émile Zola", "ZOLA", "Åkes"] {
            let filter = CustomerFilter { name_icontains: Some(needle.to_string()), ..Default::default() };
            assert_eq!(storage.list_customers(&filter, None).await.unwrap().len(), 1, "needle {needle}");
        }

        let accented = product(&storage, "Crème Brûlée Torch", "24.99", 4).await;
        let filter = ProductFilter { name_icontains: Some("brûlée".to_string()), ..Default::default() };
        let found = storage.list_products(&filter, None).await.unwrap();
        assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![accented.id]);
    }

    #[tokio::test]
    async fn product_lookup_handles_more_ids_than_one_query_binds() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let first = product(&storage, "Cable", "4.99", 5).await;
        let last = product(&storage, "Monitor", "199.00", 5).await;

        let mut ids: Vec<ProductId> = (1_000_000..1_000_000 + 3 * MAX_BOUND_IDS as i64).collect();
        ids.push(last.id);
        ids.insert(0, first.id);

        let found = storage.get_products_by_ids(&ids).await.unwrap();
        assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![first.id, last.id]);
    }

    #[tokio::test]
    async fn order_date_is_returned_as_stored() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let alice = storage.create_customer(&new_customer("Alice", "alice@example.com")).await.unwrap();
        let laptop = product(&storage, "Laptop", "999.99", 10).await;
        let placed = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::nanoseconds(123_456_789);

        let created = storage
            .create_order(&NewOrder {
                customer_id: alice.id,
                product_ids: vec![laptop.id],
                total_amount: dec("999.99"),
                order_date: placed,
            })
            .await
            .unwrap();

        let stored = storage.get_order(created.id).await.unwrap().unwrap();
        assert_eq!(created.order_date, stored.order_date);
        assert_eq!(stored.order_date.timestamp_subsec_nanos(), 123_456_000);
    }

    #[tokio::test]
    async fn restock_only_touches_low_stock() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let low = product(&storage, "Cable", "5.00", 9).await;
        let empty = product(&storage, "Adapter", "7.00", 0).await;
        let fine = product(&storage, "Monitor", "199.00", 10).await;

        let updated = storage.restock_below(10, 10).await.unwrap();
        assert_eq!(updated.iter().map(|p| p.id).collect::<Vec<_>>(), vec![low.id, empty.id]);

        assert_eq!(storage.get_product(low.id).await.unwrap().unwrap().stock, 19);
        assert_eq!(storage.get_product(empty.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(storage.get_product(fine.id).await.unwrap().unwrap().stock, 10);
    }

    #[tokio::test]
    async fn orders_round_trip_with_filters() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let alice = storage.create_customer(&new_customer("Alice", "alice@example.com")).await.unwrap();
        let bob = storage.create_customer(&new_customer("Bob", "bob@example.com")).await.unwrap();
        let laptop = product(&storage, "Laptop", "999.99", 10).await;
        let tablet = product(&storage, "Tablet", "399.99", 15).await;

        let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let old = storage
            .create_order(&NewOrder {
                customer_id: alice.id,
                product_ids: vec![laptop.id, tablet.id],
                total_amount: dec("1399.98"),
                order_date: base,
            })
            .await
            .unwrap();
        let recent = storage
            .create_order(&NewOrder {
                customer_id: bob.id,
                product_ids: vec![tablet.id],
                total_amount: dec("399.99"),
                order_date: base + Duration::days(10),
            })
            .await
            .unwrap();

        assert_eq!(storage.get_order(old.id).await.unwrap().unwrap().product_ids, vec![laptop.id, tablet.id]);

        let since = OrderFilter { order_date_gte: Some(base + Duration::days(5)), ..Default::default() };
        let found = storage.list_orders(&since, None).await.unwrap();
        assert_eq!(found.iter().map(|o| o.id).collect::<Vec<_>>(), vec![recent.id]);

        let by_laptop = OrderFilter { product_name_icontains: Some("lap".to_string()), ..Default::default() };
        assert_eq!(storage.list_orders(&by_laptop, None).await.unwrap()[0].id, old.id);

        let by_customer = OrderFilter { customer_name_icontains: Some("bo".to_string()), ..Default::default() };
        assert_eq!(storage.list_orders(&by_customer, None).await.unwrap()[0].id, recent.id);

        let newest_first = OrderBy::parse("-order_date", ORDER_SORT_COLUMNS).unwrap();
        let all = storage.list_orders(&OrderFilter::default(), Some(newest_first)).await.unwrap();
        assert_eq!(all.iter().map(|o| o.id).collect::<Vec<_>>(), vec![recent.id, old.id]);

        assert_eq!(storage.get_orders_by_customer(alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn order_for_unknown_customer_is_rejected_by_the_store() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let laptop = product(&storage, "Laptop", "999.99", 10).await;
        let result = storage
            .create_order(&NewOrder {
                customer_id: 42,
                product_ids: vec![laptop.id],
                total_amount: dec("999.99"),
                order_date: Utc::now(),
            })
            .await;
        assert!(result.is_err());
        assert!(storage.list_orders(&OrderFilter::default(), None).await.unwrap().is_empty());
    }
}
