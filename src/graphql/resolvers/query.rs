use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{Customer, CustomerFilterInput, Order, OrderFilterInput, Product, ProductFilterInput};
use crate::storage::query::{CUSTOMER_SORT_COLUMNS, ORDER_SORT_COLUMNS, PRODUCT_SORT_COLUMNS};
use crate::storage::{CustomerFilter, OrderBy, OrderFilter, ProductFilter};
use async_graphql::connection::{query, Connection, Edge, EmptyFields};
use async_graphql::{Context, Error, FieldResult, Object, OutputType, SimpleObject, ID};

pub const HELLO: &str = "Hello from CRM!";

/// Extra fields on every list connection
#[derive(SimpleObject)]
pub struct ConnectionTotals {
    /// Number of items matching the filter, across all pages
    pub total_count: usize,
}

pub type ListConnection<T> = Connection<usize, T, ConnectionTotals, EmptyFields>;

/// Root query object for GraphQL
pub struct Query;

fn parse_order_by(order_by: Option<String>, allowed: &[&'static str]) -> FieldResult<Option<OrderBy>> {
    order_by
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| OrderBy::parse(&raw, allowed).map_err(Error::new))
        .transpose()
}

fn parse_id(id: &ID) -> FieldResult<i64> {
    id.parse::<i64>().map_err(|_| Error::new(format!("Invalid ID: {}", id.0)))
}

/// Slices an already filtered and ordered list into a Relay connection.
/// Cursors are positions in the full list.
async fn paginate<T: OutputType>(
    items: Vec<T>,
    after: Option<String>,
    before: Option<String>,
    first: Option<i32>,
    last: Option<i32>,
) -> FieldResult<ListConnection<T>> {
    query(
        after,
        before,
        first,
        last,
        |after: Option<usize>, before: Option<usize>, first: Option<usize>, last: Option<usize>| async move {
            let total = items.len();
            let mut start = after.map(|a| a.saturating_add(1)).unwrap_or(0).min(total);
            let mut end = before.unwrap_or(total).min(total).max(start);
            if let Some(first) = first {
                end = end.min(start.saturating_add(first));
            }
            if let Some(last) = last {
                start = start.max(end.saturating_sub(last));
            }

            let mut connection =
                Connection::with_additional_fields(start > 0, end < total, ConnectionTotals { total_count: total });
            connection.edges.extend(
                items
                    .into_iter()
                    .enumerate()
                    .skip(start)
                    .take(end - start)
                    .map(|(idx, node)| Edge::new(idx, node)),
            );
            Ok::<_, Error>(connection)
        },
    )
    .await
}

#[Object]
impl Query {
    /// Liveness probe used by the heartbeat job
    async fn hello(&self) -> &'static str {
        HELLO
    }

    /// Customers, filterable and sortable (e.g. `orderBy: "-name"`)
    #[allow(clippy::too_many_arguments)]
    async fn all_customers(
        &self,
        ctx: &Context<'_>,
        filter: Option<CustomerFilterInput>,
        order_by: Option<String>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> FieldResult<ListConnection<Customer>> {
        let context = ctx.data::<GraphQLContext>()?;
        let order_by = parse_order_by(order_by, CUSTOMER_SORT_COLUMNS)?;
        let filter: CustomerFilter = filter.unwrap_or_default().into();

        let customers = context.storage.list_customers(&filter, order_by).await?;
        paginate(customers.into_iter().map(Customer::from).collect(), after, before, first, last).await
    }

    /// Products, filterable and sortable (e.g. `orderBy: "-price"`)
    #[allow(clippy::too_many_arguments)]
    async fn all_products(
        &self,
        ctx: &Context<'_>,
        filter: Option<ProductFilterInput>,
        order_by: Option<String>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> FieldResult<ListConnection<Product>> {
        let context = ctx.data::<GraphQLContext>()?;
        let order_by = parse_order_by(order_by, PRODUCT_SORT_COLUMNS)?;
        let filter: ProductFilter = filter.unwrap_or_default().into();

        let products = context.storage.list_products(&filter, order_by).await?;
        paginate(products.into_iter().map(Product::from).collect(), after, before, first, last).await
    }

    /// Orders, filterable and sortable (e.g. `orderBy: "-order_date"`)
    #[allow(clippy::too_many_arguments)]
    async fn all_orders(
        &self,
        ctx: &Context<'_>,
        filter: Option<OrderFilterInput>,
        order_by: Option<String>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> FieldResult<ListConnection<Order>> {
        let context = ctx.data::<GraphQLContext>()?;
        let order_by = parse_order_by(order_by, ORDER_SORT_COLUMNS)?;
        let filter = OrderFilter::try_from(filter.unwrap_or_default()).map_err(Error::new)?;

        let orders = context.storage.list_orders(&filter, order_by).await?;
        paginate(orders.into_iter().map(Order::from).collect(), after, before, first, last).await
    }

    /// Get a customer by ID
    async fn customer(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<Customer>> {
        let context = ctx.data::<GraphQLContext>()?;
        let customer = context.storage.get_customer(parse_id(&id)?).await?;
        Ok(customer.map(Into::into))
    }

    /// Get a product by ID
    async fn product(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<Product>> {
        let context = ctx.data::<GraphQLContext>()?;
        let product = context.storage.get_product(parse_id(&id)?).await?;
        Ok(product.map(Into::into))
    }

    /// Get an order by ID
    async fn order(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Option<Order>> {
        let context = ctx.data::<GraphQLContext>()?;
        let order = context.storage.get_order(parse_id(&id)?).await?;
        Ok(order.map(Into::into))
    }
}
