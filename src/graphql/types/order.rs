use crate::domain::Order as DomainOrder;
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, FieldResult, Object, ID};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// GraphQL representation of an Order
#[derive(Clone)]
pub struct Order {
    pub inner: DomainOrder,
}

impl From<DomainOrder> for Order {
    fn from(order: DomainOrder) -> Self {
        Self { inner: order }
    }
}

#[Object]
impl Order {
    async fn id(&self) -> ID {
        ID(self.inner.id.to_string())
    }

    /// Sum of product prices when the order was placed
    async fn total_amount(&self) -> Decimal {
        self.inner.total_amount
    }

    async fn order_date(&self) -> DateTime<Utc> {
        self.inner.order_date
    }

    /// The customer who placed the order
    async fn customer(&self, ctx: &Context<'_>) -> FieldResult<Option<super::customer::Customer>> {
        let context = ctx.data::<GraphQLContext>()?;
        let customer = context.storage.get_customer(self.inner.customer_id).await?;
        Ok(customer.map(Into::into))
    }

    /// Products in the order, in the order they were added
    async fn products(&self, ctx: &Context<'_>) -> FieldResult<Vec<super::product::Product>> {
        let context = ctx.data::<GraphQLContext>()?;
        let mut by_id: HashMap<_, _> = context
            .storage
            .get_products_by_ids(&self.inner.product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(self
            .inner
            .product_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(Into::into)
            .collect())
    }
}
