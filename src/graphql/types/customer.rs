use crate::domain::Customer as DomainCustomer;
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, FieldResult, Object, ID};

/// GraphQL representation of a Customer
#[derive(Clone)]
pub struct Customer {
    pub inner: DomainCustomer,
}

impl From<DomainCustomer> for Customer {
    fn from(customer: DomainCustomer) -> Self {
        Self { inner: customer }
    }
}

#[Object]
impl Customer {
    async fn id(&self) -> ID {
        ID(self.inner.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    /// Unique across all customers
    async fn email(&self) -> &str {
        &self.inner.email
    }

    async fn phone(&self) -> Option<&str> {
        self.inner.phone.as_deref()
    }

    /// Orders placed by this customer
    async fn orders(&self, ctx: &Context<'_>) -> FieldResult<Vec<super::order::Order>> {
        let context = ctx.data::<GraphQLContext>()?;
        let orders = context.storage.get_orders_by_customer(self.inner.id).await?;
        Ok(orders.into_iter().map(Into::into).collect())
    }
}
