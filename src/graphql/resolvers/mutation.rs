use crate::app::{self, CustomerUseCase, OrderUseCase, ProductUseCase};
use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{
    BulkCreateCustomersPayload, CreateCustomerPayload, CreateOrderPayload, CreateProductPayload, CustomerInput,
    OrderInput, ProductInput, UpdateLowStockProductsPayload,
};
use async_graphql::{Context, FieldResult, Object};

/// Root mutation object for GraphQL. Validation failures come back in the
/// payload's `errors`, never as GraphQL errors.
pub struct Mutation;

#[Object]
impl Mutation {
    /// Create a single customer
    async fn create_customer(&self, ctx: &Context<'_>, input: CustomerInput) -> FieldResult<CreateCustomerPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let use_case = CustomerUseCase::new(context.storage.clone());
        Ok(use_case.create_customer(input.into()).await.into())
    }

    /// Create many customers; valid rows are stored even when others fail
    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        inputs: Vec<CustomerInput>,
    ) -> FieldResult<BulkCreateCustomersPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let use_case = CustomerUseCase::new(context.storage.clone());
        let inputs: Vec<app::CustomerInput> = inputs.into_iter().map(Into::into).collect();
        Ok(use_case.bulk_create_customers(inputs).await.into())
    }

    async fn create_product(&self, ctx: &Context<'_>, input: ProductInput) -> FieldResult<CreateProductPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let use_case = ProductUseCase::new(context.storage.clone());
        Ok(use_case.create_product(input.into()).await.into())
    }

    /// Create an order; the total is the sum of the product prices at this moment
    async fn create_order(&self, ctx: &Context<'_>, input: OrderInput) -> FieldResult<CreateOrderPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let use_case = OrderUseCase::new(context.storage.clone());
        Ok(use_case.create_order(input.into()).await.into())
    }

    /// Add 10 units to every product with stock below 10
    async fn update_low_stock_products(&self, ctx: &Context<'_>) -> FieldResult<UpdateLowStockProductsPayload> {
        let context = ctx.data::<GraphQLContext>()?;
        let use_case = ProductUseCase::new(context.storage.clone());
        Ok(use_case.update_low_stock_products().await.into())
    }
}
