// Application layer: one use case per mutation

pub mod customer_use_case;
pub mod order_use_case;
pub mod product_use_case;

pub use customer_use_case::{BulkCreateCustomersResult, CreateCustomerResult, CustomerInput, CustomerUseCase};
pub use order_use_case::{order_total, CreateOrderResult, OrderInput, OrderUseCase};
pub use product_use_case::{CreateProductResult, ProductInput, ProductUseCase, RestockResult, RESTOCK_INCREMENT};
