pub mod customer;
pub mod filters;
pub mod inputs;
pub mod order;
pub mod payloads;
pub mod product;

pub use customer::Customer;
pub use filters::{CustomerFilterInput, OrderFilterInput, ProductFilterInput};
pub use inputs::{CustomerInput, OrderInput, ProductInput};
pub use order::Order;
pub use payloads::*;
pub use product::Product;
