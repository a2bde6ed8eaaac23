pub mod mutation;
pub mod query;

pub use mutation::Mutation;
pub use query::Query;
