pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod graphql;
pub mod jobs;
pub mod logging;
pub mod observability;
pub mod seed;
pub mod server;
pub mod storage;
pub mod validation;
