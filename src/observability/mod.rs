// Observability: metrics

pub mod metrics;

pub use metrics::{init, record_job_run, record_mutation, render, Outcome};
