pub mod metrics;
pub mod routes;
pub mod service_resources_metrics;
