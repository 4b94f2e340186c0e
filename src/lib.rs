pub mod config;
pub mod constants;
pub mod csv_export;
pub mod datetime;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod pipeline;
pub mod schedule;
pub mod section;
pub mod text;
pub mod types;
pub mod venue;
