pub mod config;
pub mod fetch;
pub mod metrics;
pub mod output;
pub mod scoring;
pub mod stderr_buffer;
