//! Configuration module
//!
//! Handles CLI configuration including the job service URL.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the job service
    pub server_url: String,
}
