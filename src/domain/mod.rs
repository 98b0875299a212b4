// Analytics result types
pub mod analytics;

// Domain-specific error types
pub mod errors;

// Market data domain
pub mod market;

// Port interfaces
pub mod ports;
