// USD-M futures position domain
pub mod futures;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
