//! Domain errors raised by the bookkeeping rules

use thiserror::Error;

/// Errors raised while mutating a tool's stock or serial pool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("{tool} is out of stock")]
    OutOfStock { tool: String },

    #[error("Serial {serial} is not available for {tool}")]
    SerialUnavailable { tool: String, serial: String },

    #[error("Serial {serial} already exists for {tool}")]
    DuplicateSerial { tool: String, serial: String },

    #[error("Serial {serial} was not sold from {tool}")]
    SerialNotSold { tool: String, serial: String },

    #[error("No serialized units available for {tool}")]
    SerialPoolExhausted { tool: String },
}
