//! Database query implementations.

pub mod tickets;
