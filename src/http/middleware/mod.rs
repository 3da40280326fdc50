//! Request middleware applied in front of the forwarding handler.

pub mod claims;

pub use claims::claims_middleware;
