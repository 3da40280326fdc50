//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID)
//!     → middleware/claims.rs (decode credential, inject headers)
//!     → response.rs (401 on fail-closed rejection)
//!     → server.rs forward_handler (rewrite URI, forward upstream)
//!     → Send upstream response to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{Upstream, X_REQUEST_ID};
pub use response::{ErrorBody, Rejection};
pub use server::{HttpServer, ServerError};
