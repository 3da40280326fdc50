//! Claim lookup and rendering.
//!
//! # Data Flow
//! ```text
//! DecodedToken section (JSON object)
//!     → path.rs (dot-path lookup, bounded depth)
//!     → &Value
//!     → render.rs (header-safe text, list format)
//!     → String handed to security::headers
//! ```
//!
//! # Design Decisions
//! - Depth is checked on the path string before touching the document
//! - `null` is a found value and renders as an empty string
//! - Objects always render as JSON; lists follow the mapping's list format

pub mod path;
pub mod render;

pub use path::{resolve, ResolveError};
pub use render::{render, ListFormat, RenderError};
