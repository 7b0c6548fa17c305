//! # dot2bgraph-error
//!
//! Unified error handling for dot2bgraph.
//!
//! ## Design philosophy
//!
//! - **Kind**: know what error occurred (e.g. `MalformedInput`, `DotSyntax`)
//! - **Error context**: a breadcrumb trail of operations the error passed
//!   through, assisting in locating the cause
//! - **Error source**: wrap underlying errors without leaking raw types
//!
//! The layout core never retries anything: every error this crate
//! represents is fatal and propagates straight to the caller.
//!
//! ## Usage
//!
//! ```rust
//! use dot2bgraph_error::{Error, Kind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(Kind::MalformedInput, "unknown edge endpoint 'b'")
//!         .with_operation("region_tree::build")
//!         .with_context("region", "cluster_A"))
//! }
//! ```

mod error;
mod kind;

pub use error::Error;
pub use kind::Kind;

/// Result type alias using the dot2bgraph `Error`.
pub type Result<T> = std::result::Result<T, Error>;
