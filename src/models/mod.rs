//! Record models for netmap collections.
//!
//! # Core Concepts
//!
//! - [`Record`]: The contract every collection member satisfies. A record knows
//!   its identifier (absent until the server assigns one) and can reject itself
//!   before it is sent over the wire.
//! - [`RecordId`]: Identifier of a persisted record, numeric or string, exactly
//!   as the server sends it.
//! - [`GraphRecord`]: A netmap graph entity. Apart from its identifier, its
//!   shape belongs to the server, so attributes are kept as raw JSON.

mod graph;
mod record;

pub use graph::*;
pub use record::*;
