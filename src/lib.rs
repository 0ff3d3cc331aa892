//! Typed REST collections for netmap graph records.
//!
//! [`collection::GraphCollection`] keeps a list of
//! [`models::GraphRecord`]s in sync with the `api/graph` resource of a netmap
//! server. [`api`] provides a development server for that resource.

pub mod api;
pub mod client;
pub mod collection;
pub mod config;
pub mod models;
