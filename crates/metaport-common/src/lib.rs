//! Common types and utilities shared across Metaport components.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ClusterDescriptor, MetastoreEndpoint, THRIFT_SCHEME};
