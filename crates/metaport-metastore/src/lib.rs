//! Authenticated metastore clients for Metaport clusters.
//!
//! A [`Cluster`] hands out metastore client handles through a [`ClientCache`],
//! which builds at most one handle per calling thread and reuses it until the
//! thread exits or the handle is invalidated. The handshake itself is done by
//! a [`MetastoreConnector`] supplied by the caller.

pub mod cache;
pub mod cluster;
pub mod connector;
pub mod handle;
pub mod registry;

#[cfg(test)]
mod testing;

pub use cache::ClientCache;
pub use cluster::{Cluster, ConfiguredCluster, PlainCluster, SaslCluster};
pub use connector::{AuthMode, ConnectError, ConnectRequest, MetastoreConnector};
pub use handle::MetastoreClientHandle;
pub use registry::ClusterRegistry;

pub use metaport_common::{ClusterDescriptor, Error, MetastoreEndpoint, Result};
