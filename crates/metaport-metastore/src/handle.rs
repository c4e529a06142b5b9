//! Handle wrapping a connected metastore client.

use metaport_common::MetastoreEndpoint;
use std::fmt;
use std::time::Instant;

/// A connected metastore client, owned by the thread that built it.
///
/// Handed out as `Rc<MetastoreClientHandle<C>>`, so it cannot leave its
/// thread.
pub struct MetastoreClientHandle<C> {
    client: C,
    endpoint: MetastoreEndpoint,
    connected_at: Instant,
}

impl<C> MetastoreClientHandle<C> {
    pub(crate) fn new(client: C, endpoint: MetastoreEndpoint) -> Self {
        Self {
            client,
            endpoint,
            connected_at: Instant::now(),
        }
    }

    /// The raw client returned by the connector
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Endpoint the client is connected to
    pub fn endpoint(&self) -> &MetastoreEndpoint {
        &self.endpoint
    }

    /// When the handshake completed
    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }
}

impl<C: fmt::Debug> fmt::Debug for MetastoreClientHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetastoreClientHandle")
            .field("client", &self.client)
            .field("endpoint", &self.endpoint.to_string())
            .finish()
    }
}
