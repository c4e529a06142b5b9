//! Per-thread cache of authenticated metastore clients.
//!
//! Each [`ClientCache`] is bound to one cluster. Handles live in thread-local
//! storage keyed by the cache's id, so a thread only ever sees the handle it
//! built itself and no locking is needed on lookup. A slot is either empty or
//! holds one handle; it empties again on [`ClientCache::invalidate`], when the
//! thread exits, or once its cache is gone. Every slot holds a weak reference
//! to its cache's liveness token, and any cache access on a thread releases
//! that thread's slots whose cache has been dropped.

use crate::connector::{AuthMode, ConnectRequest, MetastoreConnector};
use crate::handle::MetastoreClientHandle;
use metaport_common::{ClusterDescriptor, Error, Result};
use metaport_config::EnvConfig;
use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

/// A cached handle and the liveness token of the cache that built it
struct Slot {
    owner: Weak<()>,
    handle: Rc<dyn Any>,
}

thread_local! {
    /// Handles built on this thread, keyed by cache id
    static CLIENT_SLOTS: RefCell<HashMap<u64, Slot>> = RefCell::new(HashMap::new());
}

/// Release this thread's slots whose cache has been dropped.
fn prune_dead_slots() {
    let dead: Vec<Slot> = CLIENT_SLOTS.with(|slots| {
        let mut slots = slots.borrow_mut();
        let ids: Vec<u64> = slots
            .iter()
            .filter(|(_, slot)| slot.owner.strong_count() == 0)
            .map(|(id, _)| *id)
            .collect();
        let dead: Vec<Slot> = ids.iter().filter_map(|id| slots.remove(id)).collect();
        dead
    });

    if !dead.is_empty() {
        debug!(released = dead.len(), "Released clients of dropped caches");
    }
    // Handles drop here, outside the borrow; their clients may touch other caches
    drop(dead);
}

/// Lazily builds and caches one metastore client per calling thread
pub struct ClientCache<K: MetastoreConnector> {
    id: u64,
    alive: Arc<()>,
    descriptor: Arc<ClusterDescriptor>,
    connector: Arc<K>,
    sasl: bool,
    /// Fixed connector settings; `None` snapshots the environment per handshake
    env: Option<EnvConfig>,
}

impl<K: MetastoreConnector> ClientCache<K> {
    /// Cache whose handshakes use SASL with the descriptor's principal and
    /// token signature
    pub fn sasl(descriptor: Arc<ClusterDescriptor>, connector: Arc<K>) -> Self {
        Self::new(descriptor, connector, true)
    }

    /// Cache whose handshakes are unauthenticated
    pub fn plain(descriptor: Arc<ClusterDescriptor>, connector: Arc<K>) -> Self {
        Self::new(descriptor, connector, false)
    }

    fn new(descriptor: Arc<ClusterDescriptor>, connector: Arc<K>, sasl: bool) -> Self {
        Self {
            id: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
            alive: Arc::new(()),
            descriptor,
            connector,
            sasl,
            env: None,
        }
    }

    /// Pass these settings to the connector instead of reading the
    /// environment on every handshake
    pub fn with_env_config(mut self, env: EnvConfig) -> Self {
        self.env = Some(env);
        self
    }

    pub fn descriptor(&self) -> &ClusterDescriptor {
        &self.descriptor
    }

    pub fn is_sasl(&self) -> bool {
        self.sasl
    }

    /// Get the calling thread's client, connecting on first use.
    ///
    /// A hit does no I/O and cannot fail. On a miss the connector runs on
    /// this thread; if it fails nothing is cached, so the next call tries
    /// again from scratch.
    #[instrument(skip(self), fields(cluster = %self.descriptor.name()))]
    pub fn get_client(&self) -> Result<Rc<MetastoreClientHandle<K::Client>>> {
        prune_dead_slots();

        if let Some(handle) = self.cached() {
            debug!("Reusing cached metastore client");
            return Ok(handle);
        }

        let handle = Rc::new(self.connect()?);
        let slot = Slot {
            owner: Arc::downgrade(&self.alive),
            handle: handle.clone(),
        };
        CLIENT_SLOTS.with(|slots| slots.borrow_mut().insert(self.id, slot));
        Ok(handle)
    }

    /// Whether the calling thread holds a client from this cache
    pub fn is_cached(&self) -> bool {
        CLIENT_SLOTS.with(|slots| slots.borrow().contains_key(&self.id))
    }

    /// Drop the calling thread's client, if any.
    ///
    /// Callers use this after an RPC on the handle fails, so that the next
    /// [`ClientCache::get_client`] reconnects. Other threads are unaffected.
    pub fn invalidate(&self) -> bool {
        prune_dead_slots();

        let evicted = CLIENT_SLOTS.with(|slots| slots.borrow_mut().remove(&self.id)).is_some();
        if evicted {
            info!(cluster = %self.descriptor.name(), "Invalidated cached metastore client");
        }
        evicted
    }

    fn cached(&self) -> Option<Rc<MetastoreClientHandle<K::Client>>> {
        let handle = CLIENT_SLOTS.with(|slots| slots.borrow().get(&self.id).map(|s| s.handle.clone()))?;
        handle.downcast::<MetastoreClientHandle<K::Client>>().ok()
    }

    fn auth_mode(&self) -> AuthMode<'_> {
        if self.sasl {
            AuthMode::Sasl {
                principal: self.descriptor.auth_principal(),
                token_signature: self.descriptor.token_signature(),
            }
        } else {
            AuthMode::Plain
        }
    }

    fn connect(&self) -> Result<MetastoreClientHandle<K::Client>> {
        let name = self.descriptor.name();

        let endpoint = self.descriptor.metastore_endpoint().map_err(|e| {
            warn!("Cannot compose metastore endpoint: {}", e);
            let raw = format!(
                "{}:{}",
                self.descriptor.metastore_host(),
                self.descriptor.metastore_port()
            );
            Error::metastore_connection(name, raw, e)
        })?;

        let env = match &self.env {
            Some(env) => Cow::Borrowed(env),
            None => Cow::Owned(EnvConfig::from_env()),
        };

        let request = ConnectRequest {
            cluster: name,
            endpoint: &endpoint,
            auth: self.auth_mode(),
            env: &*env,
        };

        info!(endpoint = %endpoint, sasl = self.sasl, "Connecting to metastore");
        match self.connector.connect(&request) {
            Ok(client) => {
                debug!(endpoint = %endpoint, "Metastore handshake complete");
                Ok(MetastoreClientHandle::new(client, endpoint))
            }
            Err(e) => {
                warn!(endpoint = %endpoint, "Metastore handshake failed: {}", e);
                Err(Error::metastore_connection(name, endpoint.to_string(), e))
            }
        }
    }
}

impl<K: MetastoreConnector> Drop for ClientCache<K> {
    fn drop(&mut self) {
        // Other threads release their slots on their next cache access or on exit
        let _ = CLIENT_SLOTS.try_with(|slots| {
            let evicted = slots.try_borrow_mut().ok().and_then(|mut s| s.remove(&self.id));
            // Release the handle after the borrow ends; its client may touch other caches
            drop(evicted);
        });
    }
}
