//! Recording connector for unit tests.

use crate::connector::{AuthMode, ConnectError, ConnectRequest, MetastoreConnector};
use metaport_common::ClusterDescriptor;
use metaport_config::EnvConfig;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeClient {
    pub id: usize,
    pub endpoint: String,
    pub principal: Option<String>,
    pub token_signature: Option<String>,
}

#[derive(Default)]
pub struct RecordingConnector {
    calls: AtomicUsize,
    failing: AtomicBool,
    envs: Mutex<Vec<EnvConfig>>,
}

impl RecordingConnector {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Value of `key` in the settings seen by each handshake
    pub fn seen_setting(&self, key: &str) -> Vec<Option<String>> {
        self.envs
            .lock()
            .unwrap()
            .iter()
            .map(|env| env.get(key).map(str::to_string))
            .collect()
    }
}

impl MetastoreConnector for RecordingConnector {
    type Client = FakeClient;

    fn connect(&self, request: &ConnectRequest<'_>) -> Result<FakeClient, ConnectError> {
        let id = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.envs.lock().unwrap().push(request.env.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(ConnectError::Unreachable(request.endpoint.to_string()));
        }

        let (principal, token_signature) = match request.auth {
            AuthMode::Sasl { principal, token_signature } => {
                (Some(principal.to_string()), Some(token_signature.to_string()))
            }
            AuthMode::Plain => (None, None),
        };

        Ok(FakeClient {
            id,
            endpoint: request.endpoint.to_string(),
            principal,
            token_signature,
        })
    }
}

pub fn prod_descriptor() -> ClusterDescriptor {
    ClusterDescriptor::new(
        "prod",
        "meta1",
        9083,
        "jt1",
        "8021",
        "/data",
        "/data/tmp",
        "hive/_HOST@EXAMPLE.COM",
        "hive_token",
    )
}
